pub mod backend;
pub mod parse;

pub use backend::GitBackend;
pub use parse::{parse_branch_list, BRANCH_FORMAT};
