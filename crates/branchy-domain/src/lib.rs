pub mod backend;
pub mod branch;
pub mod commands;
pub mod memory;
pub mod project;

pub use backend::VcsBackend;
pub use branch::{validate_branch_name, Author, Branch, Commit};
pub use memory::InMemoryBackend;
pub use project::Project;
