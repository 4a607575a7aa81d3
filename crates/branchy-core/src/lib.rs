pub mod activity;
pub mod command;
pub mod config;
pub mod error;
pub mod result;

pub use activity::{ActivityEntry, ActivityLevel, ActivityLog};
pub use command::Command;
pub use config::AppConfig;
pub use error::BranchyError;
pub use result::BranchyResult;
