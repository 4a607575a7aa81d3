pub mod branch_commands;
pub mod refresh_commands;

pub use branch_commands::*;
pub use refresh_commands::*;

pub use branchy_core::Command;

/// Dedup identifier for branch list refreshes
pub const REFRESH_IDENTIFIER: &str = "refresh";

/// Dedup identifier for a mutation targeting one branch
pub fn branch_identifier(operation: &str, branch: &str) -> String {
    format!("{}:{}", operation, branch)
}
