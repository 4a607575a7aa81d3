use crate::{BranchyError, BranchyResult};
use async_trait::async_trait;

/// An asynchronous unit of work with a single typed outcome.
///
/// Commands know nothing about how they are scheduled. Whoever owns a command
/// is responsible for executing it at most once; the queue enforces this by
/// consuming the command when its item starts.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Perform the side effect and resolve with its value or error
    async fn execute(&self) -> BranchyResult<Self::Output>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;

    /// Execute and tag any failure with this command's description
    async fn run(&self) -> BranchyResult<Self::Output> {
        self.execute()
            .await
            .map_err(|e| BranchyError::command_failed(self.description(), e))
    }
}
