use super::Command;
use crate::{Branch, VcsBackend};
use async_trait::async_trait;
use branchy_core::BranchyResult;
use parking_lot::RwLock;
use std::sync::Arc;

/// Reload the local branch list
pub struct RefreshBranches {
    pub backend: Arc<dyn VcsBackend>,
    /// Replaced with the loaded list while the command runs
    pub target: Option<Arc<RwLock<Vec<Branch>>>>,
}

impl RefreshBranches {
    pub fn new(backend: Arc<dyn VcsBackend>) -> Self {
        Self {
            backend,
            target: None,
        }
    }

    /// Store the result in `target` as part of execution, so lists land in
    /// queue order rather than in the order callers wake up
    pub fn storing_into(mut self, target: Arc<RwLock<Vec<Branch>>>) -> Self {
        self.target = Some(target);
        self
    }
}

#[async_trait]
impl Command for RefreshBranches {
    type Output = Vec<Branch>;

    async fn execute(&self) -> BranchyResult<Vec<Branch>> {
        let branches = self.backend.list_branches().await?;
        tracing::debug!("Loaded {} branches", branches.len());
        if let Some(target) = &self.target {
            *target.write() = branches.clone();
        }
        Ok(branches)
    }

    fn description(&self) -> String {
        "Refresh branches".to_string()
    }
}
