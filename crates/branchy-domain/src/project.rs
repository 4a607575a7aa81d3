use crate::commands::{
    branch_identifier, CheckoutBranch, CreateBranch, DeleteBranch, RefreshBranches, RenameBranch,
    REFRESH_IDENTIFIER,
};
use crate::{Branch, VcsBackend};
use branchy_core::{AppConfig, BranchyResult, Command};
use branchy_queue::{CommandQueue, SubmitOptions};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// One repository: its backend, its branch list, and the queue that every
/// operation against it goes through.
///
/// Operations return `Ok(None)` when an identical request is already queued
/// (or, for refreshes, finished within the retention window) and this one was
/// dropped. Cloning shares the same queue and branch list.
#[derive(Clone)]
pub struct Project {
    backend: Arc<dyn VcsBackend>,
    queue: CommandQueue,
    branches: Arc<RwLock<Vec<Branch>>>,
    refresh_retention: Duration,
    default_base: Option<String>,
}

impl Project {
    /// Must be called inside a tokio runtime
    pub fn new(backend: Arc<dyn VcsBackend>, config: &AppConfig) -> Self {
        Self::with_queue(backend, CommandQueue::new(), config)
    }

    pub fn with_queue(backend: Arc<dyn VcsBackend>, queue: CommandQueue, config: &AppConfig) -> Self {
        Self {
            backend,
            queue,
            branches: Arc::new(RwLock::new(Vec::new())),
            refresh_retention: config.effective_refresh_retention(),
            default_base: config.default_base.clone(),
        }
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Branch list as of the last refresh the queue ran
    pub fn branches(&self) -> Vec<Branch> {
        self.branches.read().clone()
    }

    pub fn head(&self) -> Option<Branch> {
        self.branches.read().iter().find(|b| b.is_head).cloned()
    }

    pub fn find_branch(&self, name: &str) -> Option<Branch> {
        self.branches.read().iter().find(|b| b.name == name).cloned()
    }

    /// Reload the branch list, collapsing repeated requests.
    ///
    /// A refresh that is queued, running, or finished within the configured
    /// retention absorbs this one.
    pub async fn refresh(&self) -> BranchyResult<Option<Vec<Branch>>> {
        let options = SubmitOptions::deduplicated(REFRESH_IDENTIFIER, self.refresh_retention);
        let Some(result) = self.queue.process(self.reload(), options) else {
            tracing::debug!("Refresh already pending, skipping");
            return Ok(None);
        };
        result.await.map(Some)
    }

    pub async fn create_branch(&self, name: &str, base: Option<&str>) -> BranchyResult<Option<()>> {
        let base = base.map(str::to_string).or_else(|| self.default_base.clone());
        let command = CreateBranch::new(self.backend.clone(), name, base);
        self.mutate(command, branch_identifier("create", name)).await
    }

    pub async fn delete_branch(&self, name: &str, force: bool) -> BranchyResult<Option<()>> {
        let command = DeleteBranch::new(self.backend.clone(), name, force);
        self.mutate(command, branch_identifier("delete", name)).await
    }

    pub async fn rename_branch(&self, from: &str, to: &str) -> BranchyResult<Option<()>> {
        let command = RenameBranch::new(self.backend.clone(), from, to);
        self.mutate(command, branch_identifier("rename", from)).await
    }

    pub async fn checkout_branch(&self, name: &str) -> BranchyResult<Option<()>> {
        let command = CheckoutBranch::new(self.backend.clone(), name);
        self.mutate(command, branch_identifier("checkout", name)).await
    }

    /// Cancel whatever is still queued and wait for the running operation
    pub async fn shutdown(&self) {
        self.queue.dispose().await;
    }

    /// Queue a mutation followed directly by a reload of the branch list.
    ///
    /// The reload is not deduplicated: a refresh that finished before the
    /// mutation would otherwise leave a stale list behind.
    async fn mutate<C>(&self, command: C, identifier: String) -> BranchyResult<Option<()>>
    where
        C: Command<Output = ()>,
    {
        let options = SubmitOptions::new()
            .with_identifier(identifier)
            .reject_duplicates();
        let Some(mutation) = self.queue.submit(command, options) else {
            return Ok(None);
        };
        let reload = self.queue.enqueue(
            self.reload(),
            SubmitOptions::new().with_identifier(REFRESH_IDENTIFIER),
        );

        let outcome = mutation.result().await;
        match reload.result().await {
            Ok(_) => {}
            Err(e) if e.is_canceled() => {}
            Err(e) => {
                tracing::warn!("Failed to reload branches: {}", e);
                if outcome.is_ok() {
                    return Err(e);
                }
            }
        }
        outcome.map(Some)
    }

    /// Refresh that writes the shared branch list from inside the queue
    fn reload(&self) -> RefreshBranches {
        RefreshBranches::new(self.backend.clone()).storing_into(self.branches.clone())
    }
}
