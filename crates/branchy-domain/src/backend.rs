use crate::Branch;
use async_trait::async_trait;
use branchy_core::BranchyResult;

/// Repository operations the branch commands are built on.
///
/// Implementations report a failed tool invocation as `BranchyError::Vcs`.
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Local branches, sorted by name
    async fn list_branches(&self) -> BranchyResult<Vec<Branch>>;

    /// Create `name` at `base`, or at HEAD when no base is given
    async fn create_branch(&self, name: &str, base: Option<&str>) -> BranchyResult<()>;

    /// Delete `name`; without `force` unmerged branches are refused
    async fn delete_branch(&self, name: &str, force: bool) -> BranchyResult<()>;

    async fn rename_branch(&self, old: &str, new: &str) -> BranchyResult<()>;

    async fn checkout_branch(&self, name: &str) -> BranchyResult<()>;
}
