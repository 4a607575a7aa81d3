use super::Command;
use crate::{validate_branch_name, VcsBackend};
use async_trait::async_trait;
use branchy_core::BranchyResult;
use std::sync::Arc;

/// Create a branch at `base`, or at HEAD
pub struct CreateBranch {
    pub backend: Arc<dyn VcsBackend>,
    pub name: String,
    pub base: Option<String>,
}

impl CreateBranch {
    pub fn new(backend: Arc<dyn VcsBackend>, name: impl Into<String>, base: Option<String>) -> Self {
        Self {
            backend,
            name: name.into(),
            base,
        }
    }
}

#[async_trait]
impl Command for CreateBranch {
    type Output = ();

    async fn execute(&self) -> BranchyResult<()> {
        validate_branch_name(&self.name)?;
        self.backend
            .create_branch(&self.name, self.base.as_deref())
            .await?;
        tracing::info!("Created branch: {}", self.name);
        Ok(())
    }

    fn description(&self) -> String {
        match &self.base {
            Some(base) => format!("Create branch '{}' from '{}'", self.name, base),
            None => format!("Create branch '{}'", self.name),
        }
    }
}

/// Delete a branch
pub struct DeleteBranch {
    pub backend: Arc<dyn VcsBackend>,
    pub name: String,
    pub force: bool,
}

impl DeleteBranch {
    pub fn new(backend: Arc<dyn VcsBackend>, name: impl Into<String>, force: bool) -> Self {
        Self {
            backend,
            name: name.into(),
            force,
        }
    }
}

#[async_trait]
impl Command for DeleteBranch {
    type Output = ();

    async fn execute(&self) -> BranchyResult<()> {
        validate_branch_name(&self.name)?;
        self.backend.delete_branch(&self.name, self.force).await?;
        tracing::info!("Deleted branch: {}", self.name);
        Ok(())
    }

    fn description(&self) -> String {
        if self.force {
            format!("Force delete branch '{}'", self.name)
        } else {
            format!("Delete branch '{}'", self.name)
        }
    }
}

/// Rename a branch
pub struct RenameBranch {
    pub backend: Arc<dyn VcsBackend>,
    pub from: String,
    pub to: String,
}

impl RenameBranch {
    pub fn new(backend: Arc<dyn VcsBackend>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            backend,
            from: from.into(),
            to: to.into(),
        }
    }
}

#[async_trait]
impl Command for RenameBranch {
    type Output = ();

    async fn execute(&self) -> BranchyResult<()> {
        validate_branch_name(&self.from)?;
        validate_branch_name(&self.to)?;
        self.backend.rename_branch(&self.from, &self.to).await?;
        tracing::info!("Renamed branch {} to {}", self.from, self.to);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Rename branch '{}' to '{}'", self.from, self.to)
    }
}

/// Check out a branch in the working tree
pub struct CheckoutBranch {
    pub backend: Arc<dyn VcsBackend>,
    pub name: String,
}

impl CheckoutBranch {
    pub fn new(backend: Arc<dyn VcsBackend>, name: impl Into<String>) -> Self {
        Self {
            backend,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Command for CheckoutBranch {
    type Output = ();

    async fn execute(&self) -> BranchyResult<()> {
        validate_branch_name(&self.name)?;
        self.backend.checkout_branch(&self.name).await?;
        tracing::info!("Checked out branch: {}", self.name);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Checkout branch '{}'", self.name)
    }
}
