use crate::parse::{parse_branch_list, BRANCH_FORMAT};
use async_trait::async_trait;
use branchy_core::{AppConfig, BranchyError, BranchyResult};
use branchy_domain::{Branch, VcsBackend};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs the git command-line client against one working tree.
#[derive(Debug, Clone)]
pub struct GitBackend {
    binary: String,
    repo: PathBuf,
}

impl GitBackend {
    pub fn new(repo: impl Into<PathBuf>, binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            repo: repo.into(),
        }
    }

    /// Resolve the working tree containing `path` and use the configured binary.
    pub async fn open(path: impl AsRef<Path>, config: &AppConfig) -> BranchyResult<Self> {
        let locator = Self::new(path.as_ref(), config.effective_git_binary());
        let toplevel = locator.git(&["rev-parse", "--show-toplevel"]).await?;
        let toplevel = toplevel.trim();
        if toplevel.is_empty() {
            return Err(BranchyError::NotFound(format!(
                "No git working tree at {}",
                path.as_ref().display()
            )));
        }
        tracing::debug!("Opened repository at {}", toplevel);
        Ok(Self::new(toplevel, config.effective_git_binary()))
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn git(&self, args: &[&str]) -> BranchyResult<String> {
        let command_line = format!("{} {}", self.binary, args.join(" "));
        tracing::debug!("Running {} in {}", command_line, self.repo.display());

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BranchyError::Vcs {
                command: command_line.clone(),
                status: None,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!("{} exited with {:?}: {}", command_line, output.status.code(), stderr);
            return Err(BranchyError::Vcs {
                command: command_line,
                status: output.status.code(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VcsBackend for GitBackend {
    async fn list_branches(&self) -> BranchyResult<Vec<Branch>> {
        let format = format!("--format={}", BRANCH_FORMAT);
        let output = self
            .git(&["for-each-ref", &format, "refs/heads"])
            .await?;
        parse_branch_list(&output)
    }

    async fn create_branch(&self, name: &str, base: Option<&str>) -> BranchyResult<()> {
        match base {
            Some(base) => self.git(&["branch", name, base]).await?,
            None => self.git(&["branch", name]).await?,
        };
        Ok(())
    }

    async fn delete_branch(&self, name: &str, force: bool) -> BranchyResult<()> {
        let flag = if force { "-D" } else { "-d" };
        self.git(&["branch", flag, name]).await?;
        Ok(())
    }

    async fn rename_branch(&self, old: &str, new: &str) -> BranchyResult<()> {
        self.git(&["branch", "-m", old, new]).await?;
        Ok(())
    }

    async fn checkout_branch(&self, name: &str) -> BranchyResult<()> {
        // `switch` only accepts branches; `checkout` would fall back to restoring a path
        self.git(&["switch", "--no-guess", name]).await?;
        Ok(())
    }
}
