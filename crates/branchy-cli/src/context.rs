use branchy_core::{AppConfig, BranchyResult};
use branchy_domain::Project;
use branchy_git::GitBackend;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An opened repository and the project that queues work against it
pub struct CliContext {
    pub project: Project,
    pub repo: PathBuf,
}

impl CliContext {
    pub async fn open(repo: Option<PathBuf>, config: &AppConfig) -> BranchyResult<Self> {
        let path = match repo {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        let backend = GitBackend::open(&path, config).await?;
        let repo = backend.repo().to_path_buf();
        tracing::debug!("Using repository {}", repo.display());

        Ok(Self {
            project: Project::new(Arc::new(backend), config),
            repo,
        })
    }

    /// Directory name shown in the TUI title
    pub fn label(&self) -> String {
        repo_label(&self.repo)
    }

    pub async fn shutdown(&self) {
        self.project.shutdown().await;
    }
}

fn repo_label(repo: &Path) -> String {
    repo.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo.display().to_string())
}
