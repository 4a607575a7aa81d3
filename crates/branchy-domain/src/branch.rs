use branchy_core::{BranchyError, BranchyResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub author: Author,
}

impl Commit {
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(7)
            .map(|(idx, _)| idx)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub last_commit: Commit,
    /// Checked out in the working tree
    #[serde(default)]
    pub is_head: bool,
}

impl Branch {
    pub fn new(name: impl Into<String>, last_commit: Commit) -> Self {
        Self {
            name: name.into(),
            last_commit,
            is_head: false,
        }
    }
}

/// Reject names the backend would misread or refuse outright
pub fn validate_branch_name(name: &str) -> BranchyResult<()> {
    if name.trim().is_empty() {
        return Err(BranchyError::Validation(
            "Branch name cannot be empty".to_string(),
        ));
    }
    if name.starts_with('-') {
        return Err(BranchyError::Validation(format!(
            "Branch name '{}' cannot start with '-'",
            name
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(BranchyError::Validation(format!(
            "Branch name '{}' cannot contain whitespace",
            name
        )));
    }
    Ok(())
}
