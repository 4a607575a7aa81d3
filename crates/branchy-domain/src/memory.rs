use crate::{Author, Branch, Commit, VcsBackend};
use async_trait::async_trait;
use branchy_core::{BranchyError, BranchyResult};
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Repository kept entirely in memory.
///
/// Follows git's rules closely enough for tests and demos: names are unique,
/// the checked-out branch cannot be deleted, unmerged branches need a forced
/// delete, and checkout requires an existing branch. Failures can be
/// injected per operation.
#[derive(Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    branches: BTreeMap<String, Commit>,
    /// Commit id to parent commit id
    parents: HashMap<String, String>,
    head: Option<String>,
    calls: Vec<String>,
    failures: HashMap<&'static str, String>,
    latency: Duration,
    commits_made: u64,
}

impl Inner {
    fn next_commit(&mut self, message: &str) -> Commit {
        self.commits_made += 1;
        Commit {
            id: format!("{:040x}", self.commits_made),
            message: message.to_string(),
            date: Utc
                .timestamp_opt(1_700_000_000 + self.commits_made as i64 * 60, 0)
                .single()
                .unwrap_or_else(Utc::now),
            author: Author {
                name: "Branchy".to_string(),
                email: "branchy@example.com".to_string(),
            },
        }
    }

    /// `name` is reachable from the checked-out branch
    fn is_merged(&self, name: &str) -> bool {
        let (Some(tip), Some(head)) = (
            self.branches.get(name),
            self.head.as_ref().and_then(|head| self.branches.get(head)),
        ) else {
            return true;
        };
        let mut cursor = Some(&head.id);
        while let Some(id) = cursor {
            if *id == tip.id {
                return true;
            }
            cursor = self.parents.get(id);
        }
        false
    }

    /// Record the call and return the injected failure for `operation`, if any
    fn enter(&mut self, operation: &'static str, call: String) -> BranchyResult<()> {
        self.calls.push(call.clone());
        match self.failures.remove(operation) {
            Some(stderr) => Err(vcs_error(call, stderr)),
            None => Ok(()),
        }
    }
}

fn vcs_error(call: String, stderr: impl Into<String>) -> BranchyError {
    BranchyError::Vcs {
        command: format!("memory {}", call),
        status: Some(1),
        stderr: stderr.into(),
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every branch at one shared initial commit, `head` checked out
    pub fn with_branches(names: &[&str], head: &str) -> Self {
        let backend = Self::new();
        {
            let mut inner = backend.inner.lock();
            let root = inner.next_commit("Initial commit");
            for name in names {
                inner.branches.insert(name.to_string(), root.clone());
            }
            if inner.branches.contains_key(head) {
                inner.head = Some(head.to_string());
            }
        }
        backend
    }

    /// Advance `branch` by one commit; `None` if the branch does not exist
    pub fn add_commit(&self, branch: &str, message: &str) -> Option<Commit> {
        let mut inner = self.inner.lock();
        let parent = inner.branches.get(branch)?.id.clone();
        let commit = inner.next_commit(message);
        inner.parents.insert(commit.id.clone(), parent);
        inner.branches.insert(branch.to_string(), commit.clone());
        Some(commit)
    }

    /// Make the next call of `operation` ("list", "create", "delete",
    /// "rename", "checkout") fail with `stderr`
    pub fn fail_next(&self, operation: &'static str, stderr: impl Into<String>) {
        self.inner.lock().failures.insert(operation, stderr.into());
    }

    /// Delay every operation, to keep commands running while a test observes the queue
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().latency = latency;
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    pub fn branch_names(&self) -> Vec<String> {
        self.inner.lock().branches.keys().cloned().collect()
    }

    pub fn head(&self) -> Option<String> {
        self.inner.lock().head.clone()
    }

    pub fn last_commit_of(&self, name: &str) -> Option<Commit> {
        self.inner.lock().branches.get(name).cloned()
    }

    async fn simulate_latency(&self) {
        let latency = self.inner.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl VcsBackend for InMemoryBackend {
    async fn list_branches(&self) -> BranchyResult<Vec<Branch>> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock();
        inner.enter("list", "list".to_string())?;
        Ok(inner
            .branches
            .iter()
            .map(|(name, commit)| Branch {
                name: name.clone(),
                last_commit: commit.clone(),
                is_head: inner.head.as_deref() == Some(name.as_str()),
            })
            .collect())
    }

    async fn create_branch(&self, name: &str, base: Option<&str>) -> BranchyResult<()> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock();
        let call = match base {
            Some(base) => format!("create {} {}", name, base),
            None => format!("create {}", name),
        };
        inner.enter("create", call.clone())?;

        if inner.branches.contains_key(name) {
            return Err(vcs_error(
                call,
                format!("fatal: a branch named '{}' already exists", name),
            ));
        }
        let start = match base.or(inner.head.as_deref()) {
            Some(start) => inner.branches.get(start).cloned(),
            None => None,
        };
        let Some(commit) = start else {
            return Err(vcs_error(
                call,
                format!("fatal: not a valid object name: '{}'", base.unwrap_or("HEAD")),
            ));
        };
        inner.branches.insert(name.to_string(), commit);
        Ok(())
    }

    async fn delete_branch(&self, name: &str, force: bool) -> BranchyResult<()> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock();
        let call = if force {
            format!("delete -f {}", name)
        } else {
            format!("delete {}", name)
        };
        inner.enter("delete", call.clone())?;

        if inner.head.as_deref() == Some(name) {
            return Err(vcs_error(
                call,
                format!("error: cannot delete branch '{}' used by worktree", name),
            ));
        }
        if !inner.branches.contains_key(name) {
            return Err(vcs_error(call, format!("error: branch '{}' not found", name)));
        }
        if !force && !inner.is_merged(name) {
            return Err(vcs_error(
                call,
                format!("error: the branch '{}' is not fully merged", name),
            ));
        }
        inner.branches.remove(name);
        Ok(())
    }

    async fn rename_branch(&self, old: &str, new: &str) -> BranchyResult<()> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock();
        let call = format!("rename {} {}", old, new);
        inner.enter("rename", call.clone())?;

        if inner.branches.contains_key(new) {
            return Err(vcs_error(
                call,
                format!("fatal: a branch named '{}' already exists", new),
            ));
        }
        let Some(commit) = inner.branches.remove(old) else {
            return Err(vcs_error(
                call,
                format!("error: refname refs/heads/{} not found", old),
            ));
        };
        inner.branches.insert(new.to_string(), commit);
        if inner.head.as_deref() == Some(old) {
            inner.head = Some(new.to_string());
        }
        Ok(())
    }

    async fn checkout_branch(&self, name: &str) -> BranchyResult<()> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock();
        let call = format!("checkout {}", name);
        inner.enter("checkout", call.clone())?;

        if !inner.branches.contains_key(name) {
            return Err(vcs_error(
                call,
                format!(
                    "error: pathspec '{}' did not match any file(s) known to git",
                    name
                ),
            ));
        }
        inner.head = Some(name.to_string());
        Ok(())
    }
}
