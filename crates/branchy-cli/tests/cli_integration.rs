use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
        .status;
    assert!(status.success(), "git {:?} failed", args);
}

/// Repository with one commit on `main`, plus an isolated config directory
fn fixture() -> Option<(TempDir, TempDir)> {
    if !git_available() {
        eprintln!("git not available, skipping");
        return None;
    }
    let repo = tempdir().unwrap();
    git(repo.path(), &["init", "-q"]);
    git(repo.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(repo.path(), &["commit", "-q", "--allow-empty", "-m", "Initial commit"]);
    Some((repo, tempdir().unwrap()))
}

fn branchy(repo: &Path, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("branchy").unwrap();
    cmd.arg("--repo")
        .arg(repo)
        .env("XDG_CONFIG_HOME", config)
        .env("HOME", config)
        .env_remove("BRANCHY_REPO")
        .env_remove("BRANCHY_DEBUG_LOG");
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text
        .lines()
        .find(|line| line.starts_with('{'))
        .expect("No JSON line in output");
    serde_json::from_str(line).expect("Failed to parse JSON output")
}

fn run_ok(repo: &Path, config: &Path, args: &[&str]) -> Value {
    let output = branchy(repo, config)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = parse_json_output(&output);
    assert_eq!(json["success"], true);
    json
}

fn run_err(repo: &Path, config: &Path, args: &[&str]) -> Value {
    let output = branchy(repo, config)
        .args(args)
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let json = parse_json_output(&output);
    assert_eq!(json["success"], false);
    json
}

fn branch_names(json: &Value) -> Vec<String> {
    json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect()
}

mod help_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        Command::cargo_bin("branchy")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("checkout"))
            .stdout(predicate::str::contains("rename"))
            .stdout(predicate::str::contains("--repo"));
    }

    #[test]
    fn test_completions() {
        Command::cargo_bin("branchy")
            .unwrap()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("branchy"));
    }

    #[test]
    fn test_create_requires_name() {
        Command::cargo_bin("branchy")
            .unwrap()
            .arg("create")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--name"));
    }
}

mod branch_tests {
    use super::*;

    #[test]
    fn test_list() {
        let Some((repo, config)) = fixture() else { return };
        let json = run_ok(repo.path(), config.path(), &["list"]);
        assert_eq!(json["data"]["count"], 1);
        let main = &json["data"]["items"][0];
        assert_eq!(main["name"], "main");
        assert_eq!(main["is_head"], true);
        assert_eq!(main["last_commit"]["message"], "Initial commit");
        assert_eq!(main["last_commit"]["author"]["email"], "test@example.com");
    }

    #[test]
    fn test_create_checkout_rename_delete() {
        let Some((repo, config)) = fixture() else { return };
        let (repo, config) = (repo.path(), config.path());

        let json = run_ok(repo, config, &["create", "--name", "topic"]);
        assert_eq!(json["data"]["created"], "topic");
        assert_eq!(json["data"]["branch"]["name"], "topic");

        run_ok(repo, config, &["checkout", "--name", "topic"]);
        let json = run_ok(repo, config, &["list"]);
        assert_eq!(branch_names(&json), vec!["main", "topic"]);
        assert_eq!(json["data"]["items"][1]["is_head"], true);

        let json = run_ok(repo, config, &["rename", "--from", "topic", "--to", "feature"]);
        assert_eq!(json["data"]["renamed"]["to"], "feature");
        assert_eq!(json["data"]["branch"]["is_head"], true);

        run_ok(repo, config, &["checkout", "--name", "main"]);
        let json = run_ok(repo, config, &["delete", "--name", "feature"]);
        assert_eq!(json["data"]["deleted"], "feature");
        let json = run_ok(repo, config, &["list"]);
        assert_eq!(branch_names(&json), vec!["main"]);
    }

    #[test]
    fn test_create_from_base() {
        let Some((repo, config)) = fixture() else { return };
        let (repo, config) = (repo.path(), config.path());
        run_ok(repo, config, &["create", "--name", "release"]);
        run_ok(repo, config, &["create", "--name", "hotfix", "--base", "release"]);
        let json = run_ok(repo, config, &["list"]);
        assert_eq!(branch_names(&json), vec!["hotfix", "main", "release"]);
    }

    #[test]
    fn test_delete_checked_out_branch_fails() {
        let Some((repo, config)) = fixture() else { return };
        let json = run_err(repo.path(), config.path(), &["delete", "--name", "main"]);
        let error = json["error"].as_str().unwrap();
        assert!(error.contains("Delete branch 'main'"));
        assert!(error.contains("git branch -d main"));
    }

    #[test]
    fn test_invalid_branch_name() {
        let Some((repo, config)) = fixture() else { return };
        let json = run_err(repo.path(), config.path(), &["create", "--name", "bad name"]);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("cannot contain whitespace"));
    }

    #[test]
    fn test_default_base_from_config() {
        let Some((repo, config)) = fixture() else { return };
        let (repo, config) = (repo.path(), config.path());
        run_ok(repo, config, &["create", "--name", "develop"]);

        let config_dir = config.join("branchy");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "default_base = \"no-such-base\"\n",
        )
        .unwrap();

        // Only meaningful where the Linux config location applies
        if cfg!(target_os = "linux") {
            let json = run_err(repo, config, &["create", "--name", "topic"]);
            assert!(json["error"].as_str().unwrap().contains("no-such-base"));
        }
    }

    #[test]
    fn test_not_a_repository() {
        if !git_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let config = tempdir().unwrap();
        let output = branchy(dir.path(), config.path())
            .env("GIT_CEILING_DIRECTORIES", dir.path().parent().unwrap())
            .arg("list")
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();
        let json = parse_json_output(&output);
        assert!(json["error"].as_str().unwrap().contains("rev-parse"));
    }
}
