use branchy_core::{AppConfig, BranchyError};
use branchy_domain::{InMemoryBackend, Project};
use std::sync::Arc;
use std::time::Duration;

fn setup(branches: &[&str], head: &str) -> (Project, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::with_branches(branches, head));
    let project = Project::new(backend.clone(), &AppConfig::default());
    (project, backend)
}

async fn until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

fn names(project: &Project) -> Vec<String> {
    project.branches().into_iter().map(|b| b.name).collect()
}

#[tokio::test]
async fn test_refresh_loads_branches_and_head() {
    let (project, _backend) = setup(&["main", "feature"], "main");
    assert!(project.branches().is_empty());

    let loaded = project.refresh().await.unwrap().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(names(&project), vec!["feature", "main"]);
    assert_eq!(project.head().unwrap().name, "main");
    assert!(project.find_branch("feature").is_some());
    assert!(project.find_branch("ghost").is_none());
}

#[tokio::test]
async fn test_mutations_reload_the_branch_list() {
    let (project, backend) = setup(&["main"], "main");

    project.create_branch("topic", None).await.unwrap().unwrap();
    assert_eq!(names(&project), vec!["main", "topic"]);

    project.checkout_branch("topic").await.unwrap().unwrap();
    assert_eq!(project.head().unwrap().name, "topic");

    project.rename_branch("topic", "topic-2").await.unwrap().unwrap();
    assert_eq!(names(&project), vec!["main", "topic-2"]);
    assert_eq!(project.head().unwrap().name, "topic-2");

    project.checkout_branch("main").await.unwrap().unwrap();
    project.delete_branch("topic-2", false).await.unwrap().unwrap();
    assert_eq!(names(&project), vec!["main"]);

    assert_eq!(
        backend.calls(),
        vec![
            "create topic",
            "list",
            "checkout topic",
            "list",
            "rename topic topic-2",
            "list",
            "checkout main",
            "list",
            "delete topic-2",
            "list",
        ]
    );
}

#[tokio::test]
async fn test_failed_mutation_still_reloads() {
    let (project, backend) = setup(&["main", "dev"], "main");
    project.refresh().await.unwrap();
    backend.fail_next("checkout", "error: Your local changes would be overwritten");

    let err = project.checkout_branch("dev").await.unwrap_err();
    match &err {
        BranchyError::CommandFailed { command, source } => {
            assert_eq!(command, "Checkout branch 'dev'");
            assert!(source.to_string().contains("local changes"));
        }
        other => panic!("Expected CommandFailed, got {:?}", other),
    }
    assert_eq!(backend.calls().last().map(String::as_str), Some("list"));
    assert_eq!(project.head().unwrap().name, "main");
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_previous_list() {
    let (project, backend) = setup(&["main", "dev"], "main");
    project.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    backend.fail_next("list", "fatal: unable to read refs");

    assert!(project.refresh().await.is_err());
    assert_eq!(names(&project), vec!["dev", "main"]);
}

#[tokio::test]
async fn test_unmerged_delete_needs_force() {
    let (project, backend) = setup(&["main", "wip"], "main");
    backend.add_commit("wip", "Half done").unwrap();

    let err = project.delete_branch("wip", false).await.unwrap_err();
    assert!(err.root_cause().to_string().contains("not fully merged"));
    assert!(project.find_branch("wip").is_some());

    project.delete_branch("wip", true).await.unwrap().unwrap();
    assert_eq!(names(&project), vec!["main"]);
}

#[tokio::test]
async fn test_default_base_from_config() {
    let backend = Arc::new(InMemoryBackend::with_branches(&["main", "dev"], "main"));
    let config = AppConfig {
        default_base: Some("dev".to_string()),
        ..AppConfig::default()
    };
    let project = Project::new(backend.clone(), &config);

    project.create_branch("topic", None).await.unwrap();
    project.create_branch("other", Some("main")).await.unwrap();
    let calls = backend.calls();
    assert!(calls.contains(&"create topic dev".to_string()));
    assert!(calls.contains(&"create other main".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_branch_list_follows_queue_order() {
    for _ in 0..100 {
        let (project, _backend) = setup(&["main"], "main");
        project.queue().pause();

        let refresh = {
            let project = project.clone();
            tokio::spawn(async move { project.refresh().await })
        };
        until(|| project.queue().pending_count() == 1).await;
        let create = {
            let project = project.clone();
            tokio::spawn(async move { project.create_branch("topic", None).await })
        };
        until(|| project.queue().pending_count() == 3).await;

        project.queue().resume();
        let (refreshed, created) = tokio::join!(refresh, create);
        assert!(refreshed.unwrap().unwrap().is_some());
        assert_eq!(created.unwrap().unwrap(), Some(()));
        assert_eq!(names(&project), vec!["main", "topic"]);
    }
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_checkout_is_dropped() {
    let (project, backend) = setup(&["main", "dev"], "main");
    backend.set_latency(Duration::from_millis(50));

    let first = {
        let project = project.clone();
        tokio::spawn(async move { project.checkout_branch("dev").await })
    };
    until(|| project.queue().is_running()).await;

    assert_eq!(project.checkout_branch("dev").await.unwrap(), None);
    assert_eq!(first.await.unwrap().unwrap(), Some(()));
    assert_eq!(
        backend
            .calls()
            .iter()
            .filter(|c| c.as_str() == "checkout dev")
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_refresh_retention_absorbs_bursts() {
    let (project, backend) = setup(&["main"], "main");

    assert!(project.refresh().await.unwrap().is_some());
    assert!(project.refresh().await.unwrap().is_none());
    assert!(project.refresh().await.unwrap().is_none());
    assert_eq!(backend.calls(), vec!["list"]);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(project.refresh().await.unwrap().is_some());
    assert_eq!(backend.calls(), vec!["list", "list"]);
}

#[tokio::test]
async fn test_shutdown_cancels_queued_work() {
    let (project, backend) = setup(&["main", "dev"], "main");
    project.queue().pause();

    let pending = {
        let project = project.clone();
        tokio::spawn(async move { project.checkout_branch("dev").await })
    };
    until(|| project.queue().pending_count() == 2).await;

    project.shutdown().await;
    let err = pending.await.unwrap().unwrap_err();
    assert!(err.is_canceled());
    assert!(backend.calls().is_empty());
    assert!(!project.queue().is_running());
}
