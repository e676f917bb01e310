//! End-to-end tests for the task list store
//!
//! Everything goes through `TaskListStore`, the way the binary and any
//! renderer use it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tasklist::{
    FeedbackKind, IdStrategy, NotFoundError, Outcome, TaskId, TaskListEnvironment, TaskListError,
    TaskListStore, ValidationError,
};
use tasklist_testing::{epoch, test_clock};

fn env() -> TaskListEnvironment {
    TaskListEnvironment::new(Arc::new(test_clock()))
}

fn store() -> TaskListStore {
    TaskListStore::new(env())
}

fn labels(tasks: &[tasklist::Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.label.as_str()).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn add_toggle_delete_lifecycle() {
    let store = store();

    let task = store.add_task("Buy milk").await.unwrap();
    assert_eq!(task.id, TaskId::new(1));
    assert_eq!(task.label, "Buy milk");
    assert!(!task.completed);
    assert_eq!(task.created_at, epoch());

    let toggled = store.toggle_task(TaskId::new(1)).await.unwrap();
    assert!(toggled.completed);
    assert!(store.active_tasks().await.is_empty());
    assert_eq!(store.completed_tasks().await, vec![toggled]);

    store.delete_task(TaskId::new(1)).await.unwrap();
    assert!(store.tasks().await.is_empty());
}

#[tokio::test]
async fn empty_label_is_rejected() {
    let store = store();

    let result = store.add_task("").await;

    assert_eq!(result, Err(TaskListError::Validation(ValidationError::EmptyLabel)));
    assert!(store.tasks().await.is_empty());
    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.last_outcome,
        Some(Outcome::Rejected {
            error: ValidationError::EmptyLabel
        })
    );
}

#[tokio::test]
async fn ids_follow_insertion() {
    let store = store();

    let a = store.add_task("A").await.unwrap();
    let b = store.add_task("B").await.unwrap();

    assert_eq!((a.id, b.id), (TaskId::new(1), TaskId::new(2)));
    assert_eq!(labels(&store.active_tasks().await), ["A", "B"]);
}

#[tokio::test]
async fn toggle_twice_restores_state() {
    let store = store();
    let task = store.add_task("Water plants").await.unwrap();

    store.toggle_task(task.id).await.unwrap();
    let restored = store.toggle_task(task.id).await.unwrap();

    assert_eq!(restored, task);
}

#[tokio::test]
async fn delete_twice_reports_not_found() {
    let store = store();
    for label in ["A", "B", "C"] {
        store.add_task(label).await.unwrap();
    }

    store.delete_task(TaskId::new(2)).await.unwrap();
    let again = store.delete_task(TaskId::new(2)).await;

    assert_eq!(
        again,
        Err(TaskListError::NotFound(NotFoundError { id: TaskId::new(2) }))
    );
    assert_eq!(labels(&store.tasks().await), ["A", "C"]);
}

#[tokio::test]
async fn submit_uses_and_clears_pending_input() {
    let store = store();

    store.set_pending_input("  Call mom ").await.unwrap();
    let task = store.submit_pending_input().await.unwrap();

    assert_eq!(task.label, "Call mom");
    assert_eq!(store.pending_input().await, "");
}

#[tokio::test]
async fn failed_submit_keeps_pending_input() {
    let store = store();

    store.set_pending_input("   ").await.unwrap();
    let result = store.submit_pending_input().await;

    assert!(matches!(result, Err(TaskListError::Validation(_))));
    assert_eq!(store.pending_input().await, "   ");
}

// ============================================================================
// Id strategies
// ============================================================================

#[tokio::test]
async fn monotonic_ids_are_never_reused() {
    let store = store();
    store.add_task("A").await.unwrap();
    store.add_task("B").await.unwrap();
    store.delete_task(TaskId::new(1)).await.unwrap();

    let c = store.add_task("C").await.unwrap();

    assert_eq!(c.id, TaskId::new(3));
}

#[tokio::test]
async fn legacy_ids_can_collide() {
    let store = TaskListStore::new(env().with_id_strategy(IdStrategy::Legacy));
    store.add_task("A").await.unwrap();
    store.add_task("B").await.unwrap();
    store.delete_task(TaskId::new(1)).await.unwrap();

    let c = store.add_task("C").await.unwrap();

    assert_eq!(c.id, TaskId::new(2));
    let ids: Vec<_> = store.tasks().await.iter().map(|t| t.id).collect();
    assert_eq!(ids, [TaskId::new(2), TaskId::new(2)]);

    // Toggle and delete both act on the first task carrying the id
    let toggled = store.toggle_task(TaskId::new(2)).await.unwrap();
    assert_eq!(toggled.label, "B");
    assert_eq!(labels(&store.active_tasks().await), ["C"]);

    store.delete_task(TaskId::new(2)).await.unwrap();
    let remaining = store.tasks().await;
    assert_eq!(labels(&remaining), ["C"]);
    assert!(!remaining[0].completed);
}

// ============================================================================
// Feedback
// ============================================================================

#[tokio::test(start_paused = true)]
async fn feedback_expires_after_ttl() {
    let ttl = Duration::from_millis(2000);
    let store = TaskListStore::new(env().with_feedback_ttl(ttl));
    let mut snapshots = store.subscribe();

    let _ = store.add_task("  ").await;
    let feedback = store.snapshot().feedback.expect("feedback shown");
    assert_eq!(feedback.kind, FeedbackKind::EmptyLabel);
    assert_eq!(feedback.message, "Task cannot be empty");
    assert_eq!(store.pending_effects(), 1);

    tokio::time::sleep(ttl - Duration::from_millis(100)).await;
    assert!(store.snapshot().feedback.is_some());

    snapshots
        .wait_for(|s| s.feedback.is_none())
        .await
        .expect("store alive");
}

#[tokio::test(start_paused = true)]
async fn stale_dismissal_keeps_newer_feedback() {
    let ttl = Duration::from_millis(2000);
    let store = TaskListStore::new(env().with_feedback_ttl(ttl));
    let mut snapshots = store.subscribe();

    let _ = store.add_task("").await;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let _ = store.toggle_task(TaskId::new(9)).await;

    // First message's timer has fired by now
    tokio::time::sleep(Duration::from_millis(600)).await;
    let feedback = store.snapshot().feedback.expect("newer feedback still shown");
    assert_eq!(feedback.message, "Task 9 not found");

    snapshots
        .wait_for(|s| s.feedback.is_none())
        .await
        .expect("store alive");
}

#[tokio::test(start_paused = true)]
async fn success_clears_feedback_immediately() {
    let store = store();

    let _ = store.delete_task(TaskId::new(1)).await;
    assert!(store.snapshot().feedback.is_some());

    store.add_task("A").await.unwrap();
    assert!(store.snapshot().feedback.is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_does_not_wait_for_feedback_timer() {
    // Feedback outlives the shutdown timeout
    let store = TaskListStore::new(env().with_feedback_ttl(Duration::from_secs(30)));
    let _ = store.add_task("").await;
    assert_eq!(store.pending_effects(), 1);

    let started = tokio::time::Instant::now();
    store.shutdown(Duration::from_secs(5)).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(store.pending_effects(), 0);
    assert!(matches!(
        store.add_task("late").await,
        Err(TaskListError::Store(_))
    ));
}

// ============================================================================
// Observers and concurrency
// ============================================================================

#[tokio::test]
async fn every_operation_publishes_a_snapshot() {
    let store = store();
    let mut snapshots = store.subscribe();

    store.add_task("A").await.unwrap();
    snapshots.changed().await.unwrap();
    let first = snapshots.borrow_and_update().clone();
    assert_eq!(first.tasks.len(), 1);

    store.toggle_task(TaskId::new(1)).await.unwrap();
    snapshots.changed().await.unwrap();
    let second = snapshots.borrow_and_update().clone();
    assert_eq!(second.completed_count(), 1);
    assert!(second.revision() > first.revision());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_get_distinct_ids() {
    let store = store();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.add_task(format!("task {i}")).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let task = handle.await.unwrap().unwrap();
        assert!(ids.insert(task.id), "duplicate id {}", task.id);
    }

    let tasks = store.tasks().await;
    assert_eq!(tasks.len(), 50);
    assert_eq!(ids, (1..=50).map(TaskId::new).collect());
    // Insertion order matches id order
    assert!(tasks.windows(2).all(|w| w[0].id < w[1].id));
}
