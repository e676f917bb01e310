//! Integration tests for Store snapshots and delayed actions
//!
//! Observers (renderers) watch state snapshots; a delayed action shows up as
//! one more snapshot when its timer fires.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use tasklist_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use tasklist_runtime::{Store, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum NoteAction {
    /// Append an entry
    Push(u32),
    /// Show a message that expires after `ttl`
    Flash { message: String, ttl: Duration },
    /// Clear the message (fed back by the delay effect)
    ClearFlash,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Notes {
    entries: Vec<u32>,
    flash: Option<String>,
    revision: u64,
}

#[derive(Clone)]
struct NoEnv;

#[derive(Clone)]
struct NotesReducer;

impl Reducer for NotesReducer {
    type State = Notes;
    type Action = NoteAction;
    type Environment = NoEnv;

    fn reduce(
        &self,
        state: &mut Notes,
        action: NoteAction,
        _env: &NoEnv,
    ) -> SmallVec<[Effect<NoteAction>; 4]> {
        state.revision += 1;
        match action {
            NoteAction::Push(value) => {
                state.entries.push(value);
                SmallVec::new()
            },
            NoteAction::Flash { message, ttl } => {
                state.flash = Some(message);
                smallvec![Effect::delay(ttl, NoteAction::ClearFlash)]
            },
            NoteAction::ClearFlash => {
                state.flash = None;
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<Notes, NoteAction, NoEnv, NotesReducer> {
    Store::new(Notes::default(), NotesReducer, NoEnv)
}

fn flash(message: &str, ttl: Duration) -> NoteAction {
    NoteAction::Flash {
        message: message.to_string(),
        ttl,
    }
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn snapshot_matches_state_after_send() {
    let store = store();

    store.send(NoteAction::Push(1)).await.unwrap();
    store.send(NoteAction::Push(2)).await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot, store.state(Clone::clone).await);
    assert_eq!(snapshot.entries, vec![1, 2]);
    assert_eq!(snapshot.revision, 2);
}

#[tokio::test]
async fn every_observer_sees_the_latest_snapshot() {
    let store = store();
    let mut first = store.subscribe();
    let mut second = store.subscribe();

    store.send(NoteAction::Push(7)).await.unwrap();

    first.changed().await.unwrap();
    second.changed().await.unwrap();
    assert_eq!(first.borrow_and_update().entries, vec![7]);
    assert_eq!(second.borrow_and_update().entries, vec![7]);
}

#[tokio::test]
async fn slow_observer_skips_to_newest_snapshot() {
    let store = store();
    let mut observer = store.subscribe();

    for value in 0..5 {
        store.send(NoteAction::Push(value)).await.unwrap();
    }

    observer.changed().await.unwrap();
    let snapshot = observer.borrow_and_update().clone();
    assert_eq!(snapshot.revision, 5);
    assert_eq!(snapshot.entries, vec![0, 1, 2, 3, 4]);
}

// ============================================================================
// Delayed actions
// ============================================================================

#[tokio::test(start_paused = true)]
async fn delayed_action_clears_flash() {
    let store = store();
    let mut observer = store.subscribe();

    store
        .send(flash("Task cannot be empty", Duration::from_secs(2)))
        .await
        .unwrap();
    assert_eq!(
        observer.borrow_and_update().flash.as_deref(),
        Some("Task cannot be empty")
    );

    observer.changed().await.unwrap();
    assert_eq!(observer.borrow_and_update().flash, None);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_does_not_wait_for_pending_delay() {
    let store = store();
    store.send(flash("bye", Duration::from_secs(60))).await.unwrap();
    assert_eq!(store.pending_effects(), 1);

    let started = tokio::time::Instant::now();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(store.pending_effects(), 0);
    // The timer was cancelled, so the flash is never cleared
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(store.snapshot().flash.as_deref(), Some("bye"));
    assert!(matches!(
        store.send(NoteAction::Push(1)).await,
        Err(StoreError::ShutdownInProgress)
    ));
}
