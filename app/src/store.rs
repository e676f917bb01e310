//! Typed facade over the runtime store.
//!
//! Each operation sends one command and reads the outcome the reducer
//! recorded for it under the same lock, so concurrent callers never see
//! each other's results.

use crate::error::TaskListError;
use crate::reducer::{TaskListEnvironment, TaskListReducer};
use crate::types::{Outcome, Task, TaskAction, TaskId, TaskListState};
use std::time::Duration;
use tasklist_runtime::Store;
use tokio::sync::watch;

type Inner = Store<TaskListState, TaskAction, TaskListEnvironment, TaskListReducer>;

/// The single source of truth for the task list
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TaskListStore {
    inner: Inner,
}

impl TaskListStore {
    /// Creates an empty store
    #[must_use]
    pub fn new(environment: TaskListEnvironment) -> Self {
        Self {
            inner: Store::new(TaskListState::new(), TaskListReducer::new(), environment),
        }
    }

    /// Adds a task with the trimmed `raw_text` as its label
    ///
    /// # Errors
    ///
    /// [`TaskListError::Validation`] if the text is blank; the pending input
    /// is left as it was.
    pub async fn add_task(&self, raw_text: impl Into<String>) -> Result<Task, TaskListError> {
        let action = TaskAction::AddTask {
            raw_text: raw_text.into(),
        };
        match self.dispatch(action).await? {
            Outcome::Added { task } => Ok(task),
            outcome => Err(Self::unexpected("AddTask", outcome)),
        }
    }

    /// Adds a task from the pending input
    ///
    /// # Errors
    ///
    /// [`TaskListError::Validation`] if the pending input is blank.
    pub async fn submit_pending_input(&self) -> Result<Task, TaskListError> {
        match self.dispatch(TaskAction::SubmitPendingInput).await? {
            Outcome::Added { task } => Ok(task),
            outcome => Err(Self::unexpected("SubmitPendingInput", outcome)),
        }
    }

    /// Flips a task's completion flag, returning the updated task
    ///
    /// # Errors
    ///
    /// [`TaskListError::NotFound`] if no task has this id.
    pub async fn toggle_task(&self, id: TaskId) -> Result<Task, TaskListError> {
        match self.dispatch(TaskAction::ToggleTask { id }).await? {
            Outcome::Toggled { task } => Ok(task),
            outcome => Err(Self::unexpected("ToggleTask", outcome)),
        }
    }

    /// Removes a task
    ///
    /// # Errors
    ///
    /// [`TaskListError::NotFound`] if no task has this id.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), TaskListError> {
        match self.dispatch(TaskAction::DeleteTask { id }).await? {
            Outcome::Deleted { .. } => Ok(()),
            outcome => Err(Self::unexpected("DeleteTask", outcome)),
        }
    }

    /// Replaces the pending input; the text is stored as typed
    ///
    /// # Errors
    ///
    /// [`TaskListError::Store`] if the store is shutting down.
    pub async fn set_pending_input(&self, text: impl Into<String>) -> Result<(), TaskListError> {
        let action = TaskAction::SetPendingInput { text: text.into() };
        match self.dispatch(action).await? {
            Outcome::InputChanged => Ok(()),
            outcome => Err(Self::unexpected("SetPendingInput", outcome)),
        }
    }

    /// All tasks in insertion order
    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.state(|s| s.tasks.clone()).await
    }

    /// Tasks not yet completed, in insertion order
    pub async fn active_tasks(&self) -> Vec<Task> {
        self.inner
            .state(|s| s.active_tasks().cloned().collect())
            .await
    }

    /// Completed tasks, in insertion order
    pub async fn completed_tasks(&self) -> Vec<Task> {
        self.inner
            .state(|s| s.completed_tasks().cloned().collect())
            .await
    }

    /// The text typed but not yet added
    pub async fn pending_input(&self) -> String {
        self.inner.state(|s| s.pending_input.clone()).await
    }

    /// The latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> TaskListState {
        self.inner.snapshot()
    }

    /// Subscribe to a snapshot after every operation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TaskListState> {
        self.inner.subscribe()
    }

    /// Number of feedback timers still running
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.inner.pending_effects()
    }

    /// Stop accepting operations and cancel pending feedback timers
    ///
    /// Returns as soon as the timer tasks have exited; a message still on
    /// screen is simply left as it is.
    ///
    /// # Errors
    ///
    /// [`TaskListError::Store`] if timer tasks are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), TaskListError> {
        self.inner.shutdown(timeout).await?;
        Ok(())
    }

    /// Sends `action` and returns the outcome it recorded, mapping
    /// rejections to errors
    async fn dispatch(&self, action: TaskAction) -> Result<Outcome, TaskListError> {
        let name = action.name();
        let outcome = self
            .inner
            .send_and_inspect(action, |s| s.last_outcome.clone())
            .await?;

        match outcome {
            Some(Outcome::Rejected { error }) => Err(error.into()),
            Some(Outcome::Missing { error }) => Err(error.into()),
            Some(outcome) => Ok(outcome),
            None => Err(TaskListError::MissingOutcome { action: name }),
        }
    }

    fn unexpected(action: &'static str, outcome: Outcome) -> TaskListError {
        tracing::error!(action, ?outcome, "Reducer recorded an unexpected outcome");
        TaskListError::MissingOutcome { action }
    }
}

impl std::fmt::Debug for TaskListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskListStore")
            .field("pending_effects", &self.inner.pending_effects())
            .finish_non_exhaustive()
    }
}
