//! Error types for task list operations.

use crate::types::TaskId;
use serde::{Deserialize, Serialize};
use tasklist_runtime::StoreError;
use thiserror::Error;

/// Rejection of an `AddTask`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    /// The text was empty after trimming
    #[error("Task cannot be empty")]
    EmptyLabel,
}

/// A toggle or delete named a task that does not exist
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Task {id} not found")]
pub struct NotFoundError {
    /// The id that matched nothing
    pub id: TaskId,
}

/// Errors returned by [`TaskListStore`](crate::store::TaskListStore)
///
/// `Validation` and `NotFound` are ordinary outcomes the caller shows to the
/// user; `Store` means the store has stopped accepting operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskListError {
    /// Input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No task with the given id
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The store refused the operation
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),

    /// The reducer recorded no matching outcome for the action
    #[error("No outcome recorded for {action}")]
    MissingOutcome {
        /// Name of the action that was sent
        action: &'static str,
    },
}

impl TaskListError {
    /// True for errors the user caused and can simply retry
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
