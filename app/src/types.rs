//! Domain types for the task list.
//!
//! A task list is an ordered collection of tasks plus the text the user is
//! typing. Tasks are immutable values: a toggle replaces the task wholesale.

use crate::error::{NotFoundError, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tasklist_macros::{Action, State};

/// Identifier of a task, unique within one store's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// A single to-do entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Trimmed, never blank
    pub label: String,
    /// Whether the task is done
    pub completed: bool,
    /// When the task was added
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an active task
    #[must_use]
    pub const fn new(id: TaskId, label: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            label,
            completed: false,
            created_at,
        }
    }

    /// Returns a copy with `completed` set to `completed`
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    /// True if the task is not completed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.completed
    }
}

/// How new task ids are chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Next value of a counter that never goes back; ids are never reused
    #[default]
    Monotonic,
    /// `task count + 1`; a deleted task's id can be handed out again
    Legacy,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" => Ok(Self::Monotonic),
            "legacy" => Ok(Self::Legacy),
            other => Err(other.to_string()),
        }
    }
}

/// Why a transient message is shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// `AddTask` was given blank text
    EmptyLabel,
    /// Toggle or delete named a task that does not exist
    NotFound,
}

/// A transient message for the user (the toast of a mobile UI)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Increases with every message; dismissals name the message they expire
    pub seq: u64,
    /// What triggered the message
    pub kind: FeedbackKind,
    /// Text to show
    pub message: String,
}

/// Result of the most recent operation, for the renderer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A task was appended
    Added {
        /// The new task
        task: Task,
    },
    /// A task's completion flag flipped
    Toggled {
        /// The task after the flip
        task: Task,
    },
    /// A task was removed
    Deleted {
        /// Id of the removed task
        id: TaskId,
    },
    /// The pending input changed
    InputChanged,
    /// `AddTask` was rejected
    Rejected {
        /// Why
        error: ValidationError,
    },
    /// Toggle or delete found no task
    Missing {
        /// Which id was missing
        error: NotFoundError,
    },
}

/// State of the task list aggregate
#[derive(State, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListState {
    /// Tasks in insertion order
    pub tasks: Vec<Task>,
    /// Text typed but not yet added, untrimmed
    pub pending_input: String,
    /// Highest id handed out so far
    pub last_issued_id: u64,
    /// Result of the most recent operation
    pub last_outcome: Option<Outcome>,
    /// Message currently shown to the user
    pub feedback: Option<Feedback>,
    /// Sequence number of the most recent feedback message
    pub feedback_seq: u64,
    /// Transitions applied so far
    #[revision]
    pub revision: u64,
}

impl TaskListState {
    /// Creates an empty task list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tasks
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Returns the number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Returns a task by id
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Checks if a task exists
    #[must_use]
    pub fn exists(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Position of a task in insertion order
    #[must_use]
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Tasks not yet completed, in insertion order
    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_active())
    }

    /// Completed tasks, in insertion order
    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }
}

/// Actions representing commands and events for the task list
///
/// Commands are validated by the reducer and produce events; events are
/// applied to state. `DismissFeedback` is neither: the reducer schedules it
/// to expire a message.
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskAction {
    // ========== Commands ==========
    /// Command: Add a task from raw text
    #[command]
    AddTask {
        /// Text as typed; trimmed before use
        raw_text: String,
    },

    /// Command: Add a task from the pending input
    #[command]
    SubmitPendingInput,

    /// Command: Flip a task's completion flag
    #[command]
    ToggleTask {
        /// Task to toggle
        id: TaskId,
    },

    /// Command: Remove a task
    #[command]
    DeleteTask {
        /// Task to remove
        id: TaskId,
    },

    /// Command: Replace the pending input
    #[command]
    SetPendingInput {
        /// Text as typed
        text: String,
    },

    // ========== Events ==========
    /// Event: Task was appended
    #[event]
    TaskAdded {
        /// The new task
        task: Task,
    },

    /// Event: Task completion changed
    #[event]
    TaskToggled {
        /// Task identifier
        id: TaskId,
        /// New completion flag
        completed: bool,
    },

    /// Event: Task was removed
    #[event]
    TaskDeleted {
        /// Task identifier
        id: TaskId,
    },

    /// Event: Pending input was replaced
    #[event]
    PendingInputChanged {
        /// Text as typed
        text: String,
    },

    /// Event: `AddTask` was rejected
    #[event]
    AddRejected {
        /// Why
        error: ValidationError,
    },

    /// Event: Toggle or delete named an unknown task
    #[event]
    TaskNotFound {
        /// Which id
        error: NotFoundError,
    },

    // ========== Timers ==========
    /// Expire the feedback message with this sequence number
    DismissFeedback {
        /// Sequence number of the message to expire
        seq: u64,
    },
}
