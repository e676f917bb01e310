//! Reducer logic for the task list aggregate.
//!
//! Commands are validated, turned into events, and events are applied to
//! state. Rejections are events too, so the renderer can show them; each
//! rejection schedules its own dismissal.

use crate::error::{NotFoundError, ValidationError};
use crate::types::{
    Feedback, FeedbackKind, IdStrategy, Outcome, Task, TaskAction, TaskId, TaskListState,
};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// How long a feedback message stays up by default, in milliseconds (a short toast)
pub const DEFAULT_FEEDBACK_TTL_MS: u64 = 2000;

/// [`DEFAULT_FEEDBACK_TTL_MS`] as a `Duration`
pub const DEFAULT_FEEDBACK_TTL: Duration = Duration::from_millis(DEFAULT_FEEDBACK_TTL_MS);

/// Environment dependencies for the task list reducer
#[derive(Clone)]
pub struct TaskListEnvironment {
    /// Clock for task timestamps
    pub clock: Arc<dyn Clock>,
    /// How ids are assigned
    pub id_strategy: IdStrategy,
    /// How long feedback stays up; zero keeps it until the next successful operation
    pub feedback_ttl: Duration,
}

impl TaskListEnvironment {
    /// Creates an environment with monotonic ids and the default feedback TTL
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            id_strategy: IdStrategy::default(),
            feedback_ttl: DEFAULT_FEEDBACK_TTL,
        }
    }

    /// Sets the id strategy
    #[must_use]
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Sets the feedback TTL
    #[must_use]
    pub fn with_feedback_ttl(mut self, feedback_ttl: Duration) -> Self {
        self.feedback_ttl = feedback_ttl;
        self
    }
}

impl std::fmt::Debug for TaskListEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskListEnvironment")
            .field("id_strategy", &self.id_strategy)
            .field("feedback_ttl", &self.feedback_ttl)
            .finish_non_exhaustive()
    }
}

/// Reducer for the task list aggregate
#[derive(Clone, Debug)]
pub struct TaskListReducer;

impl TaskListReducer {
    /// Creates a new `TaskListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates raw text for `AddTask`, returning the label to store
    fn validate_label(raw_text: &str) -> Result<String, ValidationError> {
        let label = raw_text.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        Ok(label.to_string())
    }

    /// Validates that a task exists, returning it
    fn validate_exists(state: &TaskListState, id: TaskId) -> Result<&Task, NotFoundError> {
        state.get(id).ok_or(NotFoundError { id })
    }

    /// Chooses the id for the next task
    fn next_id(state: &TaskListState, strategy: IdStrategy) -> TaskId {
        match strategy {
            IdStrategy::Monotonic => TaskId::new(state.last_issued_id + 1),
            IdStrategy::Legacy => TaskId::new(state.tasks.len() as u64 + 1),
        }
    }

    /// Turns an `AddTask` into its event
    fn decide_add(state: &TaskListState, raw_text: &str, env: &TaskListEnvironment) -> TaskAction {
        match Self::validate_label(raw_text) {
            Ok(label) => TaskAction::TaskAdded {
                task: Task::new(
                    Self::next_id(state, env.id_strategy),
                    label,
                    env.clock.now(),
                ),
            },
            Err(error) => TaskAction::AddRejected { error },
        }
    }

    /// Sets a new feedback message, returning its sequence number
    fn raise_feedback(state: &mut TaskListState, kind: FeedbackKind, message: String) -> u64 {
        state.feedback_seq += 1;
        state.feedback = Some(Feedback {
            seq: state.feedback_seq,
            kind,
            message,
        });
        state.feedback_seq
    }

    /// Applies an event to state
    fn apply_event(state: &mut TaskListState, action: &TaskAction) {
        match action {
            TaskAction::TaskAdded { task } => {
                state.tasks.push(task.clone());
                state.last_issued_id = state.last_issued_id.max(task.id.get());
                state.pending_input.clear();
                state.feedback = None;
                state.last_outcome = Some(Outcome::Added { task: task.clone() });
            },
            TaskAction::TaskToggled { id, completed } => {
                if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == *id) {
                    *slot = slot.with_completed(*completed);
                    state.last_outcome = Some(Outcome::Toggled { task: slot.clone() });
                }
                state.feedback = None;
            },
            TaskAction::TaskDeleted { id } => {
                // First match only, like toggle; ids repeat under IdStrategy::Legacy
                if let Some(index) = state.position(*id) {
                    state.tasks.remove(index);
                }
                state.feedback = None;
                state.last_outcome = Some(Outcome::Deleted { id: *id });
            },
            TaskAction::PendingInputChanged { text } => {
                state.pending_input.clone_from(text);
                state.last_outcome = Some(Outcome::InputChanged);
            },
            TaskAction::AddRejected { error } => {
                Self::raise_feedback(state, FeedbackKind::EmptyLabel, error.to_string());
                state.last_outcome = Some(Outcome::Rejected { error: *error });
            },
            TaskAction::TaskNotFound { error } => {
                Self::raise_feedback(state, FeedbackKind::NotFound, error.to_string());
                state.last_outcome = Some(Outcome::Missing { error: *error });
            },
            TaskAction::DismissFeedback { seq } => {
                if state.feedback.as_ref().is_some_and(|f| f.seq == *seq) {
                    state.feedback = None;
                }
            },
            // Commands are not applied to state
            TaskAction::AddTask { .. }
            | TaskAction::SubmitPendingInput
            | TaskAction::ToggleTask { .. }
            | TaskAction::DeleteTask { .. }
            | TaskAction::SetPendingInput { .. } => {},
        }
    }

    /// Applies `event`, scheduling dismissal if it raised feedback
    fn commit(
        state: &mut TaskListState,
        event: &TaskAction,
        env: &TaskListEnvironment,
    ) -> SmallVec<[Effect<TaskAction>; 4]> {
        let previous_seq = state.feedback_seq;
        Self::apply_event(state, event);

        if state.feedback_seq == previous_seq || env.feedback_ttl.is_zero() {
            return SmallVec::new();
        }

        tracing::debug!(
            seq = state.feedback_seq,
            ttl_ms = env.feedback_ttl.as_millis(),
            "Scheduling feedback dismissal"
        );
        smallvec![Effect::delay(
            env.feedback_ttl,
            TaskAction::DismissFeedback {
                seq: state.feedback_seq,
            },
        )]
    }
}

impl Default for TaskListReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TaskListReducer {
    type State = TaskListState;
    type Action = TaskAction;
    type Environment = TaskListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing");
        state.bump_revision();

        let event = match action {
            // ========== Commands ==========
            TaskAction::AddTask { raw_text } => Self::decide_add(state, &raw_text, env),

            TaskAction::SubmitPendingInput => Self::decide_add(state, &state.pending_input, env),

            TaskAction::ToggleTask { id } => match Self::validate_exists(state, id) {
                Ok(task) => TaskAction::TaskToggled {
                    id,
                    completed: !task.completed,
                },
                Err(error) => TaskAction::TaskNotFound { error },
            },

            TaskAction::DeleteTask { id } => match Self::validate_exists(state, id) {
                Ok(_) => TaskAction::TaskDeleted { id },
                Err(error) => TaskAction::TaskNotFound { error },
            },

            TaskAction::SetPendingInput { text } => TaskAction::PendingInputChanged { text },

            // ========== Events and timers ==========
            // Applied directly, e.g. when replayed
            event => event,
        };

        if matches!(
            event,
            TaskAction::AddRejected { .. } | TaskAction::TaskNotFound { .. }
        ) {
            tracing::warn!(event = event.name(), "Operation rejected");
        } else {
            tracing::debug!(event = event.name(), "Applying event");
        }

        Self::commit(state, &event, env)
    }
}
