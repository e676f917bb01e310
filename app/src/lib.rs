//! A minimal to-do list: add, toggle, and delete tasks.
//!
//! The task list is a single aggregate owned by a [`TaskListStore`]. Every
//! operation is a command reduced into state; renderers observe snapshots
//! and never mutate anything.
//!
//! - Labels are trimmed and never blank
//! - Toggling flips a task in place; deleting preserves the order of the rest
//! - Unknown ids are reported, never fatal
//! - Rejections raise a transient feedback message that expires on a timer
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasklist::{TaskListEnvironment, TaskListStore};
//! use tasklist_core::environment::SystemClock;
//!
//! # async fn example() -> Result<(), tasklist::TaskListError> {
//! let store = TaskListStore::new(TaskListEnvironment::new(Arc::new(SystemClock)));
//!
//! let task = store.add_task("Buy milk").await?;
//! store.toggle_task(task.id).await?;
//!
//! assert_eq!(store.completed_tasks().await.len(), 1);
//! store.delete_task(task.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod reducer;
pub mod renderer;
pub mod store;
pub mod types;

pub use command::{Command, CommandError};
pub use config::{AppConfig, ConfigError, RenderMode};
pub use error::{NotFoundError, TaskListError, ValidationError};
pub use reducer::{
    DEFAULT_FEEDBACK_TTL, DEFAULT_FEEDBACK_TTL_MS, TaskListEnvironment, TaskListReducer,
};
pub use renderer::{JsonRenderer, Renderer, TaskListView, TerminalRenderer, spawn_render_loop};
pub use store::TaskListStore;
pub use types::{
    Feedback, FeedbackKind, IdStrategy, Outcome, Task, TaskAction, TaskId, TaskListState,
};
