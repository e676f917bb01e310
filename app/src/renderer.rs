//! Rendering of task list snapshots.
//!
//! The store never calls a renderer. A render loop subscribes to snapshots
//! and redraws after every operation.

use crate::types::{Task, TaskId, TaskListState};
use serde::Serialize;
use std::io::{self, Write};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Screen title
pub const TITLE: &str = "My To-Do List";
/// Shown on the input line when nothing has been typed
pub const INPUT_PLACEHOLDER: &str = "Enter task";
/// Heading of the active section
pub const ACTIVE_HEADING: &str = "Items";
/// Shown when there are no active tasks
pub const ACTIVE_EMPTY: &str = "No items yet";
/// Heading of the completed section
pub const COMPLETED_HEADING: &str = "Completed Items";
/// Shown when there are no completed tasks
pub const COMPLETED_EMPTY: &str = "No completed items yet";

/// One row of a section
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    /// Task id, used to toggle or delete it
    pub id: TaskId,
    /// Checkbox state
    pub checked: bool,
    /// Label text
    pub label: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            checked: task.completed,
            label: task.label.clone(),
        }
    }
}

/// Everything a renderer needs to draw one frame
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskListView {
    /// Screen title
    pub title: &'static str,
    /// Pending input exactly as typed
    pub input: String,
    /// Active tasks in insertion order
    pub active: Vec<TaskRow>,
    /// Completed tasks in insertion order
    pub completed: Vec<TaskRow>,
    /// Transient message, if one is showing
    pub feedback: Option<String>,
    /// Snapshot revision this view was built from
    pub revision: u64,
}

impl TaskListView {
    /// Builds the view of a snapshot
    #[must_use]
    pub fn from_state(state: &TaskListState) -> Self {
        Self {
            title: TITLE,
            input: state.pending_input.clone(),
            active: state.active_tasks().map(TaskRow::from).collect(),
            completed: state.completed_tasks().map(TaskRow::from).collect(),
            feedback: state.feedback.as_ref().map(|f| f.message.clone()),
            revision: state.revision(),
        }
    }
}

/// Draws views somewhere
pub trait Renderer: Send {
    /// Draws one frame
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    fn render(&mut self, view: &TaskListView) -> io::Result<()>;
}

/// Plain-text renderer for terminals
#[derive(Debug)]
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Renders to `out`
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// An empty section is just its placeholder, without the heading
    fn section(&mut self, heading: &str, rows: &[TaskRow], empty: &str) -> io::Result<()> {
        if rows.is_empty() {
            return writeln!(self.out, "{empty}");
        }
        writeln!(self.out, "{heading}")?;
        for row in rows {
            let mark = if row.checked { 'x' } else { ' ' };
            writeln!(self.out, "  [{mark}] #{} {}", row.id, row.label)?;
        }
        Ok(())
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &TaskListView) -> io::Result<()> {
        writeln!(self.out, "== {} ==", view.title)?;
        if view.input.is_empty() {
            writeln!(self.out, "> ({INPUT_PLACEHOLDER})")?;
        } else {
            writeln!(self.out, "> {}", view.input)?;
        }
        self.section(ACTIVE_HEADING, &view.active, ACTIVE_EMPTY)?;
        self.section(COMPLETED_HEADING, &view.completed, COMPLETED_EMPTY)?;
        if let Some(message) = &view.feedback {
            writeln!(self.out, "! {message}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Renderer emitting one JSON document per line
#[derive(Debug)]
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write + Send> JsonRenderer<W> {
    /// Renders to `out`
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn render(&mut self, view: &TaskListView) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, view)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Redraws after every snapshot until the store is dropped
///
/// Draws the current snapshot immediately. Snapshots published faster than
/// the renderer draws are skipped; the latest is always drawn.
pub fn spawn_render_loop<R>(
    mut snapshots: watch::Receiver<TaskListState>,
    mut renderer: R,
) -> JoinHandle<io::Result<()>>
where
    R: Renderer + 'static,
{
    tokio::spawn(async move {
        loop {
            let view = TaskListView::from_state(&snapshots.borrow_and_update());
            tracing::trace!(revision = view.revision, "Rendering snapshot");
            renderer.render(&view)?;

            if snapshots.changed().await.is_err() {
                tracing::debug!("Snapshot channel closed, render loop exiting");
                return Ok(());
            }
        }
    })
}
