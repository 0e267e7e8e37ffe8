// Task records and the outcomes of store operations

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;

/// A persisted to-do item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub status: TaskStatus,
}

/// Completion state, stored as 0 or 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Incomplete,
    Complete,
}

impl TaskStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            TaskStatus::Incomplete => 0,
            TaskStatus::Complete => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(TaskStatus::Incomplete),
            1 => Some(TaskStatus::Complete),
            _ => None,
        }
    }

    pub fn is_complete(self) -> bool {
        self == TaskStatus::Complete
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Incomplete => write!(f, "incomplete"),
            TaskStatus::Complete => write!(f, "complete"),
        }
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        TaskStatus::from_i64(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// Row shape published to the presentation layer on every refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: i64,
    pub text: String,
    pub status: TaskStatus,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            text: task.text,
            status: task.status,
        }
    }
}

/// Result of `TaskStore::insert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with identical text already exists; nothing was written
    Duplicate,
}

/// Result of `TaskStore::toggle_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled,
    NotFound,
}

/// Result of `TaskStore::delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Result of `TaskListController::add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
    /// Text was empty or whitespace-only; the store was not touched
    Rejected,
}
