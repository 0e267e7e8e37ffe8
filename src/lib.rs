// todolist - single-user to-do list persisted in SQLite

pub mod controller;
pub mod shell;
pub mod store;
pub mod task;
pub mod view;

// Re-export main types for convenience
pub use controller::{Presenter, TaskListController};
pub use shell::{Command, Shell, ShellCommand};
pub use store::TaskStore;
pub use task::{AddOutcome, DeleteOutcome, InsertOutcome, Task, TaskStatus, TaskView, ToggleOutcome};
pub use view::{OutputMode, TerminalView};

// Re-export rusqlite so callers can match on driver errors
pub use rusqlite;
