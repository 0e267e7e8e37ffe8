// SQLite-backed task store

use crate::task::{DeleteOutcome, InsertOutcome, Task, TaskStatus, ToggleOutcome};
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the single table holding tasks
pub const TABLE_NAME: &str = "to_do_list";

/// File name of the database inside its directory
pub const DB_FILE_NAME: &str = "to-do_list.db";

const TABLE_EXISTS: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1";

const CREATE_TABLE: &str = "CREATE TABLE to_do_list (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task TEXT,
    status INTEGER
)";

const INSERT_TASK: &str = "INSERT INTO to_do_list (task, status) VALUES (?1, ?2)";
const SELECT_ALL: &str = "SELECT id, task, status FROM to_do_list";
const SELECT_BY_ID: &str = "SELECT id, task, status FROM to_do_list WHERE id = ?1";
const COUNT_BY_TEXT: &str = "SELECT COUNT(*) FROM to_do_list WHERE task = ?1";
const TOGGLE_STATUS: &str = "UPDATE to_do_list SET status = 1 - status WHERE id = ?1";
const DELETE_BY_ID: &str = "DELETE FROM to_do_list WHERE id = ?1";

/// Default database location: `<data dir>/todolist/to-do_list.db`, or the
/// current directory when the platform has no data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("todolist").join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

/// Persistent task store owning its SQLite connection
///
/// Each statement auto-commits. The store is single-writer: file-backed
/// stores hold an exclusive lock on `<db>.lock` until closed or dropped.
pub struct TaskStore {
    path: Option<PathBuf>,
    db: Connection,
    _lock: Option<File>,
}

impl TaskStore {
    /// Open or create a store at the given database file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let lock = Self::acquire_lock(&path)?;

        let db = Connection::open(&path).context("Failed to open SQLite database")?;

        let store = Self {
            path: Some(path),
            db,
            _lock: Some(lock),
        };

        if store.ensure_schema()? {
            info!(path = ?store.path, "Created task table");
        }

        Ok(store)
    }

    /// Open a throwaway store that lives only in memory
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;

        let store = Self {
            path: None,
            db,
            _lock: None,
        };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Path of the database file, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    /// Close the connection, surfacing any error the driver reports
    pub fn close(self) -> Result<()> {
        let TaskStore { path, db, _lock } = self;
        db.close().map_err(|(_, e)| e)?;
        debug!(?path, "Closed task store");
        Ok(())
    }

    fn acquire_lock(db_path: &Path) -> Result<File> {
        let file_name = db_path
            .file_name()
            .ok_or_else(|| eyre!("Database path has no file name: {:?}", db_path))?;
        let lock_path = db_path.with_file_name(format!("{}.lock", file_name.to_string_lossy()));

        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context("Failed to open lock file")?;

        file.try_lock_exclusive()
            .with_context(|| format!("Task database is already in use: {}", db_path.display()))?;

        Ok(file)
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Create the task table unless one with that name already exists
    ///
    /// Returns true if the table was created. The shape of an existing table
    /// is not checked.
    pub fn ensure_schema(&self) -> Result<bool> {
        let existing: Option<String> = self
            .db
            .query_row(TABLE_EXISTS, [TABLE_NAME], |row| row.get(0))
            .optional()?;

        if existing.is_some() {
            debug!(table = TABLE_NAME, "Task table already present");
            return Ok(false);
        }

        debug!(table = TABLE_NAME, "Creating task table");
        self.db.execute(CREATE_TABLE, [])?;
        Ok(true)
    }

    // ========================================================================
    // CRUD API
    // ========================================================================

    /// Insert a task unless one with exactly the same text exists
    ///
    /// The duplicate check and the insert are separate statements.
    pub fn insert(&mut self, text: &str, status: TaskStatus) -> Result<InsertOutcome> {
        if self.count_matching(text)? > 0 {
            warn!(text, "Task already exists");
            return Ok(InsertOutcome::Duplicate);
        }

        self.db.execute(INSERT_TASK, params![text, status])?;
        info!(text, "Task inserted");

        Ok(InsertOutcome::Inserted)
    }

    /// All tasks in the order SQLite returns them
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(SELECT_ALL)?;
        let rows = stmt.query_map([], Self::task_from_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Get a task by id
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .db
            .query_row(SELECT_BY_ID, [id], Self::task_from_row)
            .optional()?;
        Ok(task)
    }

    /// Flip a task between incomplete and complete
    pub fn toggle_status(&mut self, id: i64) -> Result<ToggleOutcome> {
        let affected = self.db.execute(TOGGLE_STATUS, [id])?;

        if affected == 0 {
            warn!(id, "No task with that id to toggle");
            return Ok(ToggleOutcome::NotFound);
        }

        debug!(id, "Task status toggled");
        Ok(ToggleOutcome::Toggled)
    }

    /// Delete a task by id
    pub fn delete(&mut self, id: i64) -> Result<DeleteOutcome> {
        if self.get(id)?.is_none() {
            warn!(id, "There are no tasks left with that id");
            return Ok(DeleteOutcome::NotFound);
        }

        self.db.execute(DELETE_BY_ID, [id])?;
        info!(id, "Task deleted");

        Ok(DeleteOutcome::Deleted)
    }

    /// Number of tasks whose text equals `text` exactly
    pub fn count_matching(&self, text: &str) -> Result<usize> {
        let count: i64 = self.db.query_row(COUNT_BY_TEXT, [text], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            text: row.get(1)?,
            status: row.get(2)?,
        })
    }
}
