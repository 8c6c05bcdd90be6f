//! SQLite-backed task storage for tasks-tracker.

/// Error types.
pub mod error;

pub use crate::error::SqliteStoreError;

use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tasks_tracker_core::{NewTask, OwnerId, Priority, Status, Task, TaskChanges, TaskId};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

/// Maximum number of rows returned by [`SqliteStore::lookup_tasks`].
pub const LOOKUP_LIMIT: usize = 100;

type StoreResult<T> = Result<T, SqliteStoreError>;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          TEXT PRIMARY KEY NOT NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    tags        TEXT NOT NULL DEFAULT '[]',
    status      INTEGER NOT NULL DEFAULT 0 CHECK (status BETWEEN 0 AND 4),
    priority    INTEGER NOT NULL DEFAULT 0 CHECK (priority BETWEEN 0 AND 2),
    user_id     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS tasks_user_id ON tasks (user_id);
";

const TASK_COLUMNS: &str =
    "id, title, description, tags, status, priority, user_id, created_at, updated_at";

const INSERT_WITH_DEFAULT_STATUS: &str = "INSERT INTO tasks
    (id, title, description, tags, priority, user_id, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)";

const INSERT_WITH_STATUS: &str = "INSERT INTO tasks
    (id, title, description, tags, priority, user_id, created_at, updated_at, status)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8)";

const UPDATE_TASK: &str = "UPDATE tasks
    SET title = ?2, description = ?3, tags = ?4, status = ?5, priority = ?6,
        user_id = ?7, updated_at = ?8
    WHERE id = ?1";

const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Storage backed by a single `tasks` table.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and apply the schema.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created or SQLite
    /// refuses to open the file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened task database");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SqliteStoreError::LockError)
    }

    /// Insert a row and return it as stored (defaults applied).
    ///
    /// # Errors
    /// Returns an error if encoding or the insert fails.
    pub fn create_task(&self, draft: &NewTask) -> StoreResult<Task> {
        let id = TaskId::new();
        let id_text = id.to_string();
        let tags = serde_json::to_string(&draft.tags)?;
        let now = OffsetDateTime::now_utc().format(&Rfc3339)?;
        let priority = i64::from(draft.priority.ordinal());

        let conn = self.lock()?;
        match draft.status {
            Some(status) => conn.execute(
                INSERT_WITH_STATUS,
                params![
                    id_text,
                    draft.title,
                    draft.description,
                    tags,
                    priority,
                    draft.owner_id.as_str(),
                    now,
                    i64::from(status.ordinal()),
                ],
            )?,
            None => conn.execute(
                INSERT_WITH_DEFAULT_STATUS,
                params![
                    id_text,
                    draft.title,
                    draft.description,
                    tags,
                    priority,
                    draft.owner_id.as_str(),
                    now,
                ],
            )?,
        };
        let task = Self::select_one(&conn, &id_text)?.ok_or_else(|| SqliteStoreError::invalid("id", &id_text))?;
        drop(conn);

        info!(task = %task.id, owner = %task.owner_id, "Created task");
        Ok(task)
    }

    /// Overwrite one row keyed by `changes.id`.
    ///
    /// Returns `None` when no row has that id.
    ///
    /// # Errors
    /// Returns an error if encoding or the update fails.
    pub fn update_task(&self, changes: &TaskChanges) -> StoreResult<Option<Task>> {
        let id_text = changes.id.to_string();
        let tags = serde_json::to_string(&changes.tags)?;
        let now = OffsetDateTime::now_utc().format(&Rfc3339)?;

        let conn = self.lock()?;
        let affected = conn.execute(
            UPDATE_TASK,
            params![
                id_text,
                changes.title,
                changes.description,
                tags,
                i64::from(changes.status.ordinal()),
                i64::from(changes.priority.ordinal()),
                changes.owner_id.as_str(),
                now,
            ],
        )?;
        if affected == 0 {
            debug!(task = %changes.id, "Update matched no row");
            return Ok(None);
        }
        let task = Self::select_one(&conn, &id_text)?;
        drop(conn);

        info!(task = %changes.id, "Updated task");
        Ok(task)
    }

    /// Remove the row with `id`. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete statement fails.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
        let affected = self.lock()?.execute(DELETE_TASK, params![id.to_string()])?;
        if affected == 0 {
            debug!(task = %id, "Delete matched no row");
        } else {
            info!(task = %id, "Deleted task");
        }
        Ok(affected > 0)
    }

    /// Every task owned by `owner`, in insertion order.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_tasks(&self, owner: &OwnerId) -> StoreResult<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt
            .query_map(params![owner.as_str()], RawTask::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let tasks = rows
            .into_iter()
            .map(RawTask::into_task)
            .collect::<StoreResult<Vec<_>>>()?;
        debug!(owner = %owner, count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Load a single task by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.lock()?;
        Self::select_one(&conn, &id.to_string())
    }

    /// Tasks whose id equals `id`, capped at `limit` (at most [`LOOKUP_LIMIT`]).
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn lookup_tasks(&self, id: TaskId, limit: usize) -> StoreResult<Vec<Task>> {
        let limit = i64::try_from(limit.min(LOOKUP_LIMIT)).unwrap_or(0);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 ORDER BY rowid LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(params![id.to_string(), limit], RawTask::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawTask::into_task).collect()
    }

    fn select_one(conn: &Connection, id: &str) -> StoreResult<Option<Task>> {
        let raw = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                RawTask::from_row,
            )
            .optional()?;
        raw.map(RawTask::into_task).transpose()
    }
}

/// Row as read from SQLite, before domain validation.
struct RawTask {
    id: String,
    title: String,
    description: String,
    tags: String,
    status: i64,
    priority: i64,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl RawTask {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            tags: row.get(3)?,
            status: row.get(4)?,
            priority: row.get(5)?,
            user_id: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_task(self) -> StoreResult<Task> {
        let id = self
            .id
            .parse::<TaskId>()
            .map_err(|_| SqliteStoreError::invalid("id", &self.id))?;
        let status =
            Status::from_ordinal(self.status).ok_or_else(|| SqliteStoreError::invalid("status", self.status))?;
        let priority = Priority::from_ordinal(self.priority)
            .ok_or_else(|| SqliteStoreError::invalid("priority", self.priority))?;
        Ok(Task {
            id,
            title: self.title,
            description: self.description,
            tags: serde_json::from_str(&self.tags)?,
            status,
            priority,
            owner_id: OwnerId::new(self.user_id),
            created_at: OffsetDateTime::parse(&self.created_at, &Rfc3339)?,
            updated_at: OffsetDateTime::parse(&self.updated_at, &Rfc3339)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap_or_else(|err| panic!("open store: {err}"))
    }

    #[test]
    fn create_applies_store_default_status() {
        let store = store();
        let task = store
            .create_task(&NewTask::new(OwnerId::new("u1"), "New task"))
            .unwrap_or_else(|err| panic!("create: {err}"));
        assert_eq!(task.status, Status::Backlog);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.title, "New task");
    }

    #[test]
    fn out_of_range_ordinal_is_a_decode_error() {
        let store = store();
        let task = store
            .create_task(&NewTask::new(OwnerId::new("u1"), "Broken"))
            .unwrap_or_else(|err| panic!("create: {err}"));
        {
            let conn = store.lock().unwrap_or_else(|err| panic!("lock: {err}"));
            conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
                .unwrap_or_else(|err| panic!("pragma: {err}"));
            conn.execute(
                "UPDATE tasks SET status = 9 WHERE id = ?1",
                params![task.id.to_string()],
            )
            .unwrap_or_else(|err| panic!("corrupt row: {err}"));
        }
        let err = store
            .get_task(task.id)
            .err()
            .unwrap_or_else(|| panic!("decode must fail"));
        assert!(matches!(err, SqliteStoreError::InvalidColumn { column: "status", .. }));
    }

    #[test]
    fn check_constraint_rejects_out_of_range_status() {
        let store = store();
        let conn = store.lock().unwrap_or_else(|err| panic!("lock: {err}"));
        let result = conn.execute(
            "INSERT INTO tasks (id, title, user_id, created_at, updated_at, status)
             VALUES ('x', 't', 'u1', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z', 7)",
            [],
        );
        assert!(result.is_err());
    }
}
