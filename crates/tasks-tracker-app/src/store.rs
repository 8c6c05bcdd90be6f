//! Storage abstraction consumed by the task service.

use anyhow::Error;
use std::sync::Arc;
use tasks_tracker_core::{NewTask, OwnerId, Task, TaskChanges, TaskId};
use tasks_tracker_store_sqlite::{SqliteStore, SqliteStoreError};

/// Minimal storage abstraction required by [`TaskService`](crate::service::TaskService).
pub trait TaskStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Insert a row and return it with store defaults applied.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn create_task(&self, draft: &NewTask) -> Result<Task, Self::Error>;

    /// Overwrite the row keyed by `changes.id`; `None` when it does not exist.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn update_task(&self, changes: &TaskChanges) -> Result<Option<Task>, Self::Error>;

    /// Remove the row; `false` when it did not exist.
    ///
    /// # Errors
    /// Returns a store-specific error when the delete fails.
    fn delete_task(&self, id: TaskId) -> Result<bool, Self::Error>;

    /// Every task of `owner` in insertion order.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, Self::Error>;

    /// Load one task by id.
    ///
    /// # Errors
    /// Returns a store-specific error when the read fails.
    fn get_task(&self, id: TaskId) -> Result<Option<Task>, Self::Error>;

    /// Tasks matching `id`, at most `limit` rows.
    ///
    /// The default implementation goes through [`get_task`](Self::get_task).
    ///
    /// # Errors
    /// Returns a store-specific error when the read fails.
    fn lookup_tasks(&self, id: TaskId, limit: usize) -> Result<Vec<Task>, Self::Error> {
        let found = self.get_task(id)?;
        Ok(found.into_iter().take(limit).collect())
    }
}

impl TaskStore for SqliteStore {
    type Error = SqliteStoreError;

    fn create_task(&self, draft: &NewTask) -> Result<Task, Self::Error> {
        Self::create_task(self, draft)
    }

    fn update_task(&self, changes: &TaskChanges) -> Result<Option<Task>, Self::Error> {
        Self::update_task(self, changes)
    }

    fn delete_task(&self, id: TaskId) -> Result<bool, Self::Error> {
        Self::delete_task(self, id)
    }

    fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, Self::Error> {
        Self::list_tasks(self, owner)
    }

    fn get_task(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        Self::get_task(self, id)
    }

    fn lookup_tasks(&self, id: TaskId, limit: usize) -> Result<Vec<Task>, Self::Error> {
        Self::lookup_tasks(self, id, limit)
    }
}

impl<S> TaskStore for &S
where
    S: TaskStore + ?Sized,
{
    type Error = S::Error;

    fn create_task(&self, draft: &NewTask) -> Result<Task, Self::Error> {
        (*self).create_task(draft)
    }

    fn update_task(&self, changes: &TaskChanges) -> Result<Option<Task>, Self::Error> {
        (*self).update_task(changes)
    }

    fn delete_task(&self, id: TaskId) -> Result<bool, Self::Error> {
        (*self).delete_task(id)
    }

    fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, Self::Error> {
        (*self).list_tasks(owner)
    }

    fn get_task(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        (*self).get_task(id)
    }

    fn lookup_tasks(&self, id: TaskId, limit: usize) -> Result<Vec<Task>, Self::Error> {
        (*self).lookup_tasks(id, limit)
    }
}

impl<S> TaskStore for Arc<S>
where
    S: TaskStore + ?Sized,
{
    type Error = S::Error;

    fn create_task(&self, draft: &NewTask) -> Result<Task, Self::Error> {
        (**self).create_task(draft)
    }

    fn update_task(&self, changes: &TaskChanges) -> Result<Option<Task>, Self::Error> {
        (**self).update_task(changes)
    }

    fn delete_task(&self, id: TaskId) -> Result<bool, Self::Error> {
        (**self).delete_task(id)
    }

    fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, Self::Error> {
        (**self).list_tasks(owner)
    }

    fn get_task(&self, id: TaskId) -> Result<Option<Task>, Self::Error> {
        (**self).get_task(id)
    }

    fn lookup_tasks(&self, id: TaskId, limit: usize) -> Result<Vec<Task>, Self::Error> {
        (**self).lookup_tasks(id, limit)
    }
}
