//! Shared task mutation service used by the CLI and TUI surfaces.

use anyhow::Error;
use tasks_tracker_core::{NewTask, OwnerId, Priority, Status, Task, TaskChanges, TaskId, normalize_tags};
use tracing::{debug, info, warn};

use crate::modal::{SubmitOutcome, TaskMutation};
use crate::store::TaskStore;

/// Maximum number of rows returned by [`TaskService::lookup`].
pub const LOOKUP_LIMIT: usize = 100;

/// Errors surfaced by [`TaskService`].
#[derive(thiserror::Error, Debug)]
pub enum TaskWriteError {
    /// Title was empty or whitespace.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Target task could not be found.
    #[error("task {0} not found")]
    MissingTask(TaskId),
    /// Backing store returned an error.
    #[error("store error: {0}")]
    Store(#[from] Error),
}

impl TaskWriteError {
    /// Map the error onto the modal's submit outcome.
    #[must_use]
    pub fn to_outcome(&self) -> SubmitOutcome {
        match self {
            Self::MissingTask(_) => SubmitOutcome::NotFound,
            other => SubmitOutcome::Failed(other.to_string()),
        }
    }
}

/// Input for [`TaskService::create`].
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Owner of the new task.
    pub owner: OwnerId,
    /// Title (required).
    pub title: String,
    /// Description.
    pub description: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Priority; Low when absent.
    pub priority: Option<Priority>,
}

/// Input for [`TaskService::update`].
///
/// Absent fields keep the value stored on the task.
#[derive(Debug, Clone)]
pub struct UpdateTaskInput {
    /// Target task.
    pub id: TaskId,
    /// Owner written back to the row.
    pub owner: OwnerId,
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
    /// New status.
    pub status: Option<Status>,
    /// New priority.
    pub priority: Option<Priority>,
}

impl UpdateTaskInput {
    /// Input that only rewrites the owner (every other field kept).
    #[must_use]
    pub const fn new(id: TaskId, owner: OwnerId) -> Self {
        Self {
            id,
            owner,
            title: None,
            description: None,
            tags: None,
            status: None,
            priority: None,
        }
    }

    fn resolve(self, current: Task) -> TaskChanges {
        TaskChanges {
            id: self.id,
            owner_id: self.owner,
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            tags: self.tags.map_or(current.tags, normalize_tags),
            status: self.status.unwrap_or(current.status),
            priority: self.priority.unwrap_or(current.priority),
        }
    }
}

/// Effect of a successfully applied [`TaskMutation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationApplied {
    /// A task was inserted.
    Created(Task),
    /// A task was overwritten.
    Updated(Task),
    /// A task was removed.
    Deleted(TaskId),
}

/// Service façade that validates inputs and talks to the store.
pub struct TaskService<S> {
    store: S,
}

impl<S> TaskService<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Expose a reference to the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: TaskStore> TaskService<S> {
    fn store_error(err: S::Error) -> TaskWriteError {
        TaskWriteError::Store(err.into())
    }

    /// Create a task for `input.owner`.
    ///
    /// # Errors
    /// Returns [`TaskWriteError::EmptyTitle`] for blank titles or a store error.
    pub fn create(&self, input: CreateTaskInput) -> Result<Task, TaskWriteError> {
        let title = validate_title(&input.title)?;
        let draft = NewTask::new(input.owner, title)
            .with_description(input.description)
            .with_tags(input.tags)
            .with_priority(input.priority.unwrap_or_default());
        let task = self.store.create_task(&draft).map_err(Self::store_error)?;
        info!(task = %task.id, "Task created");
        Ok(task)
    }

    /// Overwrite a task, keeping stored values for absent fields.
    ///
    /// # Errors
    /// Returns [`TaskWriteError::MissingTask`] when the task does not exist,
    /// [`TaskWriteError::EmptyTitle`] for a blank title, or a store error.
    pub fn update(&self, input: UpdateTaskInput) -> Result<Task, TaskWriteError> {
        let title = input.title.as_deref().map(validate_title).transpose()?;
        let id = input.id;
        let current = self
            .store
            .get_task(id)
            .map_err(Self::store_error)?
            .ok_or(TaskWriteError::MissingTask(id))?;
        let changes = UpdateTaskInput { title, ..input }.resolve(current);
        let task = self
            .store
            .update_task(&changes)
            .map_err(Self::store_error)?
            .ok_or(TaskWriteError::MissingTask(id))?;
        info!(task = %id, status = %task.status, priority = %task.priority, "Task updated");
        Ok(task)
    }

    /// Remove a task. No ownership check is performed.
    ///
    /// # Errors
    /// Returns [`TaskWriteError::MissingTask`] when nothing was deleted, or a store error.
    pub fn delete(&self, id: TaskId) -> Result<(), TaskWriteError> {
        if self.store.delete_task(id).map_err(Self::store_error)? {
            info!(task = %id, "Task deleted");
            Ok(())
        } else {
            warn!(task = %id, "Delete target missing");
            Err(TaskWriteError::MissingTask(id))
        }
    }

    /// Every task of `owner` in insertion order.
    ///
    /// # Errors
    /// Returns a store error when listing fails.
    pub fn list(&self, owner: &OwnerId) -> Result<Vec<Task>, TaskWriteError> {
        let tasks = self.store.list_tasks(owner).map_err(Self::store_error)?;
        debug!(owner = %owner, count = tasks.len(), "Loaded tasks");
        Ok(tasks)
    }

    /// Load one task.
    ///
    /// # Errors
    /// Returns a store error when the read fails.
    pub fn get(&self, id: TaskId) -> Result<Option<Task>, TaskWriteError> {
        self.store.get_task(id).map_err(Self::store_error)
    }

    /// Tasks matching `id`, at most [`LOOKUP_LIMIT`].
    ///
    /// # Errors
    /// Returns a store error when the read fails.
    pub fn lookup(&self, id: TaskId) -> Result<Vec<Task>, TaskWriteError> {
        self.store.lookup_tasks(id, LOOKUP_LIMIT).map_err(Self::store_error)
    }

    /// Apply a mutation produced by the modal controller on behalf of `owner`.
    ///
    /// # Errors
    /// Propagates the error of the underlying create/update/delete call.
    pub fn apply(&self, owner: &OwnerId, mutation: TaskMutation) -> Result<MutationApplied, TaskWriteError> {
        match mutation {
            TaskMutation::Create {
                title,
                description,
                tags,
                priority,
            } => self
                .create(CreateTaskInput {
                    owner: owner.clone(),
                    title,
                    description,
                    tags,
                    priority: Some(priority),
                })
                .map(MutationApplied::Created),
            TaskMutation::Update {
                id,
                title,
                description,
                tags,
                status,
                priority,
            } => self
                .update(UpdateTaskInput {
                    id,
                    owner: owner.clone(),
                    title: Some(title),
                    description: Some(description),
                    tags: Some(tags),
                    status: Some(status),
                    priority: Some(priority),
                })
                .map(MutationApplied::Updated),
            TaskMutation::Delete { id } => self.delete(id).map(|()| MutationApplied::Deleted(id)),
        }
    }
}

fn validate_title(title: &str) -> Result<String, TaskWriteError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(TaskWriteError::EmptyTitle)
    } else {
        Ok(trimmed.to_owned())
    }
}
