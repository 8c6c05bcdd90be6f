//! Write payloads accepted by task stores.

use serde::{Deserialize, Serialize};

use crate::id::{OwnerId, TaskId};
use crate::model::{Priority, Status, normalize_tags};

/// Fields supplied when inserting a task.
///
/// `status` is optional: `None` leaves the column to the store default
/// ([`Status::Backlog`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Owner recorded on the row.
    pub owner_id: OwnerId,
    /// Title; validated by the caller.
    pub title: String,
    /// Description.
    pub description: String,
    /// Labels.
    pub tags: Vec<String>,
    /// Priority.
    pub priority: Priority,
    /// Explicit status, or the store default when absent.
    pub status: Option<Status>,
}

impl NewTask {
    /// Payload with empty description, no tags and default priority.
    pub fn new(owner_id: OwnerId, title: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            priority: Priority::default(),
            status: None,
        }
    }

    /// Replace the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the tags (normalized).
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Replace the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Full overwrite of one row keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    /// Row to overwrite.
    pub id: TaskId,
    /// Owner written back to the row.
    pub owner_id: OwnerId,
    /// New title.
    pub title: String,
    /// New description.
    pub description: String,
    /// New labels.
    pub tags: Vec<String>,
    /// New status.
    pub status: Status,
    /// New priority.
    pub priority: Priority,
}
