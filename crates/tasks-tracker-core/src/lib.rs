//! Domain types and client-side filtering for tasks-tracker.

/// Quiet-period timer for coalescing input.
pub mod debounce;
/// Filter engine narrowing the task list.
pub mod filter;
/// Identifier types.
pub mod id;
/// Status, priority and tag vocabularies with rendering metadata.
pub mod model;
/// Store write payloads.
pub mod record;
/// Title matcher.
pub mod text_matcher;

pub use crate::debounce::{DEFAULT_QUIET_PERIOD, Debouncer};
pub use crate::filter::{EmptyReason, FilterState, FilteredTasks};
pub use crate::id::{OwnerId, TaskId};
pub use crate::model::{DisplayMeta, KNOWN_TAGS, Priority, Status, TagInfo, UnknownVariant, normalize_tags, tag_info};
pub use crate::record::{NewTask, TaskChanges};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A task row as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned at creation.
    pub id: TaskId,
    /// Short title (never blank once stored).
    pub title: String,
    /// Free-form description, may contain markup.
    pub description: String,
    /// Labels; order is not significant.
    pub tags: Vec<String>,
    /// Workflow status.
    pub status: Status,
    /// Priority.
    pub priority: Priority,
    /// Owner of the task.
    pub owner_id: OwnerId,
    /// Creation time (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification time (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Task {
    /// Build an unsaved task with store defaults (Backlog, Low, no tags).
    pub fn new(owner_id: OwnerId, title: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            status: Status::default(),
            priority: Priority::default(),
            owner_id,
            created_at: now,
            updated_at: now,
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

    /// Replace the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Replace the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Check whether the task carries a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }
}
