use crate::Task;

/// Case-insensitive substring matcher for task titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Lowercase a query into a matcher. Returns `None` for an empty query.
    ///
    /// Whitespace is part of the needle: `"fix "` does not match `"Fixture"`.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// Lowercased needle the matcher searches for.
    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Determine whether the task title contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
    }

    /// Match an arbitrary field value.
    #[must_use]
    pub fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}
