//! Client-side narrowing of the owner's task list.
//!
//! The three predicates (title, status set, priority set) compose with AND;
//! membership inside a set is OR, and an empty set disables that predicate.

use std::collections::BTreeSet;

use crate::Task;
use crate::model::{Priority, Status};
use crate::text_matcher::TextMatcher;

/// Ephemeral filter selection owned by the task page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    title_query: String,
    statuses: BTreeSet<Status>,
    priorities: BTreeSet<Priority>,
}

impl FilterState {
    /// Empty filter; applying it yields the source list unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style title query.
    #[must_use]
    pub fn with_title_query(mut self, query: impl Into<String>) -> Self {
        self.title_query = query.into();
        self
    }

    /// Builder-style status selection.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = Status>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    /// Builder-style priority selection.
    #[must_use]
    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = Priority>) -> Self {
        self.priorities.extend(priorities);
        self
    }

    /// Raw title query as last applied.
    #[must_use]
    pub fn title_query(&self) -> &str {
        &self.title_query
    }

    /// Replace the title query.
    pub fn set_title_query(&mut self, query: impl Into<String>) {
        self.title_query = query.into();
    }

    /// Selected statuses.
    #[must_use]
    pub const fn statuses(&self) -> &BTreeSet<Status> {
        &self.statuses
    }

    /// Selected priorities.
    #[must_use]
    pub const fn priorities(&self) -> &BTreeSet<Priority> {
        &self.priorities
    }

    /// Add the status when absent, remove it when present.
    ///
    /// Returns whether the status is selected afterwards.
    pub fn toggle_status(&mut self, status: Status) -> bool {
        toggle(&mut self.statuses, status)
    }

    /// Add the priority when absent, remove it when present.
    ///
    /// Returns whether the priority is selected afterwards.
    pub fn toggle_priority(&mut self, priority: Priority) -> bool {
        toggle(&mut self.priorities, priority)
    }

    /// Drop every selected status.
    pub fn clear_statuses(&mut self) {
        self.statuses.clear();
    }

    /// Drop every selected priority.
    pub fn clear_priorities(&mut self) {
        self.priorities.clear();
    }

    /// True when no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title_query.is_empty() && self.statuses.is_empty() && self.priorities.is_empty()
    }

    /// Evaluate every predicate against a single task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        CompiledFilter::new(self).matches(task)
    }

    /// Narrow `tasks` to the matching rows, preserving source order.
    #[must_use]
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> FilteredTasks<'a> {
        let compiled = CompiledFilter::new(self);
        let indices = if compiled.is_identity() {
            (0..tasks.len()).collect()
        } else {
            tasks
                .iter()
                .enumerate()
                .filter(|(_, task)| compiled.matches(task))
                .map(|(idx, _)| idx)
                .collect()
        };
        FilteredTasks {
            source: tasks,
            indices,
        }
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Filter with the title matcher built once per evaluation pass.
struct CompiledFilter<'f> {
    title: Option<TextMatcher>,
    statuses: &'f BTreeSet<Status>,
    priorities: &'f BTreeSet<Priority>,
}

impl<'f> CompiledFilter<'f> {
    fn new(state: &'f FilterState) -> Self {
        Self {
            title: TextMatcher::new(&state.title_query),
            statuses: &state.statuses,
            priorities: &state.priorities,
        }
    }

    fn is_identity(&self) -> bool {
        self.title.is_none() && self.statuses.is_empty() && self.priorities.is_empty()
    }

    fn matches(&self, task: &Task) -> bool {
        if let Some(matcher) = &self.title
            && !matcher.matches(task)
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        self.priorities.is_empty() || self.priorities.contains(&task.priority)
    }
}

/// Why a filtered view has no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The owner has no tasks at all.
    NoTasks,
    /// Tasks exist but none satisfies the active filters.
    NoMatches,
}

/// Ordered view over the tasks that passed a [`FilterState`].
#[derive(Debug, Clone)]
pub struct FilteredTasks<'a> {
    source: &'a [Task],
    indices: Vec<usize>,
}

impl<'a> FilteredTasks<'a> {
    /// Number of visible tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when no task is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of tasks before filtering.
    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Distinguish "nothing to show yet" from "nothing matches".
    #[must_use]
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.indices.is_empty() {
            None
        } else if self.source.is_empty() {
            Some(EmptyReason::NoTasks)
        } else {
            Some(EmptyReason::NoMatches)
        }
    }

    /// Positions of the visible tasks inside the source slice.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the view, keeping only the source positions.
    #[must_use]
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Iterate visible tasks in source order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        let source = self.source;
        self.indices.iter().filter_map(move |&idx| source.get(idx))
    }

    /// Clone the visible tasks out of the view.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::OwnerId;

    fn task(title: &str, status: Status, priority: Priority) -> Task {
        Task::new(OwnerId::new("u1"), title)
            .with_status(status)
            .with_priority(priority)
    }

    fn sample() -> Vec<Task> {
        vec![
            task("Fix bug", Status::Todo, Priority::Low),
            task("Write docs", Status::Done, Priority::Medium),
        ]
    }

    fn titles(view: &FilteredTasks<'_>) -> Vec<String> {
        view.iter().map(|task| task.title.clone()).collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let tasks = sample();
        let view = FilterState::new().apply(&tasks);
        assert_eq!(view.to_vec(), tasks);
        assert_eq!(view.indices(), &[0, 1]);
        assert_eq!(view.empty_reason(), None);
    }

    #[test]
    fn status_filter_keeps_members_only() {
        let tasks = sample();
        let filter = FilterState::new().with_statuses([Status::Todo]);
        assert_eq!(titles(&filter.apply(&tasks)), vec!["Fix bug"]);
    }

    #[test]
    fn title_filter_is_case_insensitive() {
        let tasks = sample();
        let filter = FilterState::new().with_title_query("WRITE");
        assert_eq!(titles(&filter.apply(&tasks)), vec!["Write docs"]);
    }

    #[test]
    fn title_filter_is_idempotent() {
        let tasks = vec![
            task("Write docs", Status::Todo, Priority::Low),
            task("Rewrite parser", Status::Todo, Priority::High),
            task("Fix bug", Status::Done, Priority::Low),
        ];
        let filter = FilterState::new().with_title_query("write");
        let once = filter.apply(&tasks).to_vec();
        let twice = filter.apply(&once).to_vec();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn predicates_compose_with_and() {
        let tasks = vec![
            task("Write docs", Status::Todo, Priority::Low),
            task("Write tests", Status::Todo, Priority::High),
            task("Write release notes", Status::Done, Priority::High),
            task("Fix bug", Status::Todo, Priority::High),
        ];
        let filter = FilterState::new()
            .with_title_query("write")
            .with_statuses([Status::Todo])
            .with_priorities([Priority::High]);
        assert_eq!(titles(&filter.apply(&tasks)), vec!["Write tests"]);
    }

    #[test]
    fn membership_within_a_dimension_is_or() {
        let tasks = vec![
            task("a", Status::Backlog, Priority::Low),
            task("b", Status::Todo, Priority::Low),
            task("c", Status::Done, Priority::Low),
        ];
        let filter = FilterState::new().with_statuses([Status::Backlog, Status::Done]);
        assert_eq!(filter.apply(&tasks).indices(), &[0, 2]);
    }

    #[test]
    fn result_is_ordered_subset_without_duplicates() {
        let tasks = vec![
            task("Write docs", Status::Todo, Priority::Low),
            task("Fix bug", Status::Done, Priority::Medium),
            task("Write more docs", Status::Todo, Priority::Low),
        ];
        let filter = FilterState::new().with_priorities([Priority::Low]);
        let view = filter.apply(&tasks);
        let indices = view.indices();
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        for task in view.iter() {
            assert!(tasks.contains(task));
            assert!(filter.matches(task));
        }
        let excluded = tasks.iter().filter(|task| !filter.matches(task)).count();
        assert_eq!(view.len() + excluded, tasks.len());
    }

    #[test]
    fn toggling_twice_restores_membership() {
        let mut filter = FilterState::new().with_statuses([Status::Done]);
        let before = filter.statuses().clone();
        assert!(filter.toggle_status(Status::Todo));
        assert!(!filter.toggle_status(Status::Todo));
        assert_eq!(filter.statuses(), &before);

        assert!(!filter.toggle_status(Status::Done));
        assert!(filter.toggle_status(Status::Done));
        assert_eq!(filter.statuses(), &before);
    }

    #[test]
    fn dimensions_are_independent() {
        let mut filter = FilterState::new().with_title_query("docs");
        filter.toggle_priority(Priority::High);
        filter.toggle_status(Status::Todo);
        filter.clear_statuses();
        assert_eq!(filter.title_query(), "docs");
        assert!(filter.priorities().contains(&Priority::High));
        assert!(filter.statuses().is_empty());
        filter.clear_priorities();
        assert!(filter.priorities().is_empty());
        assert!(!filter.is_empty());
    }

    #[test]
    fn empty_reason_distinguishes_no_tasks_from_no_matches() {
        let none: Vec<Task> = Vec::new();
        let filter = FilterState::new().with_statuses([Status::Done]);
        assert_eq!(filter.apply(&none).empty_reason(), Some(EmptyReason::NoTasks));
        assert_eq!(FilterState::new().apply(&none).empty_reason(), Some(EmptyReason::NoTasks));

        let tasks = vec![task("Fix bug", Status::Todo, Priority::Low)];
        let view = filter.apply(&tasks);
        assert!(view.is_empty());
        assert_eq!(view.source_len(), 1);
        assert_eq!(view.empty_reason(), Some(EmptyReason::NoMatches));
    }

    #[test]
    fn only_an_empty_title_query_is_inactive() {
        let tasks = sample();
        assert!(FilterState::new().with_title_query("").is_empty());

        let spaces = FilterState::new().with_title_query("   ");
        assert!(!spaces.is_empty());
        assert_eq!(spaces.apply(&tasks).empty_reason(), Some(EmptyReason::NoMatches));
    }

    #[test]
    fn trailing_space_stays_in_the_title_query() {
        let tasks = vec![
            task("Fixture cleanup", Status::Todo, Priority::Low),
            task("Fix bug", Status::Todo, Priority::Low),
        ];
        let filter = FilterState::new().with_title_query("fix ");
        assert_eq!(titles(&filter.apply(&tasks)), vec!["Fix bug"]);
    }
}
