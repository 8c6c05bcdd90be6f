use std::collections::HashMap;
use std::time::{Duration, Instant};

use tasks_tracker_core::{Debouncer, EmptyReason, FilterState, Priority, Status, Task, TaskId};

/// Filter toolbar state plus the derived row list and selection, independent of IO.
#[derive(Debug)]
pub(super) struct TaskVisibility {
    filter: FilterState,
    /// Text shown in the title input; reaches `filter` through the debouncer.
    title_input: String,
    title_debounce: Debouncer<String>,
    visible: Vec<usize>,
    visible_index: HashMap<TaskId, usize>,
    empty_reason: Option<EmptyReason>,
    selected: usize,
}

impl Default for TaskVisibility {
    fn default() -> Self {
        Self::new(tasks_tracker_core::DEFAULT_QUIET_PERIOD)
    }
}

#[allow(clippy::missing_const_for_fn)]
impl TaskVisibility {
    pub(super) fn new(quiet: Duration) -> Self {
        Self {
            filter: FilterState::default(),
            title_input: String::new(),
            title_debounce: Debouncer::new(quiet),
            visible: Vec::new(),
            visible_index: HashMap::new(),
            empty_reason: Some(EmptyReason::NoTasks),
            selected: 0,
        }
    }

    pub(super) fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub(super) fn title_input(&self) -> &str {
        &self.title_input
    }

    pub(super) fn title_pending(&self) -> bool {
        self.title_debounce.is_pending()
    }

    /// Record an edit of the title input.
    ///
    /// Returns true when the filter changed right away (the input was cleared);
    /// otherwise the query is applied by [`Self::poll_title`] once typing pauses.
    pub(super) fn set_title_input(&mut self, text: String, now: Instant) -> bool {
        self.title_input.clone_from(&text);
        if text.is_empty() {
            self.title_debounce.cancel();
            return self.apply_title(text);
        }
        self.title_debounce.schedule(text, now);
        false
    }

    pub(super) fn push_title_char(&mut self, ch: char, now: Instant) -> bool {
        let mut text = self.title_input.clone();
        text.push(ch);
        self.set_title_input(text, now)
    }

    pub(super) fn pop_title_char(&mut self, now: Instant) -> bool {
        let mut text = self.title_input.clone();
        if text.pop().is_none() {
            return false;
        }
        self.set_title_input(text, now)
    }

    /// Apply the debounced title query when its quiet period has elapsed.
    pub(super) fn poll_title(&mut self, now: Instant) -> bool {
        self.title_debounce
            .poll(now)
            .is_some_and(|query| self.apply_title(query))
    }

    /// Apply a pending title query immediately.
    pub(super) fn flush_title(&mut self) -> bool {
        self.title_debounce
            .flush()
            .is_some_and(|query| self.apply_title(query))
    }

    fn apply_title(&mut self, query: String) -> bool {
        if self.filter.title_query() == query {
            return false;
        }
        self.filter.set_title_query(query);
        true
    }

    pub(super) fn toggle_status(&mut self, status: Status) -> bool {
        self.filter.toggle_status(status)
    }

    pub(super) fn toggle_priority(&mut self, priority: Priority) -> bool {
        self.filter.toggle_priority(priority)
    }

    pub(super) fn clear_statuses(&mut self) {
        self.filter.clear_statuses();
    }

    pub(super) fn clear_priorities(&mut self) {
        self.filter.clear_priorities();
    }

    pub(super) fn rebuild(&mut self, tasks: &[Task], preferred: Option<TaskId>) {
        self.visible.clear();
        self.visible_index.clear();

        let view = self.filter.apply(tasks);
        self.empty_reason = view.empty_reason();
        for idx in view.into_indices() {
            let pos = self.visible.len();
            self.visible.push(idx);
            self.visible_index.insert(tasks[idx].id, pos);
        }

        self.selected = self.resolve_selection(preferred);
    }

    fn resolve_selection(&self, preferred: Option<TaskId>) -> usize {
        if self.visible.is_empty() {
            return 0;
        }
        if let Some(id) = preferred
            && let Some(&index) = self.visible_index.get(&id)
        {
            return index;
        }
        self.selected.min(self.visible.len() - 1)
    }

    /// Why the table was empty after the last rebuild, if it was.
    pub(super) const fn empty_reason(&self) -> Option<EmptyReason> {
        self.empty_reason
    }

    #[cfg(test)]
    pub(super) fn visible_indexes(&self) -> &[usize] {
        &self.visible
    }

    pub(super) fn visible_tasks<'a>(&'a self, tasks: &'a [Task]) -> impl Iterator<Item = &'a Task> + 'a {
        self.visible.iter().filter_map(move |&idx| tasks.get(idx))
    }

    /// Table row of a visible task.
    #[cfg(test)]
    pub(super) fn row_of(&self, task_id: TaskId) -> Option<usize> {
        self.visible_index.get(&task_id).copied()
    }

    pub(super) fn selected_index(&self) -> usize {
        self.selected
    }

    pub(super) fn selected_task<'a>(&self, tasks: &'a [Task]) -> Option<&'a Task> {
        self.visible.get(self.selected).and_then(|&idx| tasks.get(idx))
    }

    pub(super) fn selected_task_id(&self, tasks: &[Task]) -> Option<TaskId> {
        self.selected_task(tasks).map(|task| task.id)
    }

    pub(super) fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub(super) fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(super) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(super) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }
}
