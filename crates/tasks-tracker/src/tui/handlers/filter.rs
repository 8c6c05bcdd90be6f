use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use tasks_tracker_app::TaskStore;
use tasks_tracker_core::{Priority, Status};

use super::super::constants::FILTER_SUMMARY_LIMIT;
use super::super::view::{FilterMenuKind, Focus, Menu, Ui};

/// Label of the menu entry that empties the filter set.
pub(in crate::tui) const CLEAR_FILTER_LABEL: &str = "Clear filter";

impl FilterMenuKind {
    pub(in crate::tui) const fn title(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::Priority => "Priority",
        }
    }

    /// Number of entries including "Clear filter".
    pub(in crate::tui) const fn entry_count(self) -> usize {
        match self {
            Self::Status => Status::ALL.len() + 1,
            Self::Priority => Priority::ALL.len() + 1,
        }
    }

    pub(in crate::tui) const fn label(self, index: usize) -> &'static str {
        match self {
            Self::Status if index < Status::ALL.len() => Status::ALL[index].label(),
            Self::Priority if index < Priority::ALL.len() => Priority::ALL[index].label(),
            Self::Status | Self::Priority => CLEAR_FILTER_LABEL,
        }
    }
}

/// Toolbar button text: the labels, or "N selected" once more than two are chosen.
pub(in crate::tui) fn summarize_selection(labels: &[&str]) -> Option<String> {
    match labels.len() {
        0 => None,
        n if n > FILTER_SUMMARY_LIMIT => Some(format!("{n} selected")),
        _ => Some(labels.join(", ")),
    }
}

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(in crate::tui) fn open_filter_menu(&mut self, kind: FilterMenuKind) {
        self.menu = Some(Menu::Filter { kind, selected: 0 });
    }

    /// Whether entry `index` of the menu is currently checked.
    pub(in crate::tui) fn filter_item_checked(&self, kind: FilterMenuKind, index: usize) -> bool {
        let filter = self.app.visibility().filter();
        match kind {
            FilterMenuKind::Status => Status::ALL
                .get(index)
                .is_some_and(|status| filter.statuses().contains(status)),
            FilterMenuKind::Priority => Priority::ALL
                .get(index)
                .is_some_and(|priority| filter.priorities().contains(priority)),
        }
    }

    /// Button text for a filter menu.
    pub(in crate::tui) fn filter_summary(&self, kind: FilterMenuKind) -> Option<String> {
        let filter = self.app.visibility().filter();
        let labels: Vec<&str> = match kind {
            FilterMenuKind::Status => filter.statuses().iter().map(|status| status.label()).collect(),
            FilterMenuKind::Priority => filter
                .priorities()
                .iter()
                .map(|priority| priority.label())
                .collect(),
        };
        summarize_selection(&labels)
    }

    pub(in crate::tui) fn handle_filter_menu_key(&mut self, key: KeyEvent, kind: FilterMenuKind, selected: usize) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.menu = None,
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu = Some(Menu::Filter {
                    kind,
                    selected: (selected + 1).min(kind.entry_count() - 1),
                });
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu = Some(Menu::Filter {
                    kind,
                    selected: selected.saturating_sub(1),
                });
            }
            // The menu stays open so several entries can be toggled in a row.
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_filter_item(kind, selected),
            _ => {}
        }
    }

    pub(in crate::tui) fn toggle_filter_item(&mut self, kind: FilterMenuKind, index: usize) {
        let visibility = self.app.visibility_mut();
        match kind {
            FilterMenuKind::Status if index < Status::ALL.len() => {
                visibility.toggle_status(Status::ALL[index]);
            }
            FilterMenuKind::Priority if index < Priority::ALL.len() => {
                visibility.toggle_priority(Priority::ALL[index]);
            }
            FilterMenuKind::Status => visibility.clear_statuses(),
            FilterMenuKind::Priority => visibility.clear_priorities(),
        }
        self.app.refilter();
    }

    pub(in crate::tui) fn handle_title_input_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        let changed = match key.code {
            KeyCode::Esc | KeyCode::Tab => {
                self.focus = Focus::Table;
                false
            }
            KeyCode::Enter => {
                self.focus = Focus::Table;
                self.app.visibility_mut().flush_title()
            }
            KeyCode::Backspace => self.app.visibility_mut().pop_title_char(now),
            KeyCode::Char(ch) => self.app.visibility_mut().push_title_char(ch, now),
            _ => false,
        };
        if changed {
            self.app.refilter();
        }
    }
}
