use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tasks_tracker_app::{Route, TaskStore};

use super::super::view::{FilterMenuKind, Focus, Menu, Ui};

/// Entries of the row action menu.
pub(in crate::tui) const ROW_ACTIONS: [&str; 3] = ["View", "Edit", "Delete"];

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        if matches!(self.route, Route::SignIn { .. }) {
            return self.handle_sign_in_key(key);
        }
        if !self.modals.is_closed() {
            return self.handle_modal_key(key);
        }
        match self.menu {
            Some(Menu::RowActions { selected }) => {
                self.handle_row_menu_key(key, selected);
                Ok(())
            }
            Some(Menu::Filter { kind, selected }) => {
                self.handle_filter_menu_key(key, kind, selected);
                Ok(())
            }
            None if self.focus == Focus::TitleInput => {
                self.handle_title_input_key(key);
                Ok(())
            }
            None => self.handle_table_key(key),
        }
    }

    fn handle_sign_in_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.sign_in()?,
            KeyCode::Backspace => {
                self.sign_in_input.pop();
            }
            KeyCode::Char(ch) => self.sign_in_input.push(ch),
            _ => {}
        }
        Ok(())
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.app.visibility_mut().select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.app.visibility_mut().select_prev(),
            KeyCode::Home | KeyCode::Char('g') => self.app.visibility_mut().select_first(),
            KeyCode::End | KeyCode::Char('G') => self.app.visibility_mut().select_last(),
            KeyCode::Char('/') => self.focus = Focus::TitleInput,
            KeyCode::Char('s') => self.open_filter_menu(FilterMenuKind::Status),
            KeyCode::Char('p') => self.open_filter_menu(FilterMenuKind::Priority),
            KeyCode::Char('n' | 'a') => self.open_create_modal(),
            KeyCode::Enter => {
                if self.app.selected_task().is_some() {
                    self.menu = Some(Menu::RowActions { selected: 0 });
                } else {
                    self.error("No task selected");
                }
            }
            KeyCode::Char('v') => self.run_row_action(0),
            KeyCode::Char('e') => self.run_row_action(1),
            KeyCode::Char('d') => self.run_row_action(2),
            KeyCode::Char('r') => {
                self.app.refresh_tasks()?;
                self.info("Tasks reloaded");
            }
            KeyCode::Char('L') => self.sign_out()?,
            _ => {}
        }
        Ok(())
    }

    fn handle_row_menu_key(&mut self, key: KeyEvent, selected: usize) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.menu = None,
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu = Some(Menu::RowActions {
                    selected: (selected + 1).min(ROW_ACTIONS.len() - 1),
                });
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu = Some(Menu::RowActions {
                    selected: selected.saturating_sub(1),
                });
            }
            KeyCode::Enter => {
                self.menu = None;
                self.run_row_action(selected);
            }
            _ => {}
        }
    }

    /// Open the modal behind row action `action` for the selected task.
    pub(in crate::tui) fn run_row_action(&mut self, action: usize) {
        let row = self.app.visibility().selected_index();
        let Some(task) = self.app.selected_task().cloned() else {
            self.error("No task selected");
            return;
        };
        let opened = match action {
            0 => self.modals.open_view(row, &task),
            1 => self.modals.open_edit(row, &task),
            _ => self.modals.open_delete(row, &task),
        };
        match opened {
            Ok(()) => self.reset_form_cursor(),
            Err(err) => self.error(err.to_string()),
        }
    }

    pub(in crate::tui) fn open_create_modal(&mut self) {
        match self.modals.open_create() {
            Ok(()) => self.reset_form_cursor(),
            Err(err) => self.error(err.to_string()),
        }
    }
}
