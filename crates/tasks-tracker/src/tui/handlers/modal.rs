use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasks_tracker_app::{ModalKind, TaskForm, TaskStore};
use tasks_tracker_core::{KNOWN_TAGS, Priority, Status};

use super::super::constants::DESCRIPTION_MAX_CHARS;
use super::super::view::{FormCursor, FormField, Ui};

impl FormField {
    /// Fields offered by the modal, in tab order. Status is only editable on existing tasks.
    pub(in crate::tui) const fn order(kind: ModalKind) -> &'static [Self] {
        match kind {
            ModalKind::Edit => &[
                Self::Title,
                Self::Description,
                Self::Tags,
                Self::Status,
                Self::Priority,
            ],
            _ => &[Self::Title, Self::Description, Self::Tags, Self::Priority],
        }
    }

    fn step(self, kind: ModalKind, forward: bool) -> Self {
        let order = Self::order(kind);
        let pos = order.iter().position(|field| *field == self).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            (pos + order.len() - 1) % order.len()
        };
        order[next]
    }
}

/// Next value of an optional choice: unset, then every variant, then unset again.
fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>, forward: bool) -> Option<T> {
    let pos = current.and_then(|value| all.iter().position(|candidate| *candidate == value));
    let slots = all.len() + 1;
    let slot = pos.map_or(0, |idx| idx + 1);
    let next = if forward {
        (slot + 1) % slots
    } else {
        (slot + slots - 1) % slots
    };
    next.checked_sub(1).and_then(|idx| all.get(idx).copied())
}

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(in crate::tui) fn reset_form_cursor(&mut self) {
        self.form_cursor = FormCursor::default();
    }

    pub(in crate::tui) fn handle_modal_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.modals.is_submitting() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.info("A submission is already in progress");
            }
            return Ok(());
        }

        match self.modals.kind() {
            Some(kind @ (ModalKind::Create | ModalKind::Edit)) => self.handle_form_key(kind, key),
            Some(ModalKind::View) => {
                self.handle_view_key(key);
                Ok(())
            }
            Some(ModalKind::DeleteConfirm) => self.handle_delete_key(key),
            None => Ok(()),
        }
    }

    fn handle_form_key(&mut self, kind: ModalKind, key: KeyEvent) -> Result<()> {
        let submit_chord = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s');
        match key.code {
            KeyCode::Esc => self.dismiss_modal(),
            KeyCode::Enter => return self.submit_modal(),
            _ if submit_chord => return self.submit_modal(),
            KeyCode::Tab | KeyCode::Down => {
                self.form_cursor.field = self.form_cursor.field.step(kind, true);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form_cursor.field = self.form_cursor.field.step(kind, false);
            }
            _ => {
                let cursor = self.form_cursor;
                if let Some(form) = self.modals.form_mut() {
                    self.form_cursor = edit_form(form, cursor, key.code);
                }
            }
        }
        Ok(())
    }

    fn handle_view_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.dismiss_modal(),
            KeyCode::Char('d') => {
                if let Err(err) = self.modals.view_to_delete() {
                    self.error(err.to_string());
                }
            }
            KeyCode::Char('e') => {
                let target = self
                    .modals
                    .active()
                    .and_then(|modal| Some((modal.index()?, modal.task_id()?)));
                let Some((row, id)) = target else {
                    return;
                };
                let Some(task) = self.app.task(id).cloned() else {
                    self.error("Task no longer exists");
                    return;
                };
                match self.modals.open_edit(row, &task) {
                    Ok(()) => self.reset_form_cursor(),
                    Err(err) => self.error(err.to_string()),
                }
            }
            _ => {}
        }
    }

    fn handle_delete_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => return self.submit_modal(),
            KeyCode::Char('n' | 'N') => {
                self.modals.decline_delete();
            }
            KeyCode::Esc => self.dismiss_modal(),
            _ => {}
        }
        Ok(())
    }

    fn dismiss_modal(&mut self) {
        if self.modals.dismiss() {
            self.reset_form_cursor();
        } else {
            self.info("A submission is already in progress");
        }
    }
}

/// Apply a key to the focused form field and return the updated cursor.
fn edit_form(form: &mut TaskForm, mut cursor: FormCursor, code: KeyCode) -> FormCursor {
    match (cursor.field, code) {
        (FormField::Title, KeyCode::Char(ch)) => {
            form.title.push(ch);
            form.clear_error();
        }
        (FormField::Title, KeyCode::Backspace) => {
            form.title.pop();
        }
        (FormField::Description, KeyCode::Char(ch)) => {
            if form.description.chars().count() < DESCRIPTION_MAX_CHARS {
                form.description.push(ch);
            }
        }
        (FormField::Description, KeyCode::Backspace) => {
            form.description.pop();
        }
        (FormField::Tags, KeyCode::Left) => cursor.tag = cursor.tag.saturating_sub(1),
        (FormField::Tags, KeyCode::Right) => cursor.tag = (cursor.tag + 1).min(KNOWN_TAGS.len() - 1),
        (FormField::Tags, KeyCode::Char(' ')) => {
            if let Some(tag) = KNOWN_TAGS.get(cursor.tag) {
                form.toggle_tag(tag.name);
            }
        }
        (FormField::Status, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
            form.status = cycle(&Status::ALL, form.status, code != KeyCode::Left);
        }
        (FormField::Priority, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
            form.priority = cycle(&Priority::ALL, form.priority, code != KeyCode::Left);
        }
        _ => {}
    }
    cursor
}
