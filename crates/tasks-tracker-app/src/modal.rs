//! Create / view / edit / delete-confirm flows for the task page.
//!
//! A [`ModalController`] owns at most one active modal, so the four flows are
//! mutually exclusive. Each active modal is either `Open` (accepting input) or
//! `Submitting` (a mutation is in flight and the modal cannot be dismissed).

use tasks_tracker_core::{Priority, Status, Task, TaskId, normalize_tags};
use thiserror::Error;
use tracing::debug;

/// Editable fields shared by the create and edit modals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Selected tags.
    pub tags: Vec<String>,
    /// Selected status; `None` shows the placeholder.
    pub status: Option<Status>,
    /// Selected priority; `None` shows the placeholder.
    pub priority: Option<Priority>,
    error: Option<FormError>,
}

impl TaskForm {
    /// Empty form used by the create modal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-populated from an existing task.
    ///
    /// Status and priority are left unset so the placeholder is shown.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            tags: task.tags.clone(),
            ..Self::default()
        }
    }

    /// Add the tag when missing, remove it otherwise. Returns whether it is selected afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.tags.iter().position(|existing| existing == tag) {
            self.tags.remove(pos);
            false
        } else {
            self.tags.push(tag.to_owned());
            true
        }
    }

    /// Inline validation error from the last submit attempt.
    #[must_use]
    pub const fn error(&self) -> Option<FormError> {
        self.error
    }

    /// Drop the inline validation error.
    pub const fn clear_error(&mut self) {
        self.error = None;
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            Err(FormError::BlankTitle)
        } else {
            Ok(())
        }
    }

    fn trimmed_title(&self) -> String {
        self.title.trim().to_owned()
    }
}

/// Field-level validation failures shown inline on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    /// The title is empty or whitespace.
    #[error("Title is required")]
    BlankTitle,
}

/// Where a delete confirmation was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOrigin {
    /// Row action menu of the table.
    FromTable,
    /// Delete button of the view modal.
    FromView,
}

/// The modal currently shown, with its captured state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveModal {
    /// New task form.
    Create {
        /// Form being filled in.
        form: TaskForm,
    },
    /// Read-only details of one task.
    View {
        /// Row index in the table.
        index: usize,
        /// Task shown.
        id: TaskId,
    },
    /// Edit form for one task.
    Edit {
        /// Row index in the table.
        index: usize,
        /// Task being edited.
        id: TaskId,
        /// Status stored on the task when the modal opened.
        current_status: Status,
        /// Priority stored on the task when the modal opened.
        current_priority: Priority,
        /// Form being filled in.
        form: TaskForm,
    },
    /// Delete confirmation.
    DeleteConfirm {
        /// Row index in the table.
        index: usize,
        /// Task to delete.
        id: TaskId,
        /// Where the confirmation was opened from.
        origin: DeleteOrigin,
    },
}

impl ActiveModal {
    /// Discriminant of the active modal.
    #[must_use]
    pub const fn kind(&self) -> ModalKind {
        match self {
            Self::Create { .. } => ModalKind::Create,
            Self::View { .. } => ModalKind::View,
            Self::Edit { .. } => ModalKind::Edit,
            Self::DeleteConfirm { .. } => ModalKind::DeleteConfirm,
        }
    }

    /// Task the modal is bound to, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::Create { .. } => None,
            Self::View { id, .. } | Self::Edit { id, .. } | Self::DeleteConfirm { id, .. } => Some(*id),
        }
    }

    /// Table row the modal was opened for, if any.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Create { .. } => None,
            Self::View { index, .. } | Self::Edit { index, .. } | Self::DeleteConfirm { index, .. } => {
                Some(*index)
            }
        }
    }
}

/// Which modal is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// New task form.
    Create,
    /// Read-only details.
    View,
    /// Edit form.
    Edit,
    /// Delete confirmation.
    DeleteConfirm,
}

/// Lifecycle phase of the active modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting input.
    Open,
    /// A mutation is in flight.
    Submitting,
}

/// Mutation issued when a modal is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMutation {
    /// Insert a task for the session owner.
    Create {
        /// Title (trimmed, non-blank).
        title: String,
        /// Description.
        description: String,
        /// Tags.
        tags: Vec<String>,
        /// Priority; Low when the form left it unset.
        priority: Priority,
    },
    /// Overwrite an existing task.
    Update {
        /// Target task.
        id: TaskId,
        /// Title (trimmed, non-blank).
        title: String,
        /// Description.
        description: String,
        /// Tags.
        tags: Vec<String>,
        /// Status; the stored value when the form left it unset.
        status: Status,
        /// Priority; the stored value when the form left it unset.
        priority: Priority,
    },
    /// Remove a task.
    Delete {
        /// Target task.
        id: TaskId,
    },
}

/// Reasons a submit or transition request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    /// A mutation for the active modal is already in flight.
    #[error("a submission is already in progress")]
    InFlight,
    /// No modal accepts a submission right now.
    #[error("nothing to submit")]
    NothingToSubmit,
    /// The form failed validation; the error is also stored on the form.
    #[error(transparent)]
    Invalid(#[from] FormError),
}

/// How an in-flight mutation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store applied the mutation.
    Succeeded,
    /// The target row no longer exists.
    NotFound,
    /// The store call failed or timed out.
    Failed(String),
}

/// Controller state after a mutation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResolution {
    /// Modal closed; the task list must be re-fetched.
    Closed,
    /// Modal is open again with a notice so the user can retry.
    Reopened,
    /// No submission was in flight.
    Ignored,
}

/// Owner of the page's modal state.
#[derive(Debug, Clone, Default)]
pub struct ModalController {
    active: Option<ActiveModal>,
    phase: Option<Phase>,
    notice: Option<String>,
}

impl ModalController {
    /// Controller with no modal open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active modal, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveModal> {
        self.active.as_ref()
    }

    /// Kind of the active modal, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ModalKind> {
        self.active.as_ref().map(ActiveModal::kind)
    }

    /// Phase of the active modal; `None` when closed.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// True when no modal is shown.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.active.is_none()
    }

    /// True while a mutation is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, Some(Phase::Submitting))
    }

    /// Whether the close affordance should be offered.
    #[must_use]
    pub const fn can_dismiss(&self) -> bool {
        matches!(self.phase, Some(Phase::Open))
    }

    /// Failure notice from the last submission, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Drop the failure notice.
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Mutable access to the active form while input is accepted.
    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        if !matches!(self.phase, Some(Phase::Open)) {
            return None;
        }
        match &mut self.active {
            Some(ActiveModal::Create { form } | ActiveModal::Edit { form, .. }) => Some(form),
            _ => None,
        }
    }

    /// Read access to the active form.
    #[must_use]
    pub const fn form(&self) -> Option<&TaskForm> {
        match &self.active {
            Some(ActiveModal::Create { form } | ActiveModal::Edit { form, .. }) => Some(form),
            _ => None,
        }
    }

    /// Open the create modal with an empty form.
    ///
    /// # Errors
    /// Returns [`SubmitRejected::InFlight`] while another modal is submitting.
    pub fn open_create(&mut self) -> Result<(), SubmitRejected> {
        self.open(ActiveModal::Create { form: TaskForm::new() })
    }

    /// Open the read-only view of the task at `index`.
    ///
    /// # Errors
    /// Returns [`SubmitRejected::InFlight`] while another modal is submitting.
    pub fn open_view(&mut self, index: usize, task: &Task) -> Result<(), SubmitRejected> {
        self.open(ActiveModal::View { index, id: task.id })
    }

    /// Open the edit form pre-populated from `task`.
    ///
    /// # Errors
    /// Returns [`SubmitRejected::InFlight`] while another modal is submitting.
    pub fn open_edit(&mut self, index: usize, task: &Task) -> Result<(), SubmitRejected> {
        self.open(ActiveModal::Edit {
            index,
            id: task.id,
            current_status: task.status,
            current_priority: task.priority,
            form: TaskForm::from_task(task),
        })
    }

    /// Open the delete confirmation from the table.
    ///
    /// # Errors
    /// Returns [`SubmitRejected::InFlight`] while another modal is submitting.
    pub fn open_delete(&mut self, index: usize, task: &Task) -> Result<(), SubmitRejected> {
        self.open(ActiveModal::DeleteConfirm {
            index,
            id: task.id,
            origin: DeleteOrigin::FromTable,
        })
    }

    /// Replace the view modal with a delete confirmation for the same task.
    ///
    /// # Errors
    /// Returns [`SubmitRejected::NothingToSubmit`] when the view modal is not open.
    pub fn view_to_delete(&mut self) -> Result<(), SubmitRejected> {
        match (&self.active, self.phase) {
            (Some(ActiveModal::View { index, id }), Some(Phase::Open)) => {
                let next = ActiveModal::DeleteConfirm {
                    index: *index,
                    id: *id,
                    origin: DeleteOrigin::FromView,
                };
                self.set_open(next);
                Ok(())
            }
            _ => Err(SubmitRejected::NothingToSubmit),
        }
    }

    /// Answer "No" on the delete confirmation.
    ///
    /// Returns to the view modal when the confirmation was opened from it,
    /// otherwise closes. Refused while the delete is in flight.
    pub fn decline_delete(&mut self) -> bool {
        if !self.can_dismiss() {
            return false;
        }
        match self.active {
            Some(ActiveModal::DeleteConfirm {
                index,
                id,
                origin: DeleteOrigin::FromView,
            }) => {
                self.set_open(ActiveModal::View { index, id });
                true
            }
            Some(ActiveModal::DeleteConfirm { .. }) => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// Close the active modal (outside click, Escape, close button).
    ///
    /// Refused while submitting. Closing drops any form state.
    pub fn dismiss(&mut self) -> bool {
        if !self.can_dismiss() {
            return false;
        }
        self.close();
        true
    }

    /// Validate the active modal and move it to `Submitting`.
    ///
    /// # Errors
    /// Returns [`SubmitRejected::InFlight`] when a mutation is already pending,
    /// [`SubmitRejected::Invalid`] when the form fails validation (the modal
    /// stays open), or [`SubmitRejected::NothingToSubmit`] when no modal with a
    /// submit action is open.
    pub fn begin_submit(&mut self) -> Result<TaskMutation, SubmitRejected> {
        match self.phase {
            Some(Phase::Submitting) => return Err(SubmitRejected::InFlight),
            None => return Err(SubmitRejected::NothingToSubmit),
            Some(Phase::Open) => {}
        }
        let mutation = match &mut self.active {
            Some(ActiveModal::Create { form }) => {
                Self::check(form)?;
                TaskMutation::Create {
                    title: form.trimmed_title(),
                    description: form.description.clone(),
                    tags: normalize_tags(&form.tags),
                    priority: form.priority.unwrap_or_default(),
                }
            }
            Some(ActiveModal::Edit {
                id,
                current_status,
                current_priority,
                form,
                ..
            }) => {
                Self::check(form)?;
                TaskMutation::Update {
                    id: *id,
                    title: form.trimmed_title(),
                    description: form.description.clone(),
                    tags: normalize_tags(&form.tags),
                    status: form.status.unwrap_or(*current_status),
                    priority: form.priority.unwrap_or(*current_priority),
                }
            }
            Some(ActiveModal::DeleteConfirm { id, .. }) => TaskMutation::Delete { id: *id },
            Some(ActiveModal::View { .. }) | None => return Err(SubmitRejected::NothingToSubmit),
        };
        self.phase = Some(Phase::Submitting);
        self.notice = None;
        debug!(?mutation, "Submitting modal");
        Ok(mutation)
    }

    /// Record the result of the in-flight mutation.
    pub fn finish_submit(&mut self, outcome: SubmitOutcome) -> SubmitResolution {
        if !self.is_submitting() {
            return SubmitResolution::Ignored;
        }
        match outcome {
            SubmitOutcome::Succeeded | SubmitOutcome::NotFound => {
                self.close();
                SubmitResolution::Closed
            }
            SubmitOutcome::Failed(message) => {
                self.phase = Some(Phase::Open);
                self.notice = Some(message);
                SubmitResolution::Reopened
            }
        }
    }

    fn check(form: &mut TaskForm) -> Result<(), SubmitRejected> {
        form.validate().map_err(|err| {
            form.error = Some(err);
            SubmitRejected::Invalid(err)
        })?;
        form.error = None;
        Ok(())
    }

    fn open(&mut self, modal: ActiveModal) -> Result<(), SubmitRejected> {
        if self.is_submitting() {
            return Err(SubmitRejected::InFlight);
        }
        self.set_open(modal);
        Ok(())
    }

    fn set_open(&mut self, modal: ActiveModal) {
        self.active = Some(modal);
        self.phase = Some(Phase::Open);
        self.notice = None;
    }

    fn close(&mut self) {
        self.active = None;
        self.phase = None;
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasks_tracker_core::OwnerId;

    fn task(title: &str) -> Task {
        Task::new(OwnerId::new("u1"), title)
            .with_description("body")
            .with_tags(["Bug"])
            .with_status(Status::InProgress)
            .with_priority(Priority::High)
    }

    fn ok<T>(result: Result<T, SubmitRejected>) -> T {
        result.unwrap_or_else(|err| panic!("unexpected rejection: {err}"))
    }

    #[test]
    fn create_defaults_priority_to_low() {
        let mut modals = ModalController::new();
        ok(modals.open_create());
        if let Some(form) = modals.form_mut() {
            form.title = "New task".into();
        }
        let mutation = ok(modals.begin_submit());
        assert_eq!(
            mutation,
            TaskMutation::Create {
                title: "New task".into(),
                description: String::new(),
                tags: Vec::new(),
                priority: Priority::Low,
            }
        );
        assert!(modals.is_submitting());
    }

    #[test]
    fn blank_title_blocks_submit_and_keeps_modal_open() {
        let mut modals = ModalController::new();
        ok(modals.open_create());
        if let Some(form) = modals.form_mut() {
            form.title = "   ".into();
        }
        assert_eq!(
            modals.begin_submit(),
            Err(SubmitRejected::Invalid(FormError::BlankTitle))
        );
        assert_eq!(modals.phase(), Some(Phase::Open));
        assert_eq!(modals.form().and_then(TaskForm::error), Some(FormError::BlankTitle));
    }

    #[test]
    fn edit_prepopulates_and_leaves_status_priority_unset() {
        let existing = task("Fix bug");
        let mut modals = ModalController::new();
        ok(modals.open_edit(3, &existing));
        let form = modals.form().unwrap_or_else(|| panic!("edit form"));
        assert_eq!(form.title, "Fix bug");
        assert_eq!(form.description, "body");
        assert_eq!(form.tags, vec!["Bug"]);
        assert_eq!(form.status, None);
        assert_eq!(form.priority, None);
        assert_eq!(modals.active().and_then(ActiveModal::index), Some(3));
    }

    #[test]
    fn edit_without_touching_status_keeps_existing_values() {
        let existing = task("Fix bug");
        let mut modals = ModalController::new();
        ok(modals.open_edit(0, &existing));
        if let Some(form) = modals.form_mut() {
            form.title = "Fix bug quickly".into();
        }
        match ok(modals.begin_submit()) {
            TaskMutation::Update {
                id,
                title,
                status,
                priority,
                ..
            } => {
                assert_eq!(id, existing.id);
                assert_eq!(title, "Fix bug quickly");
                assert_eq!(status, Status::InProgress);
                assert_eq!(priority, Priority::High);
            }
            other => panic!("unexpected mutation {other:?}"),
        }
    }

    #[test]
    fn edit_uses_explicit_selection_when_set() {
        let existing = task("Fix bug");
        let mut modals = ModalController::new();
        ok(modals.open_edit(0, &existing));
        if let Some(form) = modals.form_mut() {
            form.status = Some(Status::Done);
            form.toggle_tag("Planning");
        }
        match ok(modals.begin_submit()) {
            TaskMutation::Update { status, priority, tags, .. } => {
                assert_eq!(status, Status::Done);
                assert_eq!(priority, Priority::High);
                assert_eq!(tags, vec!["Bug", "Planning"]);
            }
            other => panic!("unexpected mutation {other:?}"),
        }
    }

    #[test]
    fn closing_edit_resets_form() {
        let existing = task("Fix bug");
        let mut modals = ModalController::new();
        ok(modals.open_edit(0, &existing));
        if let Some(form) = modals.form_mut() {
            form.title = "scratch".into();
        }
        assert!(modals.dismiss());
        assert!(modals.is_closed());
        ok(modals.open_edit(0, &existing));
        assert_eq!(modals.form().map(|form| form.title.as_str()), Some("Fix bug"));
    }

    #[test]
    fn second_delete_submit_is_rejected_while_in_flight() {
        let existing = task("Doomed");
        let mut modals = ModalController::new();
        ok(modals.open_delete(1, &existing));
        assert_eq!(ok(modals.begin_submit()), TaskMutation::Delete { id: existing.id });
        assert_eq!(modals.begin_submit(), Err(SubmitRejected::InFlight));
        assert!(!modals.dismiss());
        assert!(!modals.decline_delete());
        assert!(!modals.can_dismiss());
        assert_eq!(modals.open_create(), Err(SubmitRejected::InFlight));
    }

    #[test]
    fn decline_from_view_returns_to_view() {
        let existing = task("Doomed");
        let mut modals = ModalController::new();
        ok(modals.open_view(2, &existing));
        ok(modals.view_to_delete());
        assert_eq!(
            modals.active(),
            Some(&ActiveModal::DeleteConfirm {
                index: 2,
                id: existing.id,
                origin: DeleteOrigin::FromView,
            })
        );
        assert!(modals.decline_delete());
        assert_eq!(
            modals.active(),
            Some(&ActiveModal::View {
                index: 2,
                id: existing.id,
            })
        );
    }

    #[test]
    fn decline_from_table_closes() {
        let existing = task("Doomed");
        let mut modals = ModalController::new();
        ok(modals.open_delete(0, &existing));
        assert!(modals.decline_delete());
        assert!(modals.is_closed());
    }

    #[test]
    fn view_has_nothing_to_submit() {
        let existing = task("Read only");
        let mut modals = ModalController::new();
        ok(modals.open_view(0, &existing));
        assert_eq!(modals.begin_submit(), Err(SubmitRejected::NothingToSubmit));
        assert!(modals.form_mut().is_none());
        assert_eq!(ModalController::new().begin_submit(), Err(SubmitRejected::NothingToSubmit));
    }

    #[test]
    fn success_and_not_found_close_the_modal() {
        let existing = task("Doomed");
        for outcome in [SubmitOutcome::Succeeded, SubmitOutcome::NotFound] {
            let mut modals = ModalController::new();
            ok(modals.open_delete(0, &existing));
            ok(modals.begin_submit());
            assert_eq!(modals.finish_submit(outcome), SubmitResolution::Closed);
            assert!(modals.is_closed());
        }
    }

    #[test]
    fn failure_reopens_with_notice_for_retry() {
        let mut modals = ModalController::new();
        ok(modals.open_create());
        if let Some(form) = modals.form_mut() {
            form.title = "Retry me".into();
        }
        ok(modals.begin_submit());
        assert_eq!(
            modals.finish_submit(SubmitOutcome::Failed("database is locked".into())),
            SubmitResolution::Reopened
        );
        assert_eq!(modals.phase(), Some(Phase::Open));
        assert_eq!(modals.notice(), Some("database is locked"));
        assert_eq!(modals.form().map(|form| form.title.as_str()), Some("Retry me"));

        assert!(matches!(ok(modals.begin_submit()), TaskMutation::Create { .. }));
        assert_eq!(modals.notice(), None);
    }

    #[test]
    fn finish_without_submission_is_ignored() {
        let mut modals = ModalController::new();
        assert_eq!(modals.finish_submit(SubmitOutcome::Succeeded), SubmitResolution::Ignored);
        ok(modals.open_create());
        assert_eq!(modals.finish_submit(SubmitOutcome::Succeeded), SubmitResolution::Ignored);
        assert_eq!(modals.kind(), Some(ModalKind::Create));
    }

    #[test]
    fn opening_a_modal_replaces_the_previous_one() {
        let existing = task("Fix bug");
        let mut modals = ModalController::new();
        ok(modals.open_create());
        ok(modals.open_view(0, &existing));
        assert_eq!(modals.kind(), Some(ModalKind::View));
        assert!(modals.form().is_none());
    }
}
