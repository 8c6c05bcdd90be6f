use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
};
use tasks_tracker_app::{
    DefaultSession, Identity, ModalController, ModalKind, Resolution, Route, SessionGateway, SubmitOutcome,
    SubmitRejected, SubmitResolution, TaskStore, resolve,
};
use tracing::debug;

use super::app::App;
use super::constants::{LOADING_FRAMES, UI_MESSAGE_TTL_SECS};
use super::worker::{Completion, MutationWorker};

/// Upper bound on chained redirects while resolving a route.
const MAX_REDIRECTS: usize = 4;

/// Keyboard focus on the task page when no popup or modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Focus {
    Table,
    TitleInput,
}

/// Which toolbar filter menu is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FilterMenuKind {
    Status,
    Priority,
}

/// Drop-down menus drawn over the task page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Menu {
    /// View / Edit / Delete for the selected row.
    RowActions { selected: usize },
    /// Checkbox list of statuses or priorities, followed by "Clear filter".
    Filter { kind: FilterMenuKind, selected: usize },
}

/// Focused input of the create/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FormField {
    Title,
    Description,
    Tags,
    Status,
    Priority,
}

/// Cursor inside the create/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FormCursor {
    pub field: FormField,
    /// Highlighted tag while `field` is [`FormField::Tags`].
    pub tag: usize,
}

impl Default for FormCursor {
    fn default() -> Self {
        Self {
            field: FormField::Title,
            tag: 0,
        }
    }
}

pub(super) struct Ui<S> {
    pub(super) app: App<S>,
    pub(super) modals: ModalController,
    pub(super) worker: MutationWorker<S>,
    pub(super) session: DefaultSession,
    pub(super) route: Route,
    pub(super) focus: Focus,
    pub(super) menu: Option<Menu>,
    pub(super) form_cursor: FormCursor,
    pub(super) sign_in_input: String,
    pub(super) message: Option<Message>,
    pub(super) spinner: usize,
    pub(super) should_quit: bool,
}

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(super) const HEADER_HEIGHT: u16 = 4;
    pub(super) const TOOLBAR_HEIGHT: u16 = 3;
    pub(super) const MAIN_MIN_HEIGHT: u16 = 5;
    pub(super) const INSTRUCTIONS_HEIGHT: u16 = 3;
    pub(super) const STATUS_MESSAGE_HEIGHT: u16 = 3;

    pub(super) fn new(app: App<S>, worker: MutationWorker<S>, session: DefaultSession, start: Route) -> Self {
        let mut ui = Self {
            app,
            modals: ModalController::new(),
            worker,
            session,
            route: Route::Root,
            focus: Focus::Table,
            menu: None,
            form_cursor: FormCursor::default(),
            sign_in_input: String::new(),
            message: None,
            spinner: 0,
            should_quit: false,
        };
        ui.navigate(start);
        ui
    }

    pub(super) fn draw(&self, f: &mut Frame<'_>) {
        if matches!(self.route, Route::SignIn { .. }) {
            self.draw_sign_in(f);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Self::HEADER_HEIGHT),
                Constraint::Length(Self::TOOLBAR_HEIGHT),
                Constraint::Min(Self::MAIN_MIN_HEIGHT),
                Constraint::Length(Self::INSTRUCTIONS_HEIGHT),
                Constraint::Length(Self::STATUS_MESSAGE_HEIGHT),
            ])
            .split(f.area());

        self.draw_header(f, rows[0]);
        self.draw_toolbar(f, rows[1]);
        self.draw_task_table(f, rows[2]);
        self.draw_status(f, rows[3], rows[4]);

        match self.menu {
            Some(Menu::RowActions { selected }) => self.draw_row_menu(f, rows[2], selected),
            Some(Menu::Filter { kind, selected }) => self.draw_filter_menu(f, rows[1], kind, selected),
            None => {}
        }

        match self.modals.kind() {
            Some(ModalKind::Create | ModalKind::Edit) => self.draw_form_modal(f),
            Some(ModalKind::View) => self.draw_view_modal(f),
            Some(ModalKind::DeleteConfirm) => self.draw_delete_modal(f),
            None => {}
        }
    }

    pub(super) fn info(&mut self, message: impl Into<String>) {
        self.message = Some(Message::info(message));
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        self.message = Some(Message::error(message));
    }

    pub(super) fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub(super) fn tick_at(&mut self, now: Instant) {
        if let Some(msg) = &self.message
            && msg.is_expired(now, Duration::from_secs(UI_MESSAGE_TTL_SECS))
        {
            self.message = None;
        }

        if self.app.visibility_mut().poll_title(now) {
            self.app.refilter();
        }

        while let Some(completion) = self.worker.try_recv() {
            self.complete(completion);
        }

        if self.modals.is_submitting() {
            self.spinner = (self.spinner + 1) % LOADING_FRAMES.len();
        }
    }

    pub(super) fn loading_frame(&self) -> &'static str {
        LOADING_FRAMES[self.spinner % LOADING_FRAMES.len()]
    }

    /// Fold a finished mutation into the modal and the task list.
    pub(super) fn complete(&mut self, completion: Completion) {
        let kind = self.modals.kind();
        let Completion { outcome, refreshed } = completion;
        let note = match &outcome {
            SubmitOutcome::Succeeded => Ok(success_message(kind)),
            SubmitOutcome::NotFound => Ok("Task no longer exists; list refreshed"),
            SubmitOutcome::Failed(reason) => Err(format!("Submission failed: {reason}")),
        };

        match (self.modals.finish_submit(outcome), note) {
            (SubmitResolution::Closed, Ok(text)) => {
                self.form_cursor = FormCursor::default();
                self.info(text);
            }
            (SubmitResolution::Reopened, Err(text)) => self.error(text),
            (resolution, _) => debug!(?resolution, "Ignoring stale completion"),
        }

        if let Some(tasks) = refreshed {
            self.app.replace_tasks(tasks);
        }
    }

    /// Validate the active modal and hand its mutation to the worker.
    pub(super) fn submit_modal(&mut self) -> Result<()> {
        let owner = self
            .app
            .identity()
            .map(|identity| identity.id.clone())
            .ok_or_else(|| anyhow!("not signed in"))?;
        match self.modals.begin_submit() {
            Ok(mutation) => {
                self.spinner = 0;
                self.worker.submit(owner, mutation);
            }
            Err(SubmitRejected::Invalid(err)) => self.error(err.to_string()),
            Err(SubmitRejected::InFlight) => self.info("A submission is already in progress"),
            Err(SubmitRejected::NothingToSubmit) => {}
        }
        Ok(())
    }

    /// Show `route`, following the sign-in gate's redirects.
    pub(super) fn navigate(&mut self, route: Route) {
        let signed_in = self.app.identity().is_some();
        let mut current = route;
        for _ in 0..MAX_REDIRECTS {
            match resolve(&current, signed_in) {
                Resolution::Render(target) => {
                    current = target;
                    break;
                }
                Resolution::Redirect(next) => {
                    debug!(from = %current, to = %next, "Redirecting");
                    current = next;
                }
            }
        }
        self.route = current;
        self.menu = None;
        self.focus = Focus::Table;
    }

    /// Record the identity typed on the sign-in page and continue to the callback.
    pub(super) fn sign_in(&mut self) -> Result<()> {
        let user_id = self.sign_in_input.trim().to_owned();
        if user_id.is_empty() {
            self.error("Enter a user id to sign in");
            return Ok(());
        }
        self.session.fallback().sign_in(&Identity::new(user_id))?;
        let identity = self.session.current()?;
        let welcome = identity.as_ref().map(Identity::display);
        self.app.set_identity(identity)?;
        self.sign_in_input.clear();

        let next = self.route.after_sign_in();
        self.navigate(next);
        if let Some(name) = welcome {
            self.info(format!("Signed in as {name}"));
        }
        Ok(())
    }

    /// Forget the session and return to the root page.
    pub(super) fn sign_out(&mut self) -> Result<()> {
        if self.modals.is_submitting() || self.worker.is_busy() {
            self.info("Wait for the submission to finish before signing out");
            return Ok(());
        }
        self.session.fallback().sign_out()?;
        self.modals.dismiss();
        self.app.set_identity(self.session.current()?)?;
        self.navigate(Route::after_sign_out());
        self.info("Signed out");
        Ok(())
    }

    /// Welcome line of the header.
    pub(super) fn user_label(&self) -> String {
        self.app
            .identity()
            .map_or_else(|| "Not signed in".to_owned(), |identity| identity.display())
    }
}

const fn success_message(kind: Option<ModalKind>) -> &'static str {
    match kind {
        Some(ModalKind::Create) => "Task created",
        Some(ModalKind::Edit) => "Task updated",
        Some(ModalKind::DeleteConfirm) => "Task deleted",
        Some(ModalKind::View) | None => "Done",
    }
}

pub(super) struct Message {
    pub(super) text: String,
    pub(super) level: MessageLevel,
    created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Info,
    Error,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Info,
            created_at: Instant::now(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Error,
            created_at: Instant::now(),
        }
    }

    pub(super) fn style(&self) -> Style {
        match self.level {
            MessageLevel::Info => Style::default().fg(Color::Green),
            MessageLevel::Error => Style::default().fg(Color::Red),
        }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}
