use super::app::App;
use super::view::{FilterMenuKind, Focus, Menu, Ui};
use super::worker::MutationWorker;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};
use std::fmt::Display;
use std::time::{Duration, Instant};
use tasks_tracker_app::{
    AsyncTaskService, CreateTaskInput, DefaultSession, EnvSession, FileSessionStore, FormError, Identity,
    LayeredSession, ModalKind, Route, SessionGateway, TaskService, UpdateTaskInput,
};
use tasks_tracker_core::{Priority, Status, Task};
use tasks_tracker_store_sqlite::SqliteStore;
use tempfile::TempDir;
use tokio::runtime::Runtime;

const QUIET: Duration = Duration::from_millis(50);

fn expect_ok<T, E: Display>(result: Result<T, E>, ctx: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{ctx}: {err}"),
    }
}

fn expect_some<T>(value: Option<T>, ctx: &str) -> T {
    value.map_or_else(|| panic!("{ctx}"), |inner| inner)
}

fn no_env(_: &'static str) -> Option<String> {
    None
}

fn session(dir: &TempDir) -> DefaultSession {
    LayeredSession::new(
        EnvSession::with_fetch(no_env as fn(&'static str) -> Option<String>),
        FileSessionStore::new(dir.path().join("session.toml")),
    )
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

struct Harness {
    ui: Ui<SqliteStore>,
    service: AsyncTaskService<SqliteStore>,
    dir: TempDir,
    _runtime: Runtime,
}

impl Harness {
    fn new(user: Option<&str>, start: &str) -> Self {
        Self::seeded(user, start, &[])
    }

    /// Build a page whose store already holds `titles` for `user`.
    fn seeded(user: Option<&str>, start: &str, titles: &[(&str, Priority)]) -> Self {
        let dir = expect_ok(TempDir::new(), "tempdir");
        let session = session(&dir);
        if let Some(user) = user {
            expect_ok(session.fallback().sign_in(&Identity::new(user)), "sign in");
        }
        let store = expect_ok(SqliteStore::open_in_memory(), "store");
        let service = AsyncTaskService::new(TaskService::new(store), Duration::from_secs(5));
        if let Some(user) = user {
            for (title, priority) in titles {
                expect_ok(
                    service.service().create(CreateTaskInput {
                        owner: Identity::new(user).id,
                        title: (*title).to_owned(),
                        description: String::new(),
                        tags: Vec::new(),
                        priority: Some(*priority),
                    }),
                    "seed task",
                );
            }
        }

        let runtime = expect_ok(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_time()
                .build(),
            "runtime",
        );
        let identity = expect_ok(session.current(), "current identity");
        let app = expect_ok(App::new(service.clone(), identity, QUIET), "app");
        let worker = MutationWorker::new(service.clone(), runtime.handle().clone());
        let route: Route = expect_ok(start.parse(), "route");
        Self {
            ui: Ui::new(app, worker, session, route),
            service,
            dir,
            _runtime: runtime,
        }
    }

    fn press(&mut self, code: KeyCode) {
        expect_ok(self.ui.handle_key(key(code)), "handle key");
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press(KeyCode::Char(ch));
        }
    }

    /// Wait for the in-flight mutation and fold it into the page.
    fn settle(&mut self) {
        let completion = expect_some(self.ui.worker.wait(), "completion");
        self.ui.complete(completion);
    }

    fn message(&self) -> Option<&str> {
        self.ui.message.as_ref().map(|msg| msg.text.as_str())
    }

    fn titles(&self) -> Vec<String> {
        self.ui
            .app
            .visibility()
            .visible_tasks(&self.ui.app.tasks)
            .map(|task| task.title.clone())
            .collect()
    }

    fn stored(&self, user: &str) -> Vec<Task> {
        expect_ok(self.service.service().list(&Identity::new(user).id), "list")
    }

    fn render(&self) -> String {
        let mut terminal = expect_ok(Terminal::new(TestBackend::new(120, 32)), "terminal");
        expect_ok(terminal.draw(|f| self.ui.draw(f)), "draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }
}

#[test]
fn signed_out_start_redirects_to_sign_in() {
    let mut h = Harness::new(None, "/");
    assert!(matches!(h.ui.route, Route::SignIn { .. }));
    assert!(h.render().contains("Sign in to continue"));

    h.press(KeyCode::Enter);
    assert_eq!(h.message(), Some("Enter a user id to sign in"));

    h.type_text("alice");
    h.press(KeyCode::Enter);
    assert_eq!(h.ui.route, Route::Tasks);
    assert_eq!(h.ui.app.identity().map(|identity| identity.name.as_str()), Some("alice"));
    assert_eq!(h.message(), Some("Signed in as alice"));
}

#[test]
fn signed_in_root_renders_the_task_page() {
    let h = Harness::seeded(Some("alice"), "/", &[("Fix bug", Priority::High)]);
    assert_eq!(h.ui.route, Route::Tasks);
    let screen = h.render();
    assert!(screen.contains("Welcome, alice!"));
    assert!(screen.contains("Here's your current tasks."));
    assert!(screen.contains("TASK-0"));
    assert!(screen.contains("Fix bug"));
}

#[test]
fn empty_table_invites_adding_tasks() {
    let h = Harness::new(Some("alice"), "/~");
    assert!(h.render().contains("Looks like there are no tasks to display yet!"));
}

#[test]
fn create_flow_adds_a_low_priority_backlog_task() {
    let mut h = Harness::new(Some("alice"), "/~");
    h.press(KeyCode::Char('n'));
    assert_eq!(h.ui.modals.kind(), Some(ModalKind::Create));
    h.type_text("Write docs");
    h.press(KeyCode::Enter);
    assert!(h.ui.modals.is_submitting());

    h.press(KeyCode::Esc);
    assert!(h.ui.modals.is_submitting());
    assert_eq!(h.message(), Some("A submission is already in progress"));

    h.settle();
    assert!(h.ui.modals.is_closed());
    assert_eq!(h.message(), Some("Task created"));
    assert_eq!(h.titles(), vec!["Write docs"]);
    let task = &h.ui.app.tasks[0];
    assert_eq!(task.priority, Priority::Low);
    assert_eq!(task.status, Status::Backlog);
}

#[test]
fn blank_title_keeps_the_form_open() {
    let mut h = Harness::new(Some("alice"), "/~");
    h.press(KeyCode::Char('n'));
    h.type_text("   ");
    h.press(KeyCode::Enter);
    assert!(!h.ui.modals.is_submitting());
    assert_eq!(
        h.ui.modals.form().and_then(tasks_tracker_app::TaskForm::error),
        Some(FormError::BlankTitle)
    );
    assert_eq!(h.message(), Some("Title is required"));
    assert!(h.render().contains("Title is required"));
}

#[test]
fn edit_keeps_status_and_priority_when_left_unset() {
    let mut h = Harness::seeded(Some("alice"), "/~", &[("Fix bug", Priority::High)]);
    let id = h.ui.app.tasks[0].id;
    expect_ok(
        h.service.service().update(UpdateTaskInput {
            id,
            owner: Identity::new("alice").id,
            title: None,
            description: None,
            tags: None,
            status: Some(Status::Todo),
            priority: None,
        }),
        "set status",
    );
    expect_ok(h.ui.app.refresh_tasks(), "refresh");

    h.press(KeyCode::Char('e'));
    assert_eq!(h.ui.modals.kind(), Some(ModalKind::Edit));
    h.type_text("!");
    h.press(KeyCode::Enter);
    h.settle();

    assert_eq!(h.message(), Some("Task updated"));
    let stored = h.stored("alice");
    assert_eq!(stored[0].title, "Fix bug!");
    assert_eq!(stored[0].status, Status::Todo);
    assert_eq!(stored[0].priority, Priority::High);
}

#[test]
fn declining_a_delete_from_view_returns_to_view() {
    let mut h = Harness::seeded(Some("alice"), "/~", &[("Fix bug", Priority::Low)]);
    h.press(KeyCode::Enter);
    assert_eq!(h.ui.menu, Some(Menu::RowActions { selected: 0 }));
    h.press(KeyCode::Enter);
    assert_eq!(h.ui.modals.kind(), Some(ModalKind::View));
    assert!(h.render().contains("Fix bug"));

    h.press(KeyCode::Char('d'));
    assert_eq!(h.ui.modals.kind(), Some(ModalKind::DeleteConfirm));
    assert!(h.render().contains("Are you sure you want to delete TASK-0?"));
    h.press(KeyCode::Char('n'));
    assert_eq!(h.ui.modals.kind(), Some(ModalKind::View));
    h.press(KeyCode::Esc);
    assert!(h.ui.modals.is_closed());
    assert_eq!(h.stored("alice").len(), 1);
}

#[test]
fn confirmed_delete_removes_the_row() {
    let mut h = Harness::seeded(Some("alice"), "/~", &[("Fix bug", Priority::Low)]);
    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    assert!(h.ui.modals.is_submitting());
    h.settle();
    assert_eq!(h.message(), Some("Task deleted"));
    assert!(h.ui.app.tasks.is_empty());
    assert!(h.stored("alice").is_empty());
}

#[test]
fn confirming_twice_sends_one_delete() {
    let mut h = Harness::seeded(
        Some("alice"),
        "/~",
        &[("Fix bug", Priority::Low), ("Write docs", Priority::Low)],
    );
    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    h.press(KeyCode::Char('y'));
    assert_eq!(h.message(), Some("A submission is already in progress"));
    assert!(h.ui.worker.is_busy());

    h.settle();
    assert!(!h.ui.worker.is_busy());
    std::thread::sleep(QUIET);
    assert!(h.ui.worker.try_recv().is_none());
    assert_eq!(h.message(), Some("Task deleted"));
    assert_eq!(h.titles(), vec!["Write docs"]);
    assert_eq!(h.stored("alice").len(), 1);
}

#[test]
fn deleting_a_vanished_task_closes_and_refreshes() {
    let mut h = Harness::seeded(Some("alice"), "/~", &[("Fix bug", Priority::Low)]);
    let id = h.ui.app.tasks[0].id;
    h.press(KeyCode::Char('d'));
    expect_ok(h.service.service().delete(id), "delete behind the page");
    h.press(KeyCode::Char('y'));
    h.settle();
    assert!(h.ui.modals.is_closed());
    assert_eq!(h.message(), Some("Task no longer exists; list refreshed"));
    assert!(h.ui.app.tasks.is_empty());
}

#[test]
fn priority_menu_toggles_and_summarises() {
    let mut h = Harness::seeded(
        Some("alice"),
        "/~",
        &[
            ("Low one", Priority::Low),
            ("Medium one", Priority::Medium),
            ("High one", Priority::High),
        ],
    );
    h.press(KeyCode::Char('p'));
    assert_eq!(
        h.ui.menu,
        Some(Menu::Filter {
            kind: FilterMenuKind::Priority,
            selected: 0
        })
    );
    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Char(' '));
    assert_eq!(h.titles(), vec!["Medium one"]);
    assert_eq!(h.ui.filter_summary(FilterMenuKind::Priority).as_deref(), Some("Medium"));

    h.press(KeyCode::Char('k'));
    h.press(KeyCode::Enter);
    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Enter);
    assert_eq!(h.titles().len(), 3);
    assert_eq!(h.ui.filter_summary(FilterMenuKind::Priority).as_deref(), Some("3 selected"));

    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Enter);
    assert_eq!(h.ui.filter_summary(FilterMenuKind::Priority), None);
    h.press(KeyCode::Esc);
    assert_eq!(h.ui.menu, None);
}

#[test]
fn status_filter_with_no_match_explains_the_empty_table() {
    let mut h = Harness::seeded(Some("alice"), "/~", &[("Fix bug", Priority::Low)]);
    h.press(KeyCode::Char('s'));
    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Enter);
    h.press(KeyCode::Esc);
    assert!(h.titles().is_empty());
    assert!(h.render().contains("No task matches the current filter"));
}

#[test]
fn title_filter_applies_after_the_quiet_period() {
    let mut h = Harness::seeded(
        Some("alice"),
        "/~",
        &[("Write docs", Priority::Low), ("Fix bug", Priority::Low)],
    );
    h.press(KeyCode::Char('/'));
    assert_eq!(h.ui.focus, Focus::TitleInput);
    h.type_text("DOC");
    assert!(h.ui.app.visibility().title_pending());
    assert_eq!(h.titles().len(), 2);

    h.ui.tick_at(Instant::now() + QUIET * 4);
    assert_eq!(h.titles(), vec!["Write docs"]);

    for _ in 0..3 {
        h.press(KeyCode::Backspace);
    }
    assert_eq!(h.titles().len(), 2);
    h.press(KeyCode::Esc);
    assert_eq!(h.ui.focus, Focus::Table);
}

#[test]
fn messages_expire() {
    let mut h = Harness::new(Some("alice"), "/~");
    h.ui.info("hello");
    h.ui.tick_at(Instant::now() + Duration::from_secs(1));
    assert_eq!(h.message(), Some("hello"));
    h.ui.tick_at(Instant::now() + Duration::from_secs(10));
    assert_eq!(h.message(), None);
}

#[test]
fn sign_out_returns_to_the_sign_in_page() {
    let mut h = Harness::seeded(Some("alice"), "/~", &[("Fix bug", Priority::Low)]);
    h.press(KeyCode::Char('L'));
    assert!(matches!(h.ui.route, Route::SignIn { .. }));
    assert!(h.ui.app.identity().is_none());
    assert!(h.ui.app.tasks.is_empty());
    assert_eq!(h.message(), Some("Signed out"));
    let file = FileSessionStore::new(h.dir.path().join("session.toml"));
    assert!(expect_ok(file.current(), "session file").is_none());
}

#[test]
fn quit_keys_stop_the_loop() {
    let mut h = Harness::new(Some("alice"), "/~");
    h.press(KeyCode::Char('q'));
    assert!(h.ui.should_quit);
}
