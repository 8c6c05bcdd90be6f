#![allow(missing_docs)]

use std::fmt::Display;
use std::time::Duration;

use tasks_tracker_app::{
    AsyncTaskService, ModalController, SubmitOutcome, SubmitRejected, SubmitResolution, TaskMutation, TaskService,
};
use tasks_tracker_core::{FilterState, OwnerId, Priority, Status, Task};
use tasks_tracker_store_sqlite::SqliteStore;
use tempfile::TempDir;

fn ok<T, E: Display>(result: Result<T, E>, what: &str) -> T {
    result.unwrap_or_else(|err| panic!("{what}: {err}"))
}

fn service(dir: &TempDir) -> TaskService<SqliteStore> {
    TaskService::new(ok(SqliteStore::open(dir.path().join("tasks.db")), "open"))
}

fn submit(service: &TaskService<SqliteStore>, owner: &OwnerId, modals: &mut ModalController) -> SubmitResolution {
    let mutation = ok(modals.begin_submit(), "begin submit");
    let outcome = service
        .apply(owner, mutation)
        .map_or_else(|err| err.to_outcome(), |_| SubmitOutcome::Succeeded);
    modals.finish_submit(outcome)
}

fn refetch(service: &TaskService<SqliteStore>, owner: &OwnerId) -> Vec<Task> {
    ok(service.list(owner), "list")
}

#[test]
fn create_edit_delete_through_the_modal() {
    let dir = ok(TempDir::new(), "tempdir");
    let service = service(&dir);
    let owner = OwnerId::new("u1");
    let mut modals = ModalController::new();

    ok(modals.open_create(), "open create");
    if let Some(form) = modals.form_mut() {
        form.title = "New task".into();
    }
    assert_eq!(submit(&service, &owner, &mut modals), SubmitResolution::Closed);
    let tasks = refetch(&service, &owner);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].priority, Priority::Low);
    assert_eq!(tasks[0].status, Status::Backlog);

    ok(modals.open_edit(0, &tasks[0]), "open edit");
    if let Some(form) = modals.form_mut() {
        form.priority = Some(Priority::High);
    }
    assert_eq!(submit(&service, &owner, &mut modals), SubmitResolution::Closed);
    let tasks = refetch(&service, &owner);
    assert_eq!(tasks[0].status, Status::Backlog);
    assert_eq!(tasks[0].priority, Priority::High);

    ok(modals.open_view(0, &tasks[0]), "open view");
    ok(modals.view_to_delete(), "view to delete");
    assert_eq!(submit(&service, &owner, &mut modals), SubmitResolution::Closed);
    assert!(refetch(&service, &owner).is_empty());
}

#[test]
fn deleting_a_vanished_task_still_closes_the_modal() {
    let dir = ok(TempDir::new(), "tempdir");
    let service = service(&dir);
    let owner = OwnerId::new("u1");
    let mut modals = ModalController::new();

    ok(modals.open_create(), "open create");
    if let Some(form) = modals.form_mut() {
        form.title = "Gone soon".into();
    }
    submit(&service, &owner, &mut modals);
    let tasks = refetch(&service, &owner);

    ok(modals.open_delete(0, &tasks[0]), "open delete");
    ok(service.delete(tasks[0].id), "delete behind the modal's back");
    assert_eq!(submit(&service, &owner, &mut modals), SubmitResolution::Closed);
    assert!(modals.is_closed());
}

#[test]
fn one_delete_call_per_confirmation() {
    let dir = ok(TempDir::new(), "tempdir");
    let service = service(&dir);
    let owner = OwnerId::new("u1");
    let mut modals = ModalController::new();

    ok(modals.open_create(), "open create");
    if let Some(form) = modals.form_mut() {
        form.title = "Doomed".into();
    }
    submit(&service, &owner, &mut modals);
    let tasks = refetch(&service, &owner);

    ok(modals.open_delete(0, &tasks[0]), "open delete");
    let first = ok(modals.begin_submit(), "first submit");
    assert_eq!(modals.begin_submit(), Err(SubmitRejected::InFlight));
    assert!(matches!(first, TaskMutation::Delete { .. }));
    ok(service.apply(&owner, first), "delete");
    assert_eq!(modals.finish_submit(SubmitOutcome::Succeeded), SubmitResolution::Closed);
}

#[test]
fn filtered_view_over_stored_tasks() {
    let dir = ok(TempDir::new(), "tempdir");
    let service = service(&dir);
    let owner = OwnerId::new("u1");
    for (title, status, priority) in [
        ("Fix bug", Status::Todo, Priority::Low),
        ("Write docs", Status::Done, Priority::Medium),
    ] {
        let mut modals = ModalController::new();
        ok(modals.open_create(), "open create");
        if let Some(form) = modals.form_mut() {
            form.title = title.into();
            form.priority = Some(priority);
        }
        submit(&service, &owner, &mut modals);
        let tasks = refetch(&service, &owner);
        let created = tasks.last().unwrap_or_else(|| panic!("created task"));
        ok(modals.open_edit(tasks.len() - 1, created), "open edit");
        if let Some(form) = modals.form_mut() {
            form.status = Some(status);
        }
        submit(&service, &owner, &mut modals);
    }

    let tasks = refetch(&service, &owner);
    let by_status = FilterState::new().with_statuses([Status::Todo]);
    let titles: Vec<_> = by_status.apply(&tasks).iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Fix bug"]);

    let by_title = FilterState::new().with_title_query("WRITE");
    let titles: Vec<_> = by_title.apply(&tasks).iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Write docs"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn async_service_drives_modal_to_closed() {
    let dir = ok(TempDir::new(), "tempdir");
    let service = AsyncTaskService::new(service(&dir), Duration::from_secs(5));
    let owner = OwnerId::new("u1");
    let mut modals = ModalController::new();

    ok(modals.open_create(), "open create");
    if let Some(form) = modals.form_mut() {
        form.title = "Async".into();
    }
    let mutation = ok(modals.begin_submit(), "begin submit");
    let outcome = service.submit(owner.clone(), mutation).await;
    assert_eq!(modals.finish_submit(outcome), SubmitResolution::Closed);
    assert_eq!(ok(service.list(owner).await, "list").len(), 1);
}
