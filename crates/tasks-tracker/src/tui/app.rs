use std::time::Duration;

use anyhow::Result;
use tasks_tracker_app::{AsyncTaskService, Identity, TaskStore};
use tasks_tracker_core::{Task, TaskId};

use super::task_visibility::TaskVisibility;

/// Task page state shared between the event loop and rendering.
pub(super) struct App<S> {
    service: AsyncTaskService<S>,
    identity: Option<Identity>,
    /// The owner's tasks in store order; replaced wholesale on every fetch.
    pub tasks: Vec<Task>,
    visibility: TaskVisibility,
}

impl<S> App<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    /// Create the page state and load the tasks of `identity`, if any.
    pub(super) fn new(service: AsyncTaskService<S>, identity: Option<Identity>, quiet: Duration) -> Result<Self> {
        let mut app = Self {
            service,
            identity,
            tasks: Vec::new(),
            visibility: TaskVisibility::new(quiet),
        };
        app.refresh_tasks()?;
        Ok(app)
    }

    pub(super) const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Switch the signed-in user and reload.
    pub(super) fn set_identity(&mut self, identity: Option<Identity>) -> Result<()> {
        self.identity = identity;
        self.refresh_tasks()
    }

    pub(super) const fn visibility(&self) -> &TaskVisibility {
        &self.visibility
    }

    pub(super) const fn visibility_mut(&mut self) -> &mut TaskVisibility {
        &mut self.visibility
    }

    /// Re-read the owner's tasks from the store.
    pub(super) fn refresh_tasks(&mut self) -> Result<()> {
        let tasks = match &self.identity {
            Some(identity) => self.service.service().list(&identity.id)?,
            None => Vec::new(),
        };
        self.replace_tasks(tasks);
        Ok(())
    }

    /// Swap in a freshly fetched list, keeping the selected task when it survives.
    pub(super) fn replace_tasks(&mut self, tasks: Vec<Task>) {
        let keep = self.selected_task_id();
        self.tasks = tasks;
        self.rebuild_visibility(keep);
    }

    pub(super) fn rebuild_visibility(&mut self, preferred: Option<TaskId>) {
        self.visibility.rebuild(&self.tasks, preferred);
    }

    /// Rebuild after a filter change, keeping the current selection when visible.
    pub(super) fn refilter(&mut self) {
        let keep = self.selected_task_id();
        self.rebuild_visibility(keep);
    }

    pub(super) fn selected_task(&self) -> Option<&Task> {
        self.visibility.selected_task(&self.tasks)
    }

    pub(super) fn selected_task_id(&self) -> Option<TaskId> {
        self.visibility.selected_task_id(&self.tasks)
    }

    pub(super) fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}
