use tasks_tracker_app::{AsyncTaskService, SubmitOutcome, TaskMutation, TaskStore};
use tasks_tracker_core::{OwnerId, Task};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, warn};

/// Result of one background mutation, delivered to the UI thread.
#[derive(Debug)]
pub(super) struct Completion {
    pub outcome: SubmitOutcome,
    /// The owner's task list fetched after the mutation settled.
    pub refreshed: Option<Vec<Task>>,
}

/// Runs modal mutations on the tokio runtime and hands results back through a channel.
pub(super) struct MutationWorker<S> {
    service: AsyncTaskService<S>,
    runtime: Handle,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<S> MutationWorker<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(super) fn new(service: AsyncTaskService<S>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            runtime,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub(super) const fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Start `mutation` for `owner`; the list is re-fetched once it settles.
    pub(super) fn submit(&mut self, owner: OwnerId, mutation: TaskMutation) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        debug!(?mutation, "Dispatching mutation");
        self.runtime.spawn(async move {
            let outcome = service.submit(owner.clone(), mutation).await;
            let refreshed = match service.list(owner).await {
                Ok(tasks) => Some(tasks),
                Err(err) => {
                    warn!(error = %err, "Failed to re-fetch tasks");
                    None
                }
            };
            // The receiver lives as long as the UI; a send error means it is shutting down.
            let _ = tx.send(Completion { outcome, refreshed });
        });
    }

    /// Next finished mutation, if any.
    pub(super) fn try_recv(&mut self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the next mutation finishes.
    #[cfg(test)]
    pub(super) fn wait(&mut self) -> Option<Completion> {
        let completion = self.rx.blocking_recv();
        if completion.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        completion
    }
}
