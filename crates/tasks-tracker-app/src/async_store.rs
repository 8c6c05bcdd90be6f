//! Async façade running blocking store calls off the UI thread.

use std::sync::Arc;
use std::time::Duration;

use tasks_tracker_core::{OwnerId, Task};
use thiserror::Error;
use tracing::warn;

use crate::modal::{SubmitOutcome, TaskMutation};
use crate::service::{MutationApplied, TaskService, TaskWriteError};
use crate::store::TaskStore;

/// Errors raised by [`AsyncTaskService`].
#[derive(Debug, Error)]
pub enum AsyncStoreError {
    /// The store call did not finish within the configured timeout.
    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),
    /// The blocking task panicked or was cancelled.
    #[error("task join error: {0}")]
    Join(String),
    /// The service rejected the operation.
    #[error(transparent)]
    Write(#[from] TaskWriteError),
}

impl AsyncStoreError {
    /// Map the error onto the modal's submit outcome.
    #[must_use]
    pub fn to_outcome(&self) -> SubmitOutcome {
        match self {
            Self::Write(err) => err.to_outcome(),
            other => SubmitOutcome::Failed(other.to_string()),
        }
    }
}

/// Shared handle to a [`TaskService`] usable from async code.
pub struct AsyncTaskService<S> {
    inner: Arc<TaskService<S>>,
    timeout: Duration,
}

impl<S> Clone for AsyncTaskService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<S> AsyncTaskService<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    /// Wrap a service; every call is bounded by `timeout`.
    pub fn new(service: TaskService<S>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(service),
            timeout,
        }
    }

    /// Timeout applied to each call.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Blocking access to the wrapped service.
    pub fn service(&self) -> &TaskService<S> {
        &self.inner
    }

    async fn run<T, F>(&self, op: F) -> Result<T, AsyncStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskService<S>) -> Result<T, TaskWriteError> + Send + 'static,
    {
        let service = Arc::clone(&self.inner);
        let handle = tokio::task::spawn_blocking(move || op(&*service));
        // A timed-out call keeps running in the blocking pool; callers re-fetch afterwards.
        match tokio::time::timeout(self.timeout, handle).await {
            Ok(joined) => joined
                .map_err(|err| AsyncStoreError::Join(err.to_string()))?
                .map_err(AsyncStoreError::Write),
            Err(_) => {
                warn!(timeout = ?self.timeout, "Store call timed out");
                Err(AsyncStoreError::TimedOut(self.timeout))
            }
        }
    }

    /// Apply a mutation for `owner`.
    ///
    /// # Errors
    /// Returns [`AsyncStoreError`] when the call fails, panics or times out.
    pub async fn apply(&self, owner: OwnerId, mutation: TaskMutation) -> Result<MutationApplied, AsyncStoreError> {
        self.run(move |service| service.apply(&owner, mutation)).await
    }

    /// Apply a mutation and fold the result into a [`SubmitOutcome`].
    pub async fn submit(&self, owner: OwnerId, mutation: TaskMutation) -> SubmitOutcome {
        match self.apply(owner, mutation).await {
            Ok(_) => SubmitOutcome::Succeeded,
            Err(err) => err.to_outcome(),
        }
    }

    /// List the tasks of `owner`.
    ///
    /// # Errors
    /// Returns [`AsyncStoreError`] when the call fails, panics or times out.
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<Task>, AsyncStoreError> {
        self.run(move |service| service.list(&owner)).await
    }
}
