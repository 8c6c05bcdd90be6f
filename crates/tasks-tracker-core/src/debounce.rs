//! Cancellable quiet-period timer used to coalesce rapid input.

use std::time::{Duration, Instant};

/// Quiet period applied to title filtering unless configured otherwise.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Holds the most recent value until no new value arrives for `quiet`.
///
/// The timer is driven explicitly: callers pass the current instant to
/// [`schedule`](Self::schedule) and [`poll`](Self::poll), which keeps the
/// type free of threads and makes it deterministic under test.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Configured quiet period.
    #[must_use]
    pub const fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Replace any pending value and restart the quiet period from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        let deadline = now.checked_add(self.quiet).unwrap_or(now);
        self.pending = Some(Pending { value, deadline });
    }

    /// Yield the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if due {
            self.pending.take().map(|pending| pending.value)
        } else {
            None
        }
    }

    /// Drop the pending value without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Fire immediately regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }

    /// True while a value waits for its quiet period.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Borrow the value waiting to fire.
    #[must_use]
    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.value)
    }

    /// Time left before the pending value fires, if any.
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|pending| pending.deadline.saturating_duration_since(now))
    }
}
