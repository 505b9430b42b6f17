//! Completion events.
//!
//! Every enqueued command produces an [`Event`]. Events move forward through
//! `Queued -> Submitted -> Running -> Complete`, or end in `Failed` with the
//! status of the failure. Host code and later commands wait on them.
//!
//! User events are created by the host and completed explicitly, which makes
//! it possible to hold back a chain of commands until some external condition
//! is met.

use crate::context::Context;
use crate::error::{Error, Result, Status};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Execution state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Queued,
    Submitted,
    Running,
    Complete,
    Failed(Status),
}

impl EventStatus {
    /// `Complete` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Complete | EventStatus::Failed(_))
    }
}

#[derive(Debug)]
struct EventInner {
    id: u64,
    context_id: u64,
    command: &'static str,
    user: bool,
    state: Mutex<EventStatus>,
    cond: Condvar,
}

/// Handle to the completion of an enqueued command. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Event {
    inner: Arc<EventInner>,
}

impl Event {
    pub(crate) fn command(context_id: u64, command: &'static str) -> Self {
        Self::with_state(context_id, command, false)
    }

    /// A host-controlled event in `context`, initially `Submitted`.
    pub fn user(context: &Context) -> Self {
        let event = Self::with_state(context.id(), "user", true);
        *event.inner.state.lock() = EventStatus::Submitted;
        event
    }

    fn with_state(context_id: u64, command: &'static str, user: bool) -> Self {
        Self {
            inner: Arc::new(EventInner {
                id: NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed),
                context_id,
                command,
                user,
                state: Mutex::new(EventStatus::Queued),
                cond: Condvar::new(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn context_id(&self) -> u64 {
        self.inner.context_id
    }

    /// Name of the command this event tracks (`"gemm"`, `"marker"`, `"user"`, ...).
    pub fn command_name(&self) -> &'static str {
        self.inner.command
    }

    pub fn is_user(&self) -> bool {
        self.inner.user
    }

    pub fn status(&self) -> EventStatus {
        *self.inner.state.lock()
    }

    pub fn same_event(&self, other: &Event) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Block until the event completes.
    ///
    /// Returns the failure status as an error if the command failed.
    pub fn wait(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        while !state.is_terminal() {
            self.inner.cond.wait(&mut state);
        }
        match *state {
            EventStatus::Failed(status) => Err(Error::from(status)),
            _ => Ok(()),
        }
    }

    /// Wait at most `timeout`. Returns the status observed at return.
    pub fn wait_timeout(&self, timeout: Duration) -> EventStatus {
        let mut state = self.inner.state.lock();
        if !state.is_terminal() {
            let _ = self
                .inner
                .cond
                .wait_while_for(&mut state, |s| !s.is_terminal(), timeout);
        }
        *state
    }

    /// Wait for every event, returning the first failure after all have finished.
    pub fn wait_all(events: &[Event]) -> Result<()> {
        let mut first_err = None;
        for event in events {
            if let Err(err) = event.wait() {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Complete a user event, releasing commands that wait on it.
    pub fn set_complete(&self) -> Result<()> {
        self.set_user_status(EventStatus::Complete)
    }

    /// Fail a user event. Commands waiting on it fail with `InvalidEventWaitList`.
    pub fn set_failed(&self, status: Status) -> Result<()> {
        if status.is_success() {
            return Err(Error::invalid_value(
                "status",
                "a failed event needs a failure status",
            ));
        }
        self.set_user_status(EventStatus::Failed(status))
    }

    fn set_user_status(&self, status: EventStatus) -> Result<()> {
        if !self.inner.user {
            return Err(Error::InvalidOperation(format!(
                "event {} tracks a '{}' command and cannot be set by the host",
                self.inner.id, self.inner.command
            )));
        }
        let mut state = self.inner.state.lock();
        if state.is_terminal() {
            return Err(Error::InvalidOperation(format!(
                "user event {} already finished",
                self.inner.id
            )));
        }
        *state = status;
        self.inner.cond.notify_all();
        Ok(())
    }

    /// Advance a command event. Terminal states are sticky.
    pub(crate) fn transition(&self, status: EventStatus) {
        let mut state = self.inner.state.lock();
        if state.is_terminal() {
            return;
        }
        *state = status;
        if status.is_terminal() {
            self.inner.cond.notify_all();
        }
    }
}
