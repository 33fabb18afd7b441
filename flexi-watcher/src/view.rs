//! Single-session execution view

use flexi_core::poll::{PollError, PollSession};
use flexi_core::{FunctionId, UserId};

use crate::watcher::{ExecutionWatcher, WatchHandle};

/// An open execution screen for one function
///
/// Holds at most one active watch. Starting a new execution, resetting or
/// closing the view tears the previous watch down.
pub struct ExecutionView {
    watcher: ExecutionWatcher,
    function_id: FunctionId,
    user_id: UserId,
    active: Option<WatchHandle>,
}

impl ExecutionView {
    pub fn new(watcher: ExecutionWatcher, function_id: FunctionId, user_id: UserId) -> Self {
        Self {
            watcher,
            function_id,
            user_id,
            active: None,
        }
    }

    /// Starts a new execution, replacing any previous watch
    ///
    /// On invalid identifiers the previous watch is left untouched.
    pub fn execute(&mut self, input_payload: impl Into<String>) -> Result<&WatchHandle, PollError> {
        let handle = self
            .watcher
            .start(self.function_id, input_payload, self.user_id)?;

        Ok(&*self.active.insert(handle))
    }

    /// Requests cancellation of the active watch, if any
    pub fn cancel(&self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
    }

    /// Drops the active watch and returns to idle
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Current session, idle when nothing has been executed
    pub fn session(&self) -> PollSession {
        match &self.active {
            Some(handle) => handle.snapshot(),
            None => PollSession::new(self.function_id, self.user_id),
        }
    }

    pub fn active(&self) -> Option<&WatchHandle> {
        self.active.as_ref()
    }

    /// Hands the active watch to the caller, leaving the view idle
    pub fn take(&mut self) -> Option<WatchHandle> {
        self.active.take()
    }

    /// Closes the view, tearing down the active watch
    pub fn close(self) {}
}
