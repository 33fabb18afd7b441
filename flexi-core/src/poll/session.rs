//! Poll session state machine

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{DisplayStatus, Notification, PollError, PollPolicy};
use crate::domain::execution::ExecutionRecord;
use crate::dto::execution::ExecutionRequest;
use crate::{FunctionId, UserId};

const QUEUED_NOTE: &str = "Function queued for execution...\n";
const STOPPED_BY_USER: &str = "Execution stopped by user.";

/// Result of feeding one poll attempt into a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not live or the result belongs to an older generation
    Discarded,
    /// No record for this execution exists yet
    Pending,
    /// A non-terminal record was applied
    Progress(DisplayStatus),
    /// The fetch failed and will be retried on the next tick
    Retrying { consecutive_errors: u32 },
    /// The session reached a terminal state
    Finished(Notification),
}

impl TickOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Client-side watch over one execution of one function
///
/// Every operation that may race with an in-flight request takes the
/// generation the request was issued under. `begin` and `reset` bump the
/// generation, so results from before either call are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSession {
    function_id: FunctionId,
    user_id: UserId,
    started_at: Option<DateTime<Utc>>,
    status: DisplayStatus,
    output: String,
    error_message: Option<String>,
    elapsed: Duration,
    live: bool,
    generation: u64,
    consecutive_errors: u32,
    ticks_applied: u32,
    previous_records: HashSet<i64>,
}

impl PollSession {
    /// Creates an idle session targeting a function on behalf of a user
    pub fn new(function_id: FunctionId, user_id: UserId) -> Self {
        Self {
            function_id,
            user_id,
            started_at: None,
            status: DisplayStatus::Idle,
            output: String::new(),
            error_message: None,
            elapsed: Duration::ZERO,
            live: false,
            generation: 0,
            consecutive_errors: 0,
            ticks_applied: 0,
            previous_records: HashSet::new(),
        }
    }

    pub fn function_id(&self) -> FunctionId {
        self.function_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn status(&self) -> DisplayStatus {
        self.status
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether ticks are currently being applied
    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of successful fetches applied since `begin`
    pub fn ticks_applied(&self) -> u32 {
        self.ticks_applied
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Whether a result issued under `generation` may still be applied
    pub fn accepts(&self, generation: u64) -> bool {
        self.live && generation == self.generation
    }

    /// Starts a new execution watch
    ///
    /// Resets whatever the session held before, moves to `Queued` and returns
    /// the request the caller must submit. Both identifiers must be positive.
    pub fn begin(
        &mut self,
        input_payload: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<ExecutionRequest, PollError> {
        if self.function_id <= 0 {
            return Err(PollError::InvalidRequest(format!(
                "function id must be positive, got {}",
                self.function_id
            )));
        }
        if self.user_id <= 0 {
            return Err(PollError::InvalidRequest(format!(
                "user id must be positive, got {}",
                self.user_id
            )));
        }

        self.reset();
        self.started_at = Some(now);
        self.status = DisplayStatus::Queued;
        self.output.push_str(QUEUED_NOTE);

        Ok(ExecutionRequest {
            function_id: self.function_id,
            user_id: self.user_id,
            input_payload: input_payload.into(),
        })
    }

    /// Marks records that existed before submission so ticks never mistake
    /// an earlier run for this one
    ///
    /// Only records with an id can be excluded.
    pub fn exclude_previous(&mut self, generation: u64, records: &[ExecutionRecord]) {
        if generation != self.generation || self.status != DisplayStatus::Queued {
            return;
        }
        self.previous_records.extend(
            records
                .iter()
                .filter(|r| r.user_id == Some(self.user_id))
                .filter_map(|r| r.id),
        );
    }

    /// The backend accepted the execution request; ticking may begin
    pub fn submission_accepted(&mut self, generation: u64) -> Option<Notification> {
        if generation != self.generation || self.status != DisplayStatus::Queued {
            return None;
        }

        self.live = true;
        Some(Notification::info(
            "Function execution queued",
            "Execution started. Polling for results...",
        ))
    }

    /// The execution request was rejected or never reached the backend
    pub fn submission_failed(
        &mut self,
        generation: u64,
        reason: impl Into<String>,
    ) -> Option<Notification> {
        if generation != self.generation || self.status != DisplayStatus::Queued {
            return None;
        }

        let reason = reason.into();
        self.live = false;
        self.status = DisplayStatus::Failed;
        self.error_message = Some(reason.clone());

        Some(Notification::destructive("Execution failed", reason))
    }

    /// Applies the records fetched for this session's function
    pub fn apply_tick(&mut self, generation: u64, records: &[ExecutionRecord]) -> TickOutcome {
        if !self.accepts(generation) {
            return TickOutcome::Discarded;
        }

        self.consecutive_errors = 0;
        self.ticks_applied += 1;

        let Some(latest) = self.latest_record(records) else {
            return TickOutcome::Pending;
        };

        self.status = self
            .status
            .advance(DisplayStatus::from_record(latest.status));
        self.output = latest.output.clone().unwrap_or_default();
        self.error_message = latest
            .error_message
            .clone()
            .filter(|message| !message.is_empty());

        if let (Some(recorded_at), Some(started_at)) = (latest.execution_time, self.started_at) {
            // Server and client clocks may disagree; never report negative time
            self.elapsed = (recorded_at - started_at).to_std().unwrap_or(Duration::ZERO);
        }

        match self.status {
            DisplayStatus::Success => {
                self.live = false;
                TickOutcome::Finished(Notification::success(
                    "Execution completed",
                    "Function executed successfully",
                ))
            }
            DisplayStatus::Failed => {
                self.live = false;
                let description = self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Execution failed".to_string());
                TickOutcome::Finished(Notification::destructive("Execution failed", description))
            }
            status => TickOutcome::Progress(status),
        }
    }

    /// Accounts for one failed fetch
    ///
    /// Fails the session once the policy's consecutive error ceiling is hit.
    pub fn record_poll_error(
        &mut self,
        generation: u64,
        error: &str,
        policy: &PollPolicy,
    ) -> TickOutcome {
        if !self.accepts(generation) {
            return TickOutcome::Discarded;
        }

        self.consecutive_errors += 1;

        match policy.max_consecutive_errors {
            Some(max) if max > 0 && self.consecutive_errors >= max => {
                let message = format!(
                    "Polling stopped after {} consecutive errors: {}",
                    self.consecutive_errors, error
                );
                TickOutcome::Finished(self.fail(message))
            }
            _ => TickOutcome::Retrying {
                consecutive_errors: self.consecutive_errors,
            },
        }
    }

    /// The wall-clock ceiling elapsed without a terminal record
    ///
    /// Applies while the submission is still pending as well as while
    /// polling, so a backend that never answers cannot leave the session
    /// queued forever.
    pub fn expire(&mut self, generation: u64, waited: Duration) -> Option<Notification> {
        if generation != self.generation
            || self.status == DisplayStatus::Idle
            || self.status.is_terminal()
        {
            return None;
        }

        Some(self.fail(format!(
            "No result after {}s; stopped polling",
            waited.as_secs()
        )))
    }

    /// Stops watching on the user's behalf
    ///
    /// Purely a client-side change: the remote execution is not aborted.
    /// Returns `None` when there is nothing to cancel.
    pub fn cancel(&mut self) -> Option<Notification> {
        if self.status == DisplayStatus::Idle || self.status.is_terminal() {
            return None;
        }

        self.live = false;
        self.status = DisplayStatus::Failed;
        self.output.push('\n');
        self.output.push_str(STOPPED_BY_USER);
        self.error_message = Some(STOPPED_BY_USER.to_string());

        Some(Notification::info(
            "Execution stopped",
            "Function execution has been stopped.",
        ))
    }

    /// Returns to `Idle`, invalidating anything still in flight
    pub fn reset(&mut self) {
        self.started_at = None;
        self.status = DisplayStatus::Idle;
        self.output.clear();
        self.error_message = None;
        self.elapsed = Duration::ZERO;
        self.live = false;
        self.generation = self.generation.wrapping_add(1);
        self.consecutive_errors = 0;
        self.ticks_applied = 0;
        self.previous_records.clear();
    }

    fn fail(&mut self, message: String) -> Notification {
        self.live = false;
        self.status = DisplayStatus::Failed;
        self.error_message = Some(message.clone());
        Notification::destructive("Execution failed", message)
    }

    /// Newest record owned by this session's user, ignoring earlier runs
    ///
    /// Records without a timestamp sort last; ties keep fetch order.
    fn latest_record<'a>(&self, records: &'a [ExecutionRecord]) -> Option<&'a ExecutionRecord> {
        let mut candidates: Vec<&ExecutionRecord> = records
            .iter()
            .filter(|r| r.user_id == Some(self.user_id))
            .filter(|r| r.id.is_none_or(|id| !self.previous_records.contains(&id)))
            .collect();

        candidates.sort_by(|a, b| b.execution_time.cmp(&a.execution_time));
        candidates.into_iter().next()
    }
}
