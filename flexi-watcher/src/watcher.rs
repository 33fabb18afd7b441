//! Execution watcher
//!
//! Submits an execution and polls its status on a fixed interval until a
//! terminal record shows up, the user cancels, or the policy gives up.
//! Each watch runs in its own task, which exclusively owns the session and
//! publishes snapshots over a watch channel.
//!
//! Ticks are strictly serial: the next interval is only awaited after the
//! previous fetch has resolved, so a session never has two status requests
//! in flight.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use flexi_core::dto::execution::ExecutionRequest;
use flexi_core::poll::{Notification, PollError, PollPolicy, PollSession, TickOutcome};
use flexi_core::{FunctionId, UserId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::ExecutionBackend;
use crate::notifier::Notifier;

/// Starts execution watches against a backend
#[derive(Clone)]
pub struct ExecutionWatcher {
    backend: Arc<dyn ExecutionBackend>,
    notifier: Arc<dyn Notifier>,
    policy: PollPolicy,
}

impl ExecutionWatcher {
    /// Creates a new watcher
    pub fn new(
        backend: Arc<dyn ExecutionBackend>,
        notifier: Arc<dyn Notifier>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            backend,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Starts watching a new execution
    ///
    /// Returns as soon as the watch task is spawned; submission happens in
    /// the background. Fails without spawning anything if the identifiers
    /// are invalid. Must be called from within a tokio runtime.
    pub fn start(
        &self,
        function_id: FunctionId,
        input_payload: impl Into<String>,
        user_id: UserId,
    ) -> Result<WatchHandle, PollError> {
        let mut session = PollSession::new(function_id, user_id);
        let request = session.begin(input_payload, Utc::now())?;

        let (state, receiver) = watch::channel(session.clone());
        let cancel = CancellationToken::new();

        let task = SessionTask {
            generation: session.generation(),
            session,
            request,
            backend: Arc::clone(&self.backend),
            notifier: Arc::clone(&self.notifier),
            policy: self.policy,
            state,
            cancel: cancel.clone(),
        };

        info!(
            "Starting watch of function {} for user {} (interval: {:?})",
            function_id, user_id, self.policy.interval
        );

        Ok(WatchHandle {
            cancel,
            state: receiver,
            task: Some(tokio::spawn(task.run())),
        })
    }
}

/// Owner's handle on a running watch
///
/// Dropping the handle tears the watch down: the task is aborted and no
/// further state is published or notified.
pub struct WatchHandle {
    cancel: CancellationToken,
    state: watch::Receiver<PollSession>,
    task: Option<JoinHandle<PollSession>>,
}

impl WatchHandle {
    /// Requests user cancellation
    ///
    /// Returns immediately. The task stops at its next await point, discards
    /// any in-flight response and marks the session failed. The remote
    /// execution is not aborted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Latest published state of the session
    pub fn snapshot(&self) -> PollSession {
        self.state.borrow().clone()
    }

    /// A receiver that is woken on every state change
    pub fn subscribe(&self) -> watch::Receiver<PollSession> {
        self.state.clone()
    }

    /// Whether the watch task has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Waits for the watch to end and returns the final session
    pub async fn join(mut self) -> PollSession {
        let Some(task) = self.task.take() else {
            return self.snapshot();
        };

        match task.await {
            Ok(session) => session,
            Err(e) => {
                warn!("Watch task ended abnormally: {}", e);
                self.snapshot()
            }
        }
    }

    /// Cancels and waits for the final session
    pub async fn stop(self) -> PollSession {
        self.cancel();
        self.join().await
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Why a watch stopped before reaching a terminal record
enum Interrupt {
    Cancelled,
    Expired,
}

/// State owned by one watch task
struct SessionTask {
    session: PollSession,
    generation: u64,
    request: ExecutionRequest,
    backend: Arc<dyn ExecutionBackend>,
    notifier: Arc<dyn Notifier>,
    policy: PollPolicy,
    state: watch::Sender<PollSession>,
    cancel: CancellationToken,
}

impl SessionTask {
    async fn run(mut self) -> PollSession {
        match self.drive().await {
            Ok(()) => {}
            Err(Interrupt::Cancelled) => {
                info!(
                    "Watch of function {} stopped by user",
                    self.session.function_id()
                );
                if let Some(notification) = self.session.cancel() {
                    self.notify(&notification);
                }
            }
            Err(Interrupt::Expired) => {
                let waited = self.policy.timeout.unwrap_or_default();
                warn!(
                    "No terminal record for function {} after {:?}",
                    self.session.function_id(),
                    waited
                );
                if let Some(notification) = self.session.expire(self.generation, waited) {
                    self.notify(&notification);
                }
            }
        }

        self.publish();
        self.session
    }

    async fn drive(&mut self) -> Result<(), Interrupt> {
        let function_id = self.session.function_id();
        let deadline = self.policy.timeout.map(|timeout| Instant::now() + timeout);

        // Records that already exist belong to earlier runs. The lookup is
        // best-effort: it gets one interval, then submission goes ahead
        // without exclusions.
        let lookup = time::timeout(
            self.policy.interval,
            self.backend.function_records(function_id),
        );
        match self.interruptible(deadline, lookup).await? {
            Ok(Ok(records)) => self.session.exclude_previous(self.generation, &records),
            Ok(Err(e)) => warn!(
                "Could not read existing logs of function {}: {}",
                function_id, e
            ),
            Err(_) => warn!(
                "Existing logs of function {} not read within {:?}; earlier runs are not excluded",
                function_id, self.policy.interval
            ),
        }

        let submitted = self
            .interruptible(deadline, self.backend.submit(&self.request))
            .await?;

        if let Err(e) = submitted {
            warn!("Submission of function {} failed: {}", function_id, e);
            if let Some(notification) = self
                .session
                .submission_failed(self.generation, e.user_message())
            {
                self.notify(&notification);
            }
            return Ok(());
        }

        if let Some(notification) = self.session.submission_accepted(self.generation) {
            self.notify(&notification);
        }
        self.publish();

        let mut ticker = time::interval_at(
            Instant::now() + self.policy.interval,
            self.policy.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.interruptible(deadline, ticker.tick()).await?;

            debug!("Polling execution logs of function {}", function_id);

            let fetched = self
                .interruptible(deadline, self.backend.function_records(function_id))
                .await?;

            let outcome = match fetched {
                Ok(records) => self.session.apply_tick(self.generation, &records),
                Err(e) => {
                    warn!("Poll of function {} failed: {}", function_id, e);
                    self.session
                        .record_poll_error(self.generation, &e.to_string(), &self.policy)
                }
            };

            match outcome {
                TickOutcome::Finished(notification) => {
                    info!(
                        "Execution of function {} finished: {}",
                        function_id,
                        self.session.status()
                    );
                    self.notify(&notification);
                    return Ok(());
                }
                TickOutcome::Discarded => return Ok(()),
                TickOutcome::Pending
                | TickOutcome::Progress(_)
                | TickOutcome::Retrying { .. } => self.publish(),
            }
        }
    }

    /// Runs `fut` unless cancellation or the deadline comes first
    ///
    /// Cancellation wins ties, so a response that arrives together with a
    /// cancel request is dropped.
    async fn interruptible<F: Future>(
        &self,
        deadline: Option<Instant>,
        fut: F,
    ) -> Result<F::Output, Interrupt> {
        let expiry = async move {
            match deadline {
                Some(at) => time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupt::Cancelled),
            _ = expiry => Err(Interrupt::Expired),
            output = fut => Ok(output),
        }
    }

    fn publish(&self) {
        self.state.send_replace(self.session.clone());
    }

    fn notify(&self, notification: &Notification) {
        self.notifier.notify(notification);
    }
}
