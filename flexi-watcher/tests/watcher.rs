use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flexi_client::{ClientError, Result};
use flexi_core::FunctionId;
use flexi_core::domain::execution::{ExecutionRecord, RecordStatus};
use flexi_core::dto::execution::ExecutionRequest;
use flexi_core::poll::{DisplayStatus, Notification, NotificationKind, PollPolicy};
use flexi_watcher::{ExecutionBackend, ExecutionView, ExecutionWatcher, Notifier};

const FUNCTION: FunctionId = 42;
const USER: i64 = 7;

/// One scripted answer to a status poll
enum Step {
    Records(Vec<ExecutionRecord>),
    Fail,
}

/// Backend whose answers are scripted up front
#[derive(Default)]
struct ScriptedBackend {
    existing: Vec<ExecutionRecord>,
    reject_with: Option<String>,
    steps: Mutex<VecDeque<Step>>,
    poll_delay: Duration,
    records_hang: bool,
    lookup_fails: bool,
    submit_hangs: bool,
    submissions: AtomicUsize,
    lookups: AtomicUsize,
    polls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn submit(&self, request: &ExecutionRequest) -> Result<()> {
        assert_eq!(request.function_id, FUNCTION);
        assert_eq!(request.user_id, USER);
        if self.submit_hangs {
            return std::future::pending().await;
        }
        self.submissions.fetch_add(1, Ordering::SeqCst);

        match &self.reject_with {
            Some(message) => Err(ClientError::api_error(500, message.clone())),
            None => Ok(()),
        }
    }

    async fn function_records(&self, function_id: FunctionId) -> Result<Vec<ExecutionRecord>> {
        assert_eq!(function_id, FUNCTION);

        // The lookup made before submission is not a poll
        if self.submissions.load(Ordering::SeqCst) == 0 {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.records_hang {
                return std::future::pending().await;
            }
            if self.lookup_fails {
                return Err(ClientError::api_error(503, "backend restarting"));
            }
            return Ok(self.existing.clone());
        }

        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.records_hang {
            return std::future::pending().await;
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }

        let step = self.steps.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step {
            Some(Step::Records(records)) => Ok(records),
            Some(Step::Fail) => Err(ClientError::api_error(503, "backend restarting")),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().unwrap().push(notification.clone());
    }
}

fn record(id: i64, status: RecordStatus, at: DateTime<Utc>) -> ExecutionRecord {
    ExecutionRecord {
        id: Some(id),
        function_id: Some(FUNCTION),
        user_id: Some(USER),
        input_payload: Some("{}".to_string()),
        status: Some(status),
        output: None,
        error_message: None,
        execution_time: Some(at),
    }
}

fn policy() -> PollPolicy {
    PollPolicy::default()
}

fn watcher(
    backend: &Arc<ScriptedBackend>,
    notifier: &Arc<RecordingNotifier>,
    policy: PollPolicy,
) -> ExecutionWatcher {
    ExecutionWatcher::new(backend.clone(), notifier.clone(), policy)
}

#[tokio::test(start_paused = true)]
async fn test_watch_runs_to_success() {
    let now = Utc::now();
    let finished_at = now + chrono::Duration::seconds(3);
    let mut done = record(1, RecordStatus::Success, finished_at);
    done.output = Some("42".to_string());

    let backend = Arc::new(ScriptedBackend::with_steps(vec![
        Step::Records(vec![]),
        Step::Records(vec![record(1, RecordStatus::Running, now)]),
        Step::Records(vec![done]),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());

    let handle = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap();
    assert_eq!(handle.snapshot().status(), DisplayStatus::Queued);

    let session = handle.join().await;

    assert_eq!(session.status(), DisplayStatus::Success);
    assert_eq!(session.output(), "42");
    assert!(!session.is_live());
    assert_eq!(session.ticks_applied(), 3);
    assert_eq!(
        session.elapsed(),
        (finished_at - session.started_at().unwrap())
            .to_std()
            .unwrap()
    );

    let seen = notifier.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, NotificationKind::Info);
    assert_eq!(seen[1].kind, NotificationKind::Success);

    // Polling stopped with the terminal record
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.polls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_status_progresses_in_order() {
    let now = Utc::now();
    let backend = Arc::new(ScriptedBackend::with_steps(vec![
        Step::Records(vec![]),
        Step::Records(vec![record(1, RecordStatus::Queued, now)]),
        Step::Records(vec![record(1, RecordStatus::Running, now)]),
        Step::Records(vec![record(1, RecordStatus::Failed, now)]),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());

    let handle = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap();
    let mut updates = handle.subscribe();

    let mut observed = vec![updates.borrow_and_update().status()];
    while updates.changed().await.is_ok() {
        let status = updates.borrow_and_update().status();
        if observed.last() != Some(&status) {
            observed.push(status);
        }
        if status.is_terminal() {
            break;
        }
    }

    assert!(observed.windows(2).all(|w| w[0].rank() <= w[1].rank()));
    assert_eq!(observed.first(), Some(&DisplayStatus::Queued));
    assert_eq!(observed.last(), Some(&DisplayStatus::Failed));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submission_never_ticks() {
    let backend = Arc::new(ScriptedBackend {
        reject_with: Some("Queue unavailable".to_string()),
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let handle = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap();
    let session = handle.join().await;

    assert_eq!(session.status(), DisplayStatus::Failed);
    assert_eq!(session.error_message(), Some("Queue unavailable"));
    assert_eq!(session.ticks_applied(), 0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.polls(), 0);

    let seen = notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, NotificationKind::Destructive);
    assert_eq!(seen[0].description, "Queue unavailable");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_running_ticks() {
    let now = Utc::now();
    let backend = Arc::new(ScriptedBackend::with_steps(vec![
        Step::Records(vec![record(1, RecordStatus::Running, now)]),
        Step::Records(vec![record(1, RecordStatus::Running, now)]),
        Step::Records(vec![record(1, RecordStatus::Success, now)]),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());

    let handle = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap();
    let mut updates = handle.subscribe();
    updates
        .wait_for(|session| session.ticks_applied() == 2)
        .await
        .unwrap();

    let session = handle.stop().await;

    assert_eq!(session.status(), DisplayStatus::Failed);
    assert_eq!(session.error_message(), Some("Execution stopped by user."));
    assert!(session.output().ends_with("Execution stopped by user."));
    assert_eq!(session.ticks_applied(), 2);

    let titles: Vec<String> = notifier.seen().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Function execution queued", "Execution stopped"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_discards_in_flight_response() {
    let now = Utc::now();
    let backend = Arc::new(ScriptedBackend {
        steps: Mutex::new(
            vec![
                Step::Records(vec![record(1, RecordStatus::Running, now)]),
                Step::Records(vec![record(1, RecordStatus::Running, now)]),
                Step::Records(vec![record(1, RecordStatus::Success, now)]),
            ]
            .into(),
        ),
        poll_delay: Duration::from_secs(1),
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let handle = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap();
    let mut updates = handle.subscribe();
    updates
        .wait_for(|session| session.ticks_applied() == 2)
        .await
        .unwrap();

    // Third poll fires 0.5s later and takes 1s to answer
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(backend.polls(), 3);

    let session = handle.stop().await;
    assert_eq!(session.status(), DisplayStatus::Failed);
    assert_eq!(session.ticks_applied(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_polls_never_overlap() {
    let backend = Arc::new(ScriptedBackend {
        poll_delay: Duration::from_secs(2),
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = policy().with_interval(Duration::from_millis(500));

    let handle = watcher(&backend, &notifier, policy)
        .start(FUNCTION, "{}", USER)
        .unwrap();

    tokio::time::sleep(Duration::from_secs(20)).await;
    let polls = backend.polls();
    handle.stop().await;

    assert!(polls >= 5);
    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_errors_are_retried() {
    let now = Utc::now();
    let backend = Arc::new(ScriptedBackend::with_steps(vec![
        Step::Fail,
        Step::Fail,
        Step::Records(vec![record(1, RecordStatus::Success, now)]),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());

    let session = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap()
        .join()
        .await;

    assert_eq!(session.status(), DisplayStatus::Success);
    assert!(
        notifier
            .seen()
            .iter()
            .all(|n| n.kind != NotificationKind::Destructive)
    );
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_consecutive_errors() {
    let backend = Arc::new(ScriptedBackend::with_steps(
        (0..10).map(|_| Step::Fail).collect(),
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = policy().with_max_consecutive_errors(Some(3));

    let session = watcher(&backend, &notifier, policy)
        .start(FUNCTION, "{}", USER)
        .unwrap()
        .join()
        .await;

    assert_eq!(session.status(), DisplayStatus::Failed);
    assert!(
        session
            .error_message()
            .unwrap()
            .starts_with("Polling stopped after 3 consecutive errors")
    );
    assert_eq!(backend.polls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_times_out_without_terminal_record() {
    let backend = Arc::new(ScriptedBackend::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = policy()
        .with_interval(Duration::from_secs(1))
        .with_timeout(Some(Duration::from_secs(5)));

    let session = watcher(&backend, &notifier, policy)
        .start(FUNCTION, "{}", USER)
        .unwrap()
        .join()
        .await;

    assert_eq!(session.status(), DisplayStatus::Failed);
    assert_eq!(
        session.error_message(),
        Some("No result after 5s; stopped polling")
    );
    assert!(backend.polls() <= 5);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_lookup_does_not_block_submission() {
    let backend = Arc::new(ScriptedBackend {
        records_hang: true,
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = policy()
        .with_interval(Duration::from_secs(1))
        .with_timeout(Some(Duration::from_secs(5)));

    let handle = watcher(&backend, &notifier, policy)
        .start(FUNCTION, "{}", USER)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(backend.submissions(), 1);
    assert!(handle.snapshot().is_live());

    let session = handle.join().await;
    assert_eq!(session.status(), DisplayStatus::Failed);
    assert_eq!(
        session.error_message(),
        Some("No result after 5s; stopped polling")
    );
    assert_eq!(backend.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(backend.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_still_submits() {
    let now = Utc::now();
    let backend = Arc::new(ScriptedBackend {
        lookup_fails: true,
        ..ScriptedBackend::with_steps(vec![Step::Records(vec![record(
            1,
            RecordStatus::Success,
            now,
        )])])
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let session = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap()
        .join()
        .await;

    assert_eq!(session.status(), DisplayStatus::Success);
    assert_eq!(backend.submissions(), 1);
    assert_eq!(session.ticks_applied(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_submission_times_out() {
    let backend = Arc::new(ScriptedBackend {
        submit_hangs: true,
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = policy().with_timeout(Some(Duration::from_secs(5)));

    let session = watcher(&backend, &notifier, policy)
        .start(FUNCTION, "{}", USER)
        .unwrap()
        .join()
        .await;

    assert_eq!(session.status(), DisplayStatus::Failed);
    assert_eq!(
        session.error_message(),
        Some("No result after 5s; stopped polling")
    );
    assert_eq!(backend.polls(), 0);

    let seen = notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, NotificationKind::Destructive);
}

#[tokio::test(start_paused = true)]
async fn test_earlier_runs_are_not_mistaken_for_this_one() {
    let now = Utc::now();
    let mut earlier = record(1, RecordStatus::Success, now - chrono::Duration::minutes(5));
    earlier.output = Some("stale".to_string());
    let mut current = record(2, RecordStatus::Success, now);
    current.output = Some("fresh".to_string());

    let backend = Arc::new(ScriptedBackend {
        existing: vec![earlier.clone()],
        steps: Mutex::new(
            vec![
                Step::Records(vec![earlier.clone()]),
                Step::Records(vec![earlier, current]),
            ]
            .into(),
        ),
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let session = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap()
        .join()
        .await;

    assert_eq!(session.output(), "fresh");
    assert_eq!(session.ticks_applied(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_tears_down() {
    let backend = Arc::new(ScriptedBackend::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let handle = watcher(&backend, &notifier, policy())
        .start(FUNCTION, "{}", USER)
        .unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    drop(handle);

    let polls = backend.polls();
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(backend.polls(), polls);
    assert!(notifier.seen().iter().all(|n| n.title != "Execution stopped"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_ids_spawn_nothing() {
    let backend = Arc::new(ScriptedBackend::default());
    let notifier = Arc::new(RecordingNotifier::default());

    assert!(
        watcher(&backend, &notifier, policy())
            .start(FUNCTION, "{}", 0)
            .is_err()
    );
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(backend.submissions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_view_keeps_one_session() {
    let backend = Arc::new(ScriptedBackend::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut view = ExecutionView::new(watcher(&backend, &notifier, policy()), FUNCTION, USER);

    assert_eq!(view.session().status(), DisplayStatus::Idle);

    let first = view.execute("1").unwrap().subscribe();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(first.borrow().is_live());

    view.execute("2").unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // The first watch was torn down, not cancelled
    assert!(first.has_changed().is_err());
    assert!(first.borrow().is_live());
    assert_eq!(backend.submissions(), 2);

    view.cancel();
    let session = view.take().unwrap().join().await;
    assert_eq!(session.status(), DisplayStatus::Failed);

    view.execute("3").unwrap();
    view.reset();
    assert_eq!(view.session().status(), DisplayStatus::Idle);
    view.close();
}
