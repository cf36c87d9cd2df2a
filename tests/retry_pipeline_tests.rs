//! Integration tests for the error pipeline end-to-end.
//!
//! Covers classification, status dispatch, the automatic retry loop with its
//! backoff schedule, and the generation guard that keeps a stale cleanup from
//! wiping a newer retry sequence. Timing tests run on tokio's paused clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use folioweb::error::{ErrorKind, Failure};
use folioweb::handler::{ErrorHandler, RetryContext, RetryFn};
use folioweb::nav::{Navigator, Route};
use folioweb::notify::{Notice, Notifier, Severity};
use folioweb::retry::RetryLedger;

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

impl RecordingNavigator {
    fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

fn pipeline() -> (ErrorHandler, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let handler = ErrorHandler::new(RetryLedger::new(), notifier.clone(), navigator.clone());
    (handler, notifier, navigator)
}

/// Retry callback that records when it fires, on the tokio clock.
fn recording_retry_fn(fired: Arc<Mutex<Vec<tokio::time::Instant>>>) -> RetryFn {
    Arc::new(move || {
        let fired = fired.clone();
        Box::pin(async move {
            fired.lock().unwrap().push(tokio::time::Instant::now());
        })
    })
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_classification_covers_every_status() {
    assert_eq!(ErrorKind::classify(&Failure::status(404)), ErrorKind::NotFound);
    assert_eq!(ErrorKind::classify(&Failure::status(403)), ErrorKind::Forbidden);
    assert_eq!(
        ErrorKind::classify(&Failure::status(401)),
        ErrorKind::Unauthorized
    );
    for status in [500, 502, 503] {
        assert_eq!(
            ErrorKind::classify(&Failure::status(status)),
            ErrorKind::ServerError
        );
    }
    assert_eq!(ErrorKind::classify(&Failure::status(408)), ErrorKind::Timeout);
    assert_eq!(
        ErrorKind::classify(&Failure::network("connection refused")),
        ErrorKind::NetworkError
    );
    // Anything unrecognized must land somewhere deterministic.
    for status in [400, 418, 429, 501, 504] {
        assert_eq!(
            ErrorKind::classify(&Failure::status(status)),
            ErrorKind::Generic
        );
    }
}

// ============================================================================
// Status dispatch
// ============================================================================

#[tokio::test]
async fn test_404_navigates_without_notice() {
    let (handler, notifier, navigator) = pipeline();

    handler.handle(&Failure::status(404), RetryContext::new());

    assert_eq!(navigator.routes(), vec![Route::NotFound]);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_500_notice_carries_server_message() {
    let (handler, notifier, _navigator) = pipeline();

    handler.handle(
        &Failure::status_with_message(500, "Database connection lost"),
        RetryContext::new(),
    );

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert_eq!(notices[0].title, "Server Error");
    assert_eq!(notices[0].content, "Database connection lost");
    assert_eq!(notices[0].duration, Duration::from_millis(8000));
    assert!(notices[0].closable);
}

#[tokio::test]
async fn test_401_warns_about_authentication() {
    let (handler, notifier, navigator) = pipeline();

    handler.handle(&Failure::status(401), RetryContext::new());

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Warning);
    assert_eq!(notices[0].title, "Authentication Required");
    assert_eq!(notices[0].duration, Duration::from_millis(5000));
    assert!(navigator.routes().is_empty());
}

#[tokio::test]
async fn test_timeout_with_retry_fn_enters_retry_loop() {
    let (handler, notifier, _navigator) = pipeline();
    let fired = Arc::new(Mutex::new(Vec::new()));

    handler.handle(
        &Failure::status(408),
        RetryContext::new()
            .with_retry_fn(recording_retry_fn(fired))
            .with_retry_key("profile"),
    );

    assert_eq!(handler.ledger().attempts("profile"), 1);
    assert!(notifier.notices().is_empty());
}

// ============================================================================
// Automatic retry loop
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_retry_cap_yields_three_retries_then_final_notice() {
    let (handler, notifier, _navigator) = pipeline();
    let fired = Arc::new(Mutex::new(Vec::new()));
    let retry_fn = recording_retry_fn(fired.clone());
    let failure = Failure::network("connection refused");

    for _ in 0..4 {
        handler.handle(
            &failure,
            RetryContext::new()
                .with_retry_fn(retry_fn.clone())
                .with_retry_key("portfolio"),
        );
    }

    // Fourth failure exhausts the budget: final notice, counter removed.
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert_eq!(notices[0].title, "Network Error");
    assert_eq!(
        notices[0].content,
        "Unable to connect to the server after 3 attempts. \
         Please check your internet connection and refresh the page."
    );
    assert_eq!(notices[0].duration, Duration::from_millis(10_000));
    assert!(notices[0].closable);
    assert_eq!(handler.ledger().attempts("portfolio"), 0);

    // All three scheduled retries fire, and no fourth appears.
    tokio::time::sleep(Duration::from_millis(20_000)).await;
    assert_eq!(fired.lock().unwrap().len(), 3);
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_is_immediate_then_2s_then_5s() {
    let (handler, notifier, _navigator) = pipeline();
    let fired = Arc::new(Mutex::new(Vec::new()));
    let retry_fn = recording_retry_fn(fired.clone());
    let failure = Failure::network("connection refused");

    let mut called_at = Vec::new();
    // Failures spaced so each lands before the previous sequence's cleanup.
    for pause_ms in [100u64, 2100] {
        called_at.push(tokio::time::Instant::now());
        handler.handle(
            &failure,
            RetryContext::new()
                .with_retry_fn(retry_fn.clone())
                .with_retry_key("portfolio"),
        );
        tokio::time::sleep(Duration::from_millis(pause_ms)).await;
    }
    called_at.push(tokio::time::Instant::now());
    handler.handle(
        &failure,
        RetryContext::new()
            .with_retry_fn(retry_fn.clone())
            .with_retry_key("portfolio"),
    );
    tokio::time::sleep(Duration::from_millis(11_000)).await;

    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 3);
    let delays: Vec<Duration> = fired
        .iter()
        .zip(&called_at)
        .map(|(fired_at, called_at)| *fired_at - *called_at)
        .collect();
    assert_eq!(
        delays,
        vec![
            Duration::ZERO,
            Duration::from_millis(2000),
            Duration::from_millis(5000),
        ]
    );
    assert!(notifier.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stale_cleanup_is_a_no_op_for_newer_sequences() {
    let (handler, _notifier, _navigator) = pipeline();
    let fired = Arc::new(Mutex::new(Vec::new()));
    let retry_fn = recording_retry_fn(fired);
    let failure = Failure::network("connection refused");

    // First failure schedules cleanup at t=5000 (retry fires immediately).
    handler.handle(
        &failure,
        RetryContext::new()
            .with_retry_fn(retry_fn.clone())
            .with_retry_key("portfolio"),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Second failure bumps the key; the first cleanup is now stale.
    handler.handle(
        &failure,
        RetryContext::new()
            .with_retry_fn(retry_fn.clone())
            .with_retry_key("portfolio"),
    );
    assert_eq!(handler.ledger().attempts("portfolio"), 2);

    // Past the first cleanup: the count must survive.
    tokio::time::sleep(Duration::from_millis(5900)).await;
    assert_eq!(handler.ledger().attempts("portfolio"), 2);

    // Past the second sequence's own cleanup: the count is released.
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(handler.ledger().attempts("portfolio"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_independent_keys_do_not_share_budgets() {
    let (handler, notifier, _navigator) = pipeline();
    let fired = Arc::new(Mutex::new(Vec::new()));
    let retry_fn = recording_retry_fn(fired);
    let failure = Failure::network("connection refused");

    for key in ["profile", "projects", "themes"] {
        for _ in 0..3 {
            handler.handle(
                &failure,
                RetryContext::new()
                    .with_retry_fn(retry_fn.clone())
                    .with_retry_key(key),
            );
        }
    }

    // Three exhaustable budgets, none exhausted.
    assert!(notifier.notices().is_empty());
    assert_eq!(handler.ledger().attempts("profile"), 3);
    assert_eq!(handler.ledger().attempts("projects"), 3);
    assert_eq!(handler.ledger().attempts("themes"), 3);
}
