//! The central error handler.
//!
//! Every runtime fetch failure in the application funnels through
//! [`ErrorHandler::handle`]: the failure is classified, then either resolved
//! immediately (redirect or notice) or pushed into the automatic-retry loop.
//! The handler absorbs failures completely: it never returns an error, and
//! callers communicate with the user exclusively through the injected
//! notifier and navigator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{ErrorKind, Failure};
use crate::nav::{Navigator, Route};
use crate::notify::{Notice, Notifier};
use crate::retry::{RetryLedger, RetryPolicy};

/// A retry callback: re-runs the operation that failed.
pub type RetryFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

const SERVER_ERROR_FALLBACK: &str =
    "Something went wrong on our end. Please try again later.";
const GENERIC_FALLBACK: &str = "An unexpected error occurred. Please try again.";
const AUTH_REQUIRED_MESSAGE: &str = "Please sign in to access this resource.";
const TIMEOUT_ONCE_MESSAGE: &str = "The request took too long to complete. Please try again.";
const NETWORK_ONCE_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection.";
const TIMEOUT_RETRY_MESSAGE: &str =
    "The request took too long to complete after 3 attempts. Please check your connection and try again.";
const NETWORK_RETRY_MESSAGE: &str =
    "Unable to connect to the server after 3 attempts. Please check your internet connection and refresh the page.";

/// Per-failure context passed from a loader to the handler.
///
/// Ephemeral: built for one [`ErrorHandler::handle`] call and dropped. The
/// retry function, when present, turns timeout and network failures into
/// automatic retries instead of immediate notices.
#[derive(Clone, Default)]
pub struct RetryContext {
    /// Callback that re-runs the failed operation.
    pub retry_fn: Option<RetryFn>,
    /// Key identifying the logical retry sequence. When absent the handler
    /// generates a unique one, so unrelated failures never share a counter.
    pub retry_key: Option<String>,
    /// Title override for the final-failure notice.
    pub title: Option<String>,
    /// Message override for the final-failure notice.
    pub message: Option<String>,
}

impl RetryContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry callback.
    pub fn with_retry_fn(mut self, retry_fn: RetryFn) -> Self {
        self.retry_fn = Some(retry_fn);
        self
    }

    /// Sets the retry key.
    pub fn with_retry_key(mut self, key: impl Into<String>) -> Self {
        self.retry_key = Some(key.into());
        self
    }

    /// Sets the final-failure notice title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the final-failure notice message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl std::fmt::Debug for RetryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryContext")
            .field("retry_fn", &self.retry_fn.as_ref().map(|_| "<fn>"))
            .field("retry_key", &self.retry_key)
            .field("title", &self.title)
            .field("message", &self.message)
            .finish()
    }
}

/// Orchestrates classification, retry bookkeeping, notices, and redirects.
///
/// Cheap to clone; clones share the ledger and collaborators. Dispatch is
/// synchronous; only the scheduled retry and its cleanup run later, on the
/// tokio runtime.
#[derive(Clone)]
pub struct ErrorHandler {
    ledger: RetryLedger,
    policy: RetryPolicy,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    key_seq: Arc<AtomicU64>,
}

impl ErrorHandler {
    /// Creates a handler with the default retry policy.
    pub fn new(
        ledger: RetryLedger,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            ledger,
            policy: RetryPolicy::default(),
            notifier,
            navigator,
            key_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the ledger shared by this handler.
    pub fn ledger(&self) -> &RetryLedger {
        &self.ledger
    }

    /// Processes one failure end-to-end.
    ///
    /// Retryable kinds (timeout, network) enter the automatic-retry loop
    /// when the context carries a retry function; every other kind resolves
    /// with a single redirect or notice. Requires a tokio runtime when a
    /// retry is scheduled.
    pub fn handle(&self, failure: &Failure, context: RetryContext) {
        let kind = ErrorKind::classify(failure);
        tracing::error!(kind = %kind, failure = %failure, "fetch failed");

        match kind {
            ErrorKind::NotFound => self.navigator.go_to(Route::NotFound),
            ErrorKind::Forbidden => self.navigator.go_to(Route::Forbidden),
            ErrorKind::Unauthorized => self.notifier.notify(
                Notice::warning("Authentication Required", AUTH_REQUIRED_MESSAGE)
                    .with_duration(Duration::from_millis(5000)),
            ),
            ErrorKind::ServerError => self.notifier.notify(
                Notice::error("Server Error", failure.message_or(SERVER_ERROR_FALLBACK))
                    .with_duration(Duration::from_millis(8000))
                    .closable(),
            ),
            ErrorKind::Timeout => match context.retry_fn.clone() {
                Some(retry_fn) => self.auto_retry(
                    retry_fn,
                    self.resolve_key(&context),
                    context.title.as_deref().unwrap_or("Request Timeout"),
                    context.message.as_deref().unwrap_or(TIMEOUT_RETRY_MESSAGE),
                ),
                None => self.notifier.notify(
                    Notice::warning("Request Timeout", TIMEOUT_ONCE_MESSAGE)
                        .with_duration(Duration::from_millis(6000))
                        .closable(),
                ),
            },
            ErrorKind::NetworkError => match context.retry_fn.clone() {
                Some(retry_fn) => self.auto_retry(
                    retry_fn,
                    self.resolve_key(&context),
                    context.title.as_deref().unwrap_or("Network Error"),
                    context.message.as_deref().unwrap_or(NETWORK_RETRY_MESSAGE),
                ),
                None => self.notifier.notify(
                    Notice::error("Network Error", NETWORK_ONCE_MESSAGE)
                        .with_duration(Duration::from_millis(8000))
                        .closable(),
                ),
            },
            ErrorKind::Generic => self.notifier.notify(
                Notice::error("Error", failure.message_or(GENERIC_FALLBACK))
                    .with_duration(Duration::from_millis(6000))
                    .closable(),
            ),
        }
    }

    /// Emits a success notice through the configured notifier.
    pub fn show_success(&self, title: impl Into<String>, content: impl Into<String>) {
        self.notifier.notify(Notice::success(title, content));
    }

    /// Emits an info notice through the configured notifier.
    pub fn show_info(&self, title: impl Into<String>, content: impl Into<String>) {
        self.notifier.notify(Notice::info(title, content));
    }

    /// Decides whether to schedule another attempt under `key` or give up.
    ///
    /// The ledger is bumped synchronously, before the delayed retry fires,
    /// so interleaved failures under the same key observe the updated count
    /// immediately. The cleanup that follows a fired retry only clears the
    /// entry if no newer sequence has bumped the key since.
    fn auto_retry(&self, retry_fn: RetryFn, key: String, title: &str, message: &str) {
        let attempts = self.ledger.attempts(&key);

        if !self.policy.allows_retry(attempts) {
            self.notifier.notify(
                Notice::error(title, message)
                    .with_duration(Duration::from_millis(10_000))
                    .closable(),
            );
            self.ledger.clear(&key);
            return;
        }

        let delay = self.policy.delay_for(attempts);
        self.ledger.bump(&key);
        let generation = self.ledger.generation(&key).unwrap_or(0);

        tracing::debug!(
            key = %key,
            attempt = attempts + 1,
            delay_ms = delay.as_millis() as u64,
            "scheduling automatic retry"
        );

        let ledger = self.ledger.clone();
        let cleanup_window = self.policy.cleanup_window;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Fire the retry without awaiting it; the cleanup window starts
            // when the retry is invoked, not when it settles.
            tokio::spawn(retry_fn());
            tokio::time::sleep(cleanup_window).await;
            ledger.clear_if_generation(&key, generation);
        });
    }

    fn resolve_key(&self, context: &RetryContext) -> String {
        match &context.retry_key {
            Some(key) => key.clone(),
            None => format!("anon-{}", self.key_seq.fetch_add(1, Ordering::Relaxed)),
        }
    }
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("ledger", &self.ledger)
            .field("policy", &self.policy)
            .finish()
    }
}
