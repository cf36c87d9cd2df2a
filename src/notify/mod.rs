//! User-visible notices and the notifier seam.
//!
//! The pipeline never renders anything itself; it emits [`Notice`] values
//! through a [`Notifier`] owned by the application shell. The library ships
//! a tracing-backed implementation for headless use; a UI layer supplies its
//! own.

use std::fmt;
use std::time::Duration;

/// Severity of a notice, mapped to the shell's visual treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Operation completed.
    Success,
    /// Neutral information.
    Info,
    /// Something degraded but recoverable.
    Warning,
    /// Something failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A user-visible message with a title, body, and auto-dismiss duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Visual severity.
    pub severity: Severity,
    /// Short heading.
    pub title: String,
    /// Message body.
    pub content: String,
    /// How long the notice stays on screen before auto-dismissing.
    pub duration: Duration,
    /// Whether the user can dismiss the notice early.
    pub closable: bool,
}

impl Notice {
    fn new(severity: Severity, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            content: content.into(),
            duration: Duration::from_millis(3000),
            closable: false,
        }
    }

    /// Creates a success notice (3s default duration).
    pub fn success(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, content)
    }

    /// Creates an info notice.
    pub fn info(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, content).with_duration(Duration::from_millis(4000))
    }

    /// Creates a warning notice.
    pub fn warning(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, content).with_duration(Duration::from_millis(5000))
    }

    /// Creates an error notice.
    pub fn error(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, content).with_duration(Duration::from_millis(6000))
    }

    /// Sets the auto-dismiss duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Marks the notice as user-dismissible.
    pub fn closable(mut self) -> Self {
        self.closable = true;
        self
    }

    /// Returns true if the notice reports an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.content)
    }
}

/// Sink for user-visible notices.
pub trait Notifier: Send + Sync {
    /// Delivers a notice to the user.
    fn notify(&self, notice: Notice);
}

/// Notifier that renders notices through tracing, for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => tracing::error!(title = %notice.title, "{}", notice.content),
            Severity::Warning => tracing::warn!(title = %notice.title, "{}", notice.content),
            Severity::Success | Severity::Info => {
                tracing::info!(title = %notice.title, "{}", notice.content)
            }
        }
    }
}
