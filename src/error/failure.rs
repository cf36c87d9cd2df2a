//! The typed failure value produced at the network boundary.

use std::fmt;

/// A fetch failure as seen by the error pipeline.
///
/// A `Failure` carries an optional HTTP status and an optional human-readable
/// message. It is constructed where the request is made, so the classifier
/// and handler never have to duck-type a transport error: a missing status
/// means the request never produced an HTTP response at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// HTTP status code, if a response was received.
    pub status: Option<u16>,
    /// Server- or transport-supplied message, if any.
    pub message: Option<String>,
}

impl Failure {
    /// Creates a failure from an HTTP status with no message.
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            message: None,
        }
    }

    /// Creates a failure from an HTTP status and a message.
    pub fn status_with_message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: Some(message.into()),
        }
    }

    /// Creates a failure for a request that never reached the server.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }

    /// Returns the message, or the given fallback when none was supplied.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.message.as_deref()) {
            (Some(status), Some(msg)) => write!(f, "HTTP {}: {}", status, msg),
            (Some(status), None) => write!(f, "HTTP {}", status),
            (None, Some(msg)) => write!(f, "network failure: {}", msg),
            (None, None) => write!(f, "network failure"),
        }
    }
}

impl std::error::Error for Failure {}

/// Boundary conversion for reqwest transport errors.
///
/// Timeouts map to 408 so they enter the retry path; errors that carry an
/// HTTP status keep it; anything else (DNS, connect, TLS) has no status and
/// classifies as a network error.
impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Failure::status_with_message(408, err.to_string());
        }
        match err.status() {
            Some(status) => Failure::status_with_message(status.as_u16(), err.to_string()),
            None => Failure::network(err.to_string()),
        }
    }
}
