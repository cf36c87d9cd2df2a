//! Classification of failures into handling strategies.

use std::fmt;

use super::Failure;

/// The kind of a fetch failure, determining how the handler responds.
///
/// Classification is pure and total: every [`Failure`] maps to exactly one
/// kind, with status rules checked before the status-absent rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 404. Navigate to the not-found page.
    NotFound,
    /// HTTP 403. Navigate to the forbidden page.
    Forbidden,
    /// HTTP 401. Notify; no auth flow is implemented.
    Unauthorized,
    /// HTTP 500, 502 or 503. Notify with the server message.
    ServerError,
    /// HTTP 408. Eligible for automatic retry.
    Timeout,
    /// No HTTP response was received at all. Eligible for automatic retry.
    NetworkError,
    /// Any other status. Notify with the message.
    Generic,
}

impl ErrorKind {
    /// Classifies a failure.
    pub fn classify(failure: &Failure) -> Self {
        match failure.status {
            Some(404) => ErrorKind::NotFound,
            Some(403) => ErrorKind::Forbidden,
            Some(401) => ErrorKind::Unauthorized,
            Some(500) | Some(502) | Some(503) => ErrorKind::ServerError,
            Some(408) => ErrorKind::Timeout,
            Some(_) => ErrorKind::Generic,
            None => ErrorKind::NetworkError,
        }
    }

    /// Returns true if this kind may be retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::NetworkError)
    }

    /// Returns true if this kind resolves by navigation instead of a notice.
    pub fn is_navigation(&self) -> bool {
        matches!(self, ErrorKind::NotFound | ErrorKind::Forbidden)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}
