//! Named routes and the navigator seam.
//!
//! Error handling only ever redirects to the two error pages, so the route
//! space the core knows about is deliberately small. The application shell
//! implements [`Navigator`] on top of its actual router.

use std::fmt;

/// Destination routes the error pipeline can redirect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Dedicated 404 page.
    NotFound,
    /// Dedicated 403 page.
    Forbidden,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::NotFound => write!(f, "NotFound"),
            Route::Forbidden => write!(f, "Forbidden"),
        }
    }
}

/// Sink for redirects to a named destination.
pub trait Navigator: Send + Sync {
    /// Navigates to the given route.
    fn go_to(&self, route: Route);
}

/// Navigator that records redirects in the log, for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn go_to(&self, route: Route) {
        tracing::warn!(route = %route, "redirecting");
    }
}
