//! folioweb - resilient data-loading core for a portfolio site
//!
//! The crate centers on a unified error pipeline: failures produced at the
//! service boundary are classified, reported as user-facing notices or
//! navigations, and transient ones are retried with backoff. Loaders tie the
//! pipeline to view state, so a view declares what it fetches and the
//! pipeline handles everything that can go wrong.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod loader;
pub mod logging;
pub mod nav;
pub mod notify;
pub mod retry;
