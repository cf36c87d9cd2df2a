//! Failure values and classification.
//!
//! Every fetch failure is turned into a typed [`Failure`] at the network
//! boundary and classified into exactly one [`ErrorKind`] before the rest of
//! the pipeline sees it. Nothing downstream inspects raw transport errors.

pub mod failure;
pub mod kind;

pub use failure::Failure;
pub use kind::ErrorKind;
