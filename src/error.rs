//! Error types shared across the crate.
//!
//! All fallible operations return [`PaginateError`]. There are no retries
//! anywhere in this crate: failures are either absorbed locally (logged and
//! recovered) or propagated synchronously to the immediate caller.

use thiserror::Error;

/// The error type for coordinator and matcher operations.
#[derive(Error, Debug)]
pub enum PaginateError {
    /// No response object could be extracted from a wrapped call's arguments.
    #[error("no response could be extracted from the call arguments")]
    NoResponse,

    /// A reserved metadata key expected on a request or response was absent.
    #[error("missing reserved metadata key: {0}")]
    MissingMeta(&'static str),

    /// A date value could not be converted to a datetime.
    #[error("invalid date argument: {0}")]
    InvalidDate(String),

    /// An unrecognized period name was passed to the period matcher.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// The crawl engine rejected a scheduling or subscription call.
    #[error("engine error: {0}")]
    Engine(String),

    /// A wrapped step or continuation outlived its coordinator.
    #[error("pagination coordinator was dropped")]
    CoordinatorDropped,
}
