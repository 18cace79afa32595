//! A "prelude" for users of the `crawl-paginate` crate.
//!
//! This prelude re-exports the most commonly used traits and structs so that
//! they can be easily imported.
//!
//! # Example
//!
//! ```
//! use crawl_paginate::prelude::*;
//! ```

pub use crate::{
    // Core structs
    CallArgs,
    PaginationCoordinator,
    Request,
    Response,
    // Core trait
    PaginationEngine,
    // Step output containers
    ParseEntry,
    StepOutput,
    // Idle protocol
    IdleAction,
    // Errors
    PaginateError,
    // Matchers
    DateOptions,
    Period,
};

pub use crate::matchers::{date_in_period_matches, date_matches};
