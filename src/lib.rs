//! # crawl-paginate
//!
//! Deferred pagination control and date-scope matchers for event-driven web
//! crawlers.
//!
//! Provides the main components: `PaginationCoordinator`, the
//! `PaginationEngine` interface, and the `matchers` module.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crawl_paginate::prelude::*;
//!
//! fn wire_spider(engine: Arc<dyn PaginationEngine>) {
//!     let coordinator = PaginationCoordinator::new(engine);
//!
//!     // Wrap the spider steps once; call the wrappers per response.
//!     let mut parse_listing = coordinator.annotate(|args: &mut CallArgs| {
//!         // ... extract detail requests from the driving response ...
//!         StepOutput::None
//!     });
//!     let mut parse_detail = coordinator.track_completion(|args: &mut CallArgs| {
//!         // ... build an item, or return None to filter it out ...
//!         None
//!     });
//!     let mut propose_next = coordinator.enqueue_next_pages(|args: &mut CallArgs| {
//!         // ... propose the listing's next-page request(s) ...
//!         StepOutput::None
//!     });
//!
//!     let _ = (&mut parse_listing, &mut parse_detail, &mut propose_next);
//! }
//! ```
//!
//! The coordinator guarantees that a listing page's next-page request is only
//! dispatched once every detail request spawned from that page has resolved,
//! including children that a downstream filter later discards, while requests
//! for different pages stay concurrent. See the [`coordinator`] module for
//! the full protocol.

pub mod args;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod item;
pub mod matchers;
pub mod prelude;
pub mod request;
pub mod response;

pub use args::{CallArg, CallArgs};
pub use coordinator::registry::{PageId, PageRegistry, RegistryEntry};
pub use coordinator::PaginationCoordinator;
pub use engine::{IdleAction, IdleHandler, PaginationEngine, SubscriptionId};
pub use error::PaginateError;
pub use item::{Item, ParseEntry, StepOutput};
pub use matchers::{date_in_period_matches, date_matches, DateInput, DateOptions, Period};
pub use request::{Callback, Meta, MetaValue, Request};
pub use response::Response;
