//! Interface to the crawl engine collaborator.
//!
//! The engine owns the event loop, performs the HTTP I/O, and tells its
//! subscribers when no further scheduled work remains. The coordinator only
//! participates at three points: it schedules requests for future dispatch,
//! it registers a handler for the idle notification, and — when its idle
//! handler has just injected work — it signals the engine not to shut down.
//!
//! The shutdown signal is a typed return value rather than control-flow by
//! exception: an idle handler answers [`IdleAction::DeferShutdown`] when it
//! injected work and [`IdleAction::AllowShutdown`] when it found none, and
//! the engine closes only when every handler allowed it.

use std::sync::Arc;

use crate::error::PaginateError;
use crate::request::Request;

/// What an idle handler tells the engine to do after being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    /// The handler injected new work; the engine must not terminate yet.
    DeferShutdown,
    /// The handler found no pending work; the engine may proceed to close.
    AllowShutdown,
}

/// An opaque token identifying one idle subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A handler invoked on the engine's idle notification.
pub type IdleHandler = Arc<dyn Fn() -> IdleAction + Send + Sync>;

/// The scheduling and idle-notification surface of a crawl engine.
///
/// Implementations must treat [`unsubscribe_idle`](Self::unsubscribe_idle)
/// with an unknown or already-removed id as a benign no-op; coordinator
/// instances have independent lifecycles and may tear down a subscription
/// that was never established.
pub trait PaginationEngine: Send + Sync {
    /// Accepts a request for future dispatch.
    fn schedule(&self, request: Request) -> Result<(), PaginateError>;

    /// Registers `handler` to be invoked on the idle notification.
    fn subscribe_idle(&self, handler: IdleHandler) -> SubscriptionId;

    /// Removes a previously registered idle handler. Unknown ids are ignored.
    fn unsubscribe_idle(&self, id: SubscriptionId);
}
