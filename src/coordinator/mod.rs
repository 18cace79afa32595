//! # Deferred-Pagination Coordinator
//!
//! Restricts and sequences pagination during a crawl: the next-page request
//! for a listing page is only dispatched once every detail request spawned
//! from that page has fully resolved, while requests belonging to different
//! pages stay free to run concurrently.
//!
//! ## Overview
//!
//! The coordinator wraps three caller-supplied spider steps:
//!
//! - [`annotate`](PaginationCoordinator::annotate) wraps the detail-extraction
//!   step: every child request it emits is stamped with its originating page's
//!   identifier and counted as outstanding.
//! - [`track_completion`](PaginationCoordinator::track_completion) wraps the
//!   step that finalizes a child response into an output item: the count goes
//!   back down exactly when an item is actually produced. A child that the
//!   finalize step filters out never decrements.
//! - [`enqueue_next_pages`](PaginationCoordinator::enqueue_next_pages) wraps
//!   the step proposing next-page requests: proposals are queued in the
//!   registry instead of being emitted.
//!
//! On the engine's idle notification the coordinator scans the registry for
//! pages whose outstanding count reached zero, dispatches the first queued
//! next-page request among them, and defers the remainder: the dispatched
//! request's callback is replaced with a continuation that resets coordinator
//! state, delegates to the original callback, and re-emits what was deferred.
//! That restarts the cycle for the next wave.
//!
//! ## Concurrency
//!
//! The engine drives a single cooperative loop; completion callbacks for
//! outstanding requests may interleave in any order but never run at the same
//! process instant. The wave state still sits behind a mutex so the counting
//! invariant survives an engine that grows real parallelism.
//!
//! A child request that the engine silently drops without ever reaching the
//! finalize step leaves its page's counter permanently nonzero and that
//! page's next-page request permanently undispatched. There is no
//! timeout-driven forced decrement; this is a known limitation, not an error
//! path.

pub mod registry;

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::args::CallArgs;
use crate::engine::{IdleAction, IdleHandler, PaginationEngine, SubscriptionId};
use crate::error::PaginateError;
use crate::item::{ParseEntry, StepOutput};
use crate::request::{MetaValue, Request};
use crate::response::Response;
use self::registry::{PageId, PageRegistry};

/// Reserved metadata key: the identifier of the page that spawned a request.
pub const PAGE_ID_KEY: &str = "__page_id";
/// Reserved metadata key: the original callback of a dispatched continuation.
pub const ORIGINAL_CALLBACK_KEY: &str = "__original_callback";
/// Reserved metadata key: next-page requests deferred behind a continuation.
pub const REMAINING_NEXT_PAGES_KEY: &str = "__remaining_next_pages";

/// Mutable per-wave state, reset wholesale when a continuation runs.
#[derive(Default)]
struct WaveState {
    registry: PageRegistry,
    setup_done: bool,
    idle_subscription: Option<SubscriptionId>,
    response_override: Option<Response>,
}

/// Tracks outstanding child requests per originating page and defers each
/// page's next-page requests until its children have resolved.
///
/// Construct one coordinator per logical spider. All registry, cache, and
/// subscription state is held here explicitly and passed by reference to the
/// wrapping closures; nothing is process-global.
pub struct PaginationCoordinator {
    engine: Arc<dyn PaginationEngine>,
    state: Mutex<WaveState>,
    // Handed to idle handlers and continuations; weak so the engine holding
    // them never keeps a dropped coordinator alive.
    self_ref: Weak<Self>,
}

impl PaginationCoordinator {
    /// Creates a coordinator bound to `engine`.
    pub fn new(engine: Arc<dyn PaginationEngine>) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| PaginationCoordinator {
            engine,
            state: Mutex::new(WaveState::default()),
            self_ref: self_ref.clone(),
        })
    }

    /// Sets the single-response override: when present it always wins over
    /// argument scanning, for wrapping steps that take no response arguments.
    pub fn set_response_override(&self, response: Response) {
        self.state.lock().response_override = Some(response);
    }

    /// Clears the single-response override.
    pub fn clear_response_override(&self) {
        self.state.lock().response_override = None;
    }

    /// Returns the outstanding child count for a page, or `None` if the page
    /// has no registry entry this wave.
    pub fn outstanding_children(&self, id: PageId) -> Option<i64> {
        self.state
            .lock()
            .registry
            .entry(id)
            .map(|entry| entry.counter)
    }

    /// Establishes the idle subscription. Idempotent; re-entry is a no-op.
    fn setup(&self) {
        {
            let mut state = self.state.lock();
            if state.setup_done {
                return;
            }
            state.setup_done = true;
        }

        let weak = self.self_ref.clone();
        let handler: IdleHandler = Arc::new(move || match weak.upgrade() {
            Some(coordinator) => coordinator.on_idle(),
            None => IdleAction::AllowShutdown,
        });
        let id = self.engine.subscribe_idle(handler);
        self.state.lock().idle_subscription = Some(id);
        debug!(subscription = id.0, "idle subscription established");
    }

    /// Removes the idle subscription. Tearing down a subscription that was
    /// never established is a no-op, so coordinator instances with
    /// independent lifecycles do not conflict.
    fn teardown(&self) {
        let subscription = self.state.lock().idle_subscription.take();
        if let Some(id) = subscription {
            self.engine.unsubscribe_idle(id);
            debug!(subscription = id.0, "idle subscription removed");
        }
    }

    /// Resolves the driving response for a wrapped call and stamps its page
    /// identifier into the response's own metadata.
    fn resolve_and_stamp(&self, args: &mut CallArgs) -> Result<PageId, PaginateError> {
        let mut state = self.state.lock();
        let state = &mut *state;

        if let Some(response) = state.response_override.as_mut() {
            let id = state.registry.identifier_for(response);
            response
                .meta
                .insert(PAGE_ID_KEY.to_string(), MetaValue::PageId(id));
            return Ok(id);
        }

        if args.response_count() > 1 {
            warn!("detected more than one response argument, using the first");
        }
        let Some(response) = args.first_response_mut() else {
            return Err(PaginateError::NoResponse);
        };
        let id = state.registry.identifier_for(response);
        response
            .meta
            .insert(PAGE_ID_KEY.to_string(), MetaValue::PageId(id));
        Ok(id)
    }

    /// Reads the page identifier already stamped on the driving response.
    fn driving_page_id(&self, args: &CallArgs) -> Result<PageId, PaginateError> {
        {
            let state = self.state.lock();
            if let Some(response) = state.response_override.as_ref() {
                return response
                    .page_id()
                    .ok_or(PaginateError::MissingMeta(PAGE_ID_KEY));
            }
        }

        if args.response_count() > 1 {
            warn!("detected more than one response argument, using the first");
        }
        let Some(response) = args.first_response() else {
            return Err(PaginateError::NoResponse);
        };
        response
            .page_id()
            .ok_or(PaginateError::MissingMeta(PAGE_ID_KEY))
    }

    /// Wraps a detail-extraction step: stamps the driving page's identifier
    /// on the response and on every emitted child request, and counts each
    /// child as outstanding for that page.
    ///
    /// The first invocation establishes the idle subscription. The wrapper
    /// preserves the return shape of the wrapped step, and non-request
    /// outputs pass through unmodified and uncounted.
    pub fn annotate<F>(
        &self,
        mut extract: F,
    ) -> impl FnMut(&mut CallArgs) -> Result<StepOutput, PaginateError>
    where
        F: FnMut(&mut CallArgs) -> StepOutput,
    {
        let weak = self.self_ref.clone();
        move |args| {
            let Some(coordinator) = weak.upgrade() else {
                return Err(PaginateError::CoordinatorDropped);
            };
            coordinator.setup();

            let id = coordinator.resolve_and_stamp(args)?;
            let output = extract(args);
            if output.is_none() {
                return Ok(StepOutput::None);
            }

            let single = matches!(output, StepOutput::Single(_));
            let mut entries = output.into_entries();
            {
                let mut state = coordinator.state.lock();
                for entry in entries.iter_mut() {
                    if let ParseEntry::Request(request) = entry {
                        request
                            .meta
                            .insert(PAGE_ID_KEY.to_string(), MetaValue::PageId(id));
                        state.registry.increment(id);
                    }
                }
            }

            Ok(if single {
                match entries.pop() {
                    Some(entry) => StepOutput::Single(entry),
                    None => StepOutput::None,
                }
            } else {
                StepOutput::Many(entries)
            })
        }
    }

    /// Wraps the step that finalizes a child response into an output item:
    /// the driving page's outstanding count is decremented exactly when the
    /// wrapped step yields an entry. A child filtered out by the step never
    /// decrements; equilibrium at zero therefore means every spawned child
    /// that will ever resolve through this tracker has resolved.
    pub fn track_completion<F>(
        &self,
        mut finalize: F,
    ) -> impl FnMut(&mut CallArgs) -> Result<Option<ParseEntry>, PaginateError>
    where
        F: FnMut(&mut CallArgs) -> Option<ParseEntry>,
    {
        let weak = self.self_ref.clone();
        move |args| {
            let Some(coordinator) = weak.upgrade() else {
                return Err(PaginateError::CoordinatorDropped);
            };
            let result = finalize(args);
            if result.is_some() {
                let id = coordinator.driving_page_id(args)?;
                coordinator.state.lock().registry.decrement(id);
            }
            Ok(result)
        }
    }

    /// Wraps the step proposing next-page requests for the driving page:
    /// instead of being emitted, the proposed batch is queued in the registry
    /// (replacing any batch previously queued for that page this wave) until
    /// the page becomes eligible for dispatch.
    pub fn enqueue_next_pages<F>(
        &self,
        mut propose: F,
    ) -> impl FnMut(&mut CallArgs) -> Result<(), PaginateError>
    where
        F: FnMut(&mut CallArgs) -> StepOutput,
    {
        let weak = self.self_ref.clone();
        move |args| {
            let Some(coordinator) = weak.upgrade() else {
                return Err(PaginateError::CoordinatorDropped);
            };
            debug!("queueing next page requests");
            let output = propose(args);
            if output.is_none() {
                return Ok(());
            }

            let id = coordinator.driving_page_id(args)?;
            let requests: Vec<Request> = output
                .into_entries()
                .into_iter()
                .filter_map(ParseEntry::into_request)
                .collect();
            coordinator.state.lock().registry.set_queued(id, requests);
            Ok(())
        }
    }

    /// The idle-notification handler: dispatches the first queued next-page
    /// request of the first page whose children have all resolved.
    ///
    /// Eligible pages are scanned in registry insertion order and a page's
    /// queue keeps its proposal order, giving FIFO fairness across pages
    /// while preserving per-page ordering. The dispatched request carries the
    /// rest of the eligible pool in its metadata and runs through the
    /// continuation; pages with outstanding children keep their queues for a
    /// later idle notification.
    ///
    /// Returns [`IdleAction::DeferShutdown`] when a request was injected and
    /// [`IdleAction::AllowShutdown`] when no page is eligible, which is the
    /// terminal condition of the wave. If the engine rejects the dispatch,
    /// the drained queues go back to the registry so a later idle
    /// notification can retry them.
    pub fn on_idle(&self) -> IdleAction {
        debug!("dequeueing next page requests");

        let (continuation, snapshot) = {
            let mut state = self.state.lock();
            let snapshot = state.registry.take_eligible();
            if snapshot.is_empty() {
                info!("no eligible next page requests to process");
                return IdleAction::AllowShutdown;
            }

            let mut pool: Vec<Request> = snapshot
                .iter()
                .flat_map(|(_, requests)| requests.iter().cloned())
                .collect();
            let next = pool.remove(0);
            let mut meta = next.meta.clone();
            if let Some(callback) = next.callback.clone() {
                meta.insert(
                    ORIGINAL_CALLBACK_KEY.to_string(),
                    MetaValue::Callback(callback),
                );
            }
            meta.insert(
                REMAINING_NEXT_PAGES_KEY.to_string(),
                MetaValue::Requests(pool),
            );

            let weak = self.self_ref.clone();
            let continuation = next
                .with_meta(meta)
                .with_callback(Arc::new(move |response| match weak.upgrade() {
                    Some(coordinator) => coordinator.run_continuation(response),
                    None => Err(PaginateError::CoordinatorDropped),
                }));
            (continuation, snapshot)
        };

        match self.engine.schedule(continuation) {
            Ok(()) => IdleAction::DeferShutdown,
            Err(e) => {
                warn!("failed to schedule next page request: {e}");
                self.state.lock().registry.restore_queued(snapshot);
                IdleAction::AllowShutdown
            }
        }
    }

    /// The continuation installed on a dispatched next-page request: resets
    /// coordinator state for the new wave, delegates to the request's
    /// original callback, and re-emits the next-page requests that were
    /// deferred behind it.
    ///
    /// Outputs of the original callback and the re-emitted requests flow back
    /// into the wrapped steps, which re-arm the idle subscription for the
    /// fresh wave.
    pub fn run_continuation(
        &self,
        mut response: Response,
    ) -> Result<Vec<ParseEntry>, PaginateError> {
        debug!("requesting next page requests");

        let remaining = response
            .meta
            .remove(REMAINING_NEXT_PAGES_KEY)
            .and_then(|value| match value {
                MetaValue::Requests(requests) => Some(requests),
                _ => None,
            })
            .ok_or(PaginateError::MissingMeta(REMAINING_NEXT_PAGES_KEY))?;

        {
            let mut state = self.state.lock();
            state.registry.clear();
            state.setup_done = false;
        }
        self.teardown();

        // A dispatched request without an original callback contributes no
        // entries of its own; the deferred remainder is still re-emitted.
        let callback = response
            .meta
            .remove(ORIGINAL_CALLBACK_KEY)
            .and_then(|value| value.as_callback());

        let mut entries = match callback {
            Some(callback) => callback(response)?,
            None => Vec::new(),
        };
        entries.extend(remaining.into_iter().map(ParseEntry::Request));
        Ok(entries)
    }
}
