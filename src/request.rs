//! The request value object.
//!
//! A [`Request`] is an opaque carrier of a target locator, a string-keyed
//! metadata map, and a callback reference the engine invokes on the eventual
//! response. The coordinator never constructs requests from network data; it
//! only reads and annotates them. Requests are immutable-with-copy: mutating
//! metadata or the callback produces a new descriptor sharing the locator.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::coordinator::registry::PageId;
use crate::error::PaginateError;
use crate::item::ParseEntry;
use crate::response::Response;

/// A callback reference used by the engine to process a request's response.
pub type Callback = Arc<dyn Fn(Response) -> Result<Vec<ParseEntry>, PaginateError> + Send + Sync>;

/// A value stored in a request or response metadata map.
///
/// Metadata is string-keyed with arbitrary value types. Besides plain JSON
/// values, the coordinator stores its own reserved entries here: the
/// originating page identifier on every child request, and, only on a
/// dispatched continuation, the original callback and the remainder list.
#[derive(Clone)]
pub enum MetaValue {
    /// An arbitrary caller-owned value.
    Value(serde_json::Value),
    /// An originating-page identifier.
    PageId(PageId),
    /// A callback reference.
    Callback(Callback),
    /// A list of request descriptors.
    Requests(Vec<Request>),
}

impl MetaValue {
    /// Returns the page identifier if this value holds one.
    pub fn as_page_id(&self) -> Option<PageId> {
        match self {
            MetaValue::PageId(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the callback if this value holds one.
    pub fn as_callback(&self) -> Option<Callback> {
        match self {
            MetaValue::Callback(callback) => Some(Arc::clone(callback)),
            _ => None,
        }
    }

    /// Returns the request list if this value holds one.
    pub fn as_requests(&self) -> Option<&[Request]> {
        match self {
            MetaValue::Requests(requests) => Some(requests),
            _ => None,
        }
    }

    /// Returns the plain value if this entry holds one.
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            MetaValue::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            MetaValue::PageId(id) => f.debug_tuple("PageId").field(id).finish(),
            MetaValue::Callback(_) => f.write_str("Callback(..)"),
            MetaValue::Requests(requests) => f.debug_tuple("Requests").field(requests).finish(),
        }
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(value: serde_json::Value) -> Self {
        MetaValue::Value(value)
    }
}

/// A string-keyed metadata map attached to requests and responses.
pub type Meta = HashMap<String, MetaValue>;

/// A request descriptor: target locator, metadata map, and callback.
#[derive(Clone)]
pub struct Request {
    /// The target locator.
    pub url: Url,
    /// The mutable metadata map.
    pub meta: Meta,
    /// The callback the engine invokes on this request's response, if any.
    pub callback: Option<Callback>,
}

impl Request {
    /// Creates a request for `url` with empty metadata and no callback.
    pub fn new(url: Url) -> Self {
        Request {
            url,
            meta: Meta::new(),
            callback: None,
        }
    }

    /// Returns a copy of this request with `meta` replacing the metadata map.
    pub fn with_meta(&self, meta: Meta) -> Self {
        Request {
            url: self.url.clone(),
            meta,
            callback: self.callback.clone(),
        }
    }

    /// Returns a copy of this request with `callback` installed.
    pub fn with_callback(&self, callback: Callback) -> Self {
        Request {
            url: self.url.clone(),
            meta: self.meta.clone(),
            callback: Some(callback),
        }
    }

    /// Returns the originating-page identifier stamped on this request, if any.
    pub fn page_id(&self) -> Option<PageId> {
        self.meta
            .get(crate::coordinator::PAGE_ID_KEY)
            .and_then(MetaValue::as_page_id)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url.as_str())
            .field("meta", &self.meta)
            .field("callback", &self.callback.as_ref().map(|_| ".."))
            .finish()
    }
}
