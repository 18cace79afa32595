//! The response value object.
//!
//! A [`Response`] exposes the locator it originated from and the same
//! string-keyed metadata map as its request. Copying the request's metadata
//! onto the response is the engine's job, not the coordinator's; the
//! coordinator relies on that propagation to correlate a child response back
//! to the page that spawned it.

use std::fmt;

use url::Url;

use crate::coordinator::registry::PageId;
use crate::request::{Meta, MetaValue, Request};

/// A response descriptor: originating locator plus propagated metadata.
#[derive(Clone)]
pub struct Response {
    /// The locator this response was fetched from.
    pub url: Url,
    /// The metadata map, copied from the request that produced this response.
    pub meta: Meta,
}

impl Response {
    /// Creates a response for `url` with empty metadata.
    pub fn new(url: Url) -> Self {
        Response {
            url,
            meta: Meta::new(),
        }
    }

    /// Creates the response the engine would produce for `request`,
    /// propagating its metadata map.
    pub fn from_request(request: &Request) -> Self {
        Response {
            url: request.url.clone(),
            meta: request.meta.clone(),
        }
    }

    /// Returns a copy of this response with `meta` replacing the metadata map.
    pub fn with_meta(&self, meta: Meta) -> Self {
        Response {
            url: self.url.clone(),
            meta,
        }
    }

    /// Returns the originating-page identifier stamped on this response, if any.
    pub fn page_id(&self) -> Option<PageId> {
        self.meta
            .get(crate::coordinator::PAGE_ID_KEY)
            .and_then(MetaValue::as_page_id)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("meta", &self.meta)
            .finish()
    }
}
