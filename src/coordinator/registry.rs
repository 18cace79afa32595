//! Outstanding-count registry and page identifier correlation.
//!
//! Each originating page gets one [`RegistryEntry`] keyed by its [`PageId`]:
//! a signed counter of in-flight child requests plus the queued list of that
//! page's candidate next-page requests. Entries are created lazily on first
//! increment or first enqueue and preserve insertion order, which is what
//! gives the dispatcher its FIFO fairness across pages. Entries are never
//! removed one by one; the whole registry is cleared when a wave resets.
//!
//! The identifier correlator is a URL-keyed cache of page tokens: repeated
//! handling of the same page within one wave resolves to the same token, so
//! all of its children share one registry entry. The cache is cleared with
//! the registry, so the same URL seen in a later wave gets a fresh token.

use std::collections::HashMap;

use uuid::Uuid;

use crate::request::Request;
use crate::response::Response;

/// A process-unique identifier for one originating page, valid for one wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(Uuid);

impl PageId {
    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        PageId(Uuid::new_v4())
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-page tracking state.
#[derive(Debug, Default, Clone)]
pub struct RegistryEntry {
    /// Outstanding child count. Signed: a decrement can land before the
    /// matching increment is observed, so the value may be transiently
    /// negative on its way to zero.
    pub counter: i64,
    /// Queued candidate next-page requests, in proposal order.
    pub queued_next_requests: Vec<Request>,
}

/// Insertion-ordered map of page entries plus the URL → token cache.
#[derive(Default)]
pub struct PageRegistry {
    entries: Vec<(PageId, RegistryEntry)>,
    id_cache: HashMap<String, PageId>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached identifier for the response's URL, generating and
    /// caching a fresh one on first sight.
    pub fn identifier_for(&mut self, response: &Response) -> PageId {
        let url = response.url.as_str();
        if let Some(id) = self.id_cache.get(url) {
            return *id;
        }
        let id = PageId::random();
        self.id_cache.insert(url.to_string(), id);
        id
    }

    /// Returns the entry for `id`, creating it lazily.
    pub fn entry_mut(&mut self, id: PageId) -> &mut RegistryEntry {
        if let Some(idx) = self.entries.iter().position(|(key, _)| *key == id) {
            return &mut self.entries[idx].1;
        }
        self.entries.push((id, RegistryEntry::default()));
        let last = self.entries.len() - 1;
        &mut self.entries[last].1
    }

    /// Shared access to the entry for `id`, if it exists.
    pub fn entry(&self, id: PageId) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, entry)| entry)
    }

    /// Increments the outstanding child count for `id`.
    pub fn increment(&mut self, id: PageId) {
        self.entry_mut(id).counter += 1;
    }

    /// Decrements the outstanding child count for `id`.
    pub fn decrement(&mut self, id: PageId) {
        self.entry_mut(id).counter -= 1;
    }

    /// Replaces the queued next-page batch for `id`.
    pub fn set_queued(&mut self, id: PageId, requests: Vec<Request>) {
        self.entry_mut(id).queued_next_requests = requests;
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PageId, &RegistryEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Drains the queued requests of every page whose counter has converged
    /// to zero, in insertion order across pages and proposal order within a
    /// page, keyed by page so a failed dispatch can put them back. Pages
    /// with outstanding children keep their queues untouched.
    pub fn take_eligible(&mut self) -> Vec<(PageId, Vec<Request>)> {
        let mut batches = Vec::new();
        for (id, entry) in self.entries.iter_mut() {
            if entry.counter != 0 || entry.queued_next_requests.is_empty() {
                continue;
            }
            batches.push((*id, std::mem::take(&mut entry.queued_next_requests)));
        }
        batches
    }

    /// Puts drained batches back in their pages' queues. A batch queued for
    /// a page after the drain wins over the restored one.
    pub fn restore_queued(&mut self, batches: Vec<(PageId, Vec<Request>)>) {
        for (id, requests) in batches {
            let entry = self.entry_mut(id);
            if entry.queued_next_requests.is_empty() {
                entry.queued_next_requests = requests;
            }
        }
    }

    /// Number of registered pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears all entries and the identifier cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.id_cache.clear();
    }
}
