//! Output containers for wrapped extraction steps.
//!
//! A spider step can emit scraped items and follow-up requests in one pass.
//! [`ParseEntry`] is the unit of that output and [`StepOutput`] carries the
//! shape a step returned it in, so wrappers can hand back the same shape
//! they were given.

use crate::request::Request;

/// A loosely-typed scraped item.
///
/// Scraped records are open maps in this crate, the way spider frameworks
/// usually treat items before a pipeline gives them structure.
pub type Item = serde_json::Value;

/// A single unit of spider output: either a follow-up request or an item.
#[derive(Debug, Clone)]
pub enum ParseEntry {
    /// A request to be scheduled for a later fetch.
    Request(Request),
    /// A scraped item.
    Item(Item),
}

impl ParseEntry {
    /// Returns a reference to the inner request, if this entry is one.
    pub fn as_request(&self) -> Option<&Request> {
        match self {
            ParseEntry::Request(request) => Some(request),
            ParseEntry::Item(_) => None,
        }
    }

    /// Consumes the entry, returning the inner request if this entry is one.
    pub fn into_request(self) -> Option<Request> {
        match self {
            ParseEntry::Request(request) => Some(request),
            ParseEntry::Item(_) => None,
        }
    }
}

impl From<Request> for ParseEntry {
    fn from(request: Request) -> Self {
        ParseEntry::Request(request)
    }
}

impl From<Item> for ParseEntry {
    fn from(item: Item) -> Self {
        ParseEntry::Item(item)
    }
}

/// The return shape of a wrapped step.
///
/// Wrappers preserve the shape of the step they wrap: a step that returned a
/// single entry yields `Single` back, a step that returned a sequence (eager
/// or lazy, materialized either way) yields `Many`.
#[derive(Debug, Clone, Default)]
pub enum StepOutput {
    /// The step produced nothing.
    #[default]
    None,
    /// The step returned exactly one entry.
    Single(ParseEntry),
    /// The step returned an ordered sequence of entries.
    Many(Vec<ParseEntry>),
}

impl StepOutput {
    /// Returns `true` if the step produced no output.
    pub fn is_none(&self) -> bool {
        matches!(self, StepOutput::None)
    }

    /// Flattens the output into an ordered list of entries.
    pub fn into_entries(self) -> Vec<ParseEntry> {
        match self {
            StepOutput::None => Vec::new(),
            StepOutput::Single(entry) => vec![entry],
            StepOutput::Many(entries) => entries,
        }
    }
}

impl From<ParseEntry> for StepOutput {
    fn from(entry: ParseEntry) -> Self {
        StepOutput::Single(entry)
    }
}

impl From<Request> for StepOutput {
    fn from(request: Request) -> Self {
        StepOutput::Single(ParseEntry::Request(request))
    }
}

impl From<Vec<ParseEntry>> for StepOutput {
    fn from(entries: Vec<ParseEntry>) -> Self {
        StepOutput::Many(entries)
    }
}

impl From<Vec<Request>> for StepOutput {
    fn from(requests: Vec<Request>) -> Self {
        StepOutput::Many(requests.into_iter().map(ParseEntry::Request).collect())
    }
}
