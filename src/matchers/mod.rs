//! Matchers for restricting crawl and scraping scope.
//!
//! Matchers are pure predicate functions with no shared state: they decide
//! whether a scraped record falls inside a valid window and can be used
//! independently of the pagination coordinator. Pairing them with
//! [`track_completion`](crate::PaginationCoordinator::track_completion) is
//! the usual arrangement: the finalize step returns an item only when the
//! matcher accepts it, so rejected records never count as resolved children.

pub mod date;

pub use date::{date_in_period_matches, date_matches, DateInput, DateOptions, Period};
