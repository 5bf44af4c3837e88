//! Persistent triple storage for episteme.
//!
//! - [`TripleStore`]: the `knowledge` table and its object index, backed by redb
//! - [`TripleCursor`] / [`SubjectCursor`]: lazy, single-pass scans that page
//!   through the store with one short read transaction per page
//!
//! The store only persists flat triples. It does not interpret objects; see
//! [`crate::term`] for the literal/reference convention.

pub mod cursor;
pub mod durable;

use crate::error::StoreError;

pub use cursor::{SubjectCursor, TripleCursor};
pub use durable::TripleStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Default number of rows fetched per cursor page.
pub const DEFAULT_PAGE_SIZE: usize = 512;

/// Build a `map_err` adapter that turns any redb error into [`StoreError::Redb`].
pub(crate) fn redb_error<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Redb {
        message: format!("{context} failed: {e}"),
    }
}
