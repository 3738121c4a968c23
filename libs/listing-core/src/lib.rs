//! Transport-agnostic building blocks for admin result lists.
//!
//! Everything here is plain data: lookup expressions handed to a record store,
//! ordering keys, and numbered pages. Parsing of HTTP parameters and the
//! actual evaluation of expressions live elsewhere.

pub mod ast;
mod error;
mod order;
mod page;

pub use error::Error;
pub use order::{OrderBy, OrderKey, SortDir};
pub use page::{Page, PageInfo};

/// Separator between relation segments and the trailing operator of a lookup key,
/// e.g. `author__name__icontains`.
pub const LOOKUP_SEP: &str = "__";

/// Split a lookup key on [`LOOKUP_SEP`]. Empty segments are kept so callers can
/// reject keys such as `title____exact`.
pub fn split_lookup(key: &str) -> Vec<&str> {
    key.split(LOOKUP_SEP).collect()
}

#[cfg(test)]
mod tests;
