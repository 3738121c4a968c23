//! # ModKit - shared HTTP plumbing for admin modules
//!
//! Small, dependency-light building blocks that every module's REST layer
//! reuses:
//!
//! - RFC 9457 `Problem` documents and their axum response wrapper
//! - the `Listing` extractor for raw result-list query parameters
//! - JSON / redirect response helpers
//! - process shutdown signal handling for binaries

pub use anyhow::Result;

pub mod api;
pub mod runtime;

pub use api::listing::{Listing, ListingParams};
pub use api::problem::{
    bad_request, conflict, forbidden, internal_error, not_found, Problem, ProblemResponse,
    ValidationError,
};
pub use listing_core::{Page, PageInfo};
