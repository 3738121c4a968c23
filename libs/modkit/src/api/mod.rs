//! Request/response helpers shared by module REST layers.

pub mod listing;
pub mod problem;
pub mod response;

pub use problem::{bad_request, forbidden, internal_error, not_found, Problem, ProblemResponse};
