//! Model admin: result-list query engine and action capability model.
//!
//! A registered [`domain::admin::ModelAdmin`] describes how one record type is
//! listed (columns, filters, search fields, ordering) and the
//! [`domain::service::Service`] turns request parameters into a paginated,
//! permission-aware change list.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

pub mod errors;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
#[doc(hidden)]
pub mod registry;

pub use config::ModelAdminConfig;
pub use registry::AdminRegistry;
