pub mod admin;
pub mod buttons;
pub mod changelist;
pub mod error;
pub mod filters;
pub mod lookups;
pub mod ordering;
pub mod pagination;
pub mod permissions;
pub mod ports;
pub mod repo;
pub mod schema;
pub mod search;
pub mod service;
pub mod tree;
pub mod urls;
