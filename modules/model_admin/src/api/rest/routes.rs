use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;
use crate::registry::AdminRegistry;

/// Mount the list, create and inspect endpoints of one admin under its
/// index URL.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let index = service.urls().index_url().to_owned();
    router
        // GET {index} - paginated result list
        .route(
            &index,
            get(handlers::list_records).layer(Extension(service.clone())),
        )
        // POST {index}create/ - create a record
        .route(
            &service.urls().create_url(),
            post(handlers::create_record).layer(Extension(service.clone())),
        )
        // GET {index}inspect/{pk}/ - single record
        .route(
            &format!("{index}inspect/{{pk}}/"),
            get(handlers::inspect_record).layer(Extension(service)),
        )
}

/// Mount every registered admin.
pub fn router(registry: &AdminRegistry) -> Router {
    registry
        .iter()
        .fold(Router::new(), |router, svc| register_routes(router, svc.clone()))
}
