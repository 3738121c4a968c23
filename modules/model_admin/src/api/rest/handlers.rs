use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, HeaderMap, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use modkit::api::problem::ProblemResponse;
use modkit::api::response::{created_json, found};
use modkit::Listing;
use tracing::{debug, info};

use crate::api::rest::dto::{ChangeListDto, CreateRecordReq, RecordDto};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::User;
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::errors::ErrorCode;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The acting user, placed in request extensions by the server's
/// authentication middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user = parts.extensions.get::<User>().cloned();
        let instance = parts.uri.path().to_owned();
        let request_id = request_id(&parts.headers);
        async move {
            user.map(CurrentUser).ok_or_else(|| {
                ErrorCode::model_admin_auth_unauthenticated_v1.to_response(
                    "Authentication required",
                    &instance,
                    request_id,
                )
            })
        }
    }
}

fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// List records, honoring `p`, `q`, `o` and lookup parameters
pub async fn list_records(
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(user): CurrentUser,
    Listing(params): Listing,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    info!("Listing {} for {}: {:?}", svc.label(), user.username, params.pairs());

    match svc.list(&user, params.pairs()) {
        Ok(list) => Json(ChangeListDto::new(list, svc.urls().index_url(), &params)).into_response(),
        Err(DomainError::IncorrectLookupParameters { reason }) => {
            debug!(%reason, "incorrect lookup parameters, redirecting");
            found(&svc.urls().error_redirect_url())
        }
        Err(e) => map_domain_error(&e, uri.path(), request_id(&headers)).into_response(),
    }
}

/// Create a record, placing it in the tree for tree-backed types
pub async fn create_record(
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    headers: HeaderMap,
    Json(req): Json<CreateRecordReq>,
) -> Response {
    info!("Creating {} for {}: {:?}", svc.label(), user.username, req);

    let created = req
        .into_parts()
        .and_then(|(record, tree)| svc.create(&user, record, tree));
    match created {
        Ok(record) => created_json(RecordDto::from(record)).into_response(),
        Err(e) => map_domain_error(&e, uri.path(), request_id(&headers)).into_response(),
    }
}

/// Show one record to users allowed to inspect it
pub async fn inspect_record(
    Extension(svc): Extension<Arc<Service>>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    info!("Inspecting {} {} for {}", svc.label(), pk, user.username);

    match svc.inspect(&user, &pk) {
        Ok(record) => Json(RecordDto::from(record)).into_response(),
        Err(e) => map_domain_error(&e, uri.path(), request_id(&headers)).into_response(),
    }
}
