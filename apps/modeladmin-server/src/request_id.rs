use axum::http::{HeaderName, Request};
use model_admin::api::rest::handlers::REQUEST_ID_HEADER;
use tower_http::request_id::{MakeRequestId, RequestId};

/// Header carrying the request id, read back by the REST handlers when they
/// build problem documents.
pub fn header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Hex uuid for requests that arrive without an id. Client ids are kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// The id already on `req`, if it is valid header text.
pub fn of<B>(req: &Request<B>) -> Option<&str> {
    req.headers().get(header()).and_then(|v| v.to_str().ok())
}
