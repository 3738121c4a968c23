use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Short aliases for JSON responses
pub type JsonBody<T> = Json<T>;
pub type JsonPage<T> = Json<listing_core::Page<T>>;

/// 200 OK + JSON
pub fn ok_json<T: serde::Serialize>(value: T) -> impl IntoResponse {
    (StatusCode::OK, Json(value))
}

/// 201 Created + JSON
pub fn created_json<T: serde::Serialize>(value: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(value))
}

/// 302 Found pointing at `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}
