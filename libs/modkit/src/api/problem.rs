use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details for HTTP APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence of the problem.
    pub detail: String,
    /// A URI reference that identifies the specific occurrence of the problem.
    pub instance: String,
    /// Machine-readable error code from the module's error catalog.
    pub code: String,
    /// Request / trace id for correlating with logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Field-level validation errors for 4xx problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub detail: String,
    /// JSON Pointer to the invalid location (e.g., "/fields/title").
    pub pointer: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Attach the id of the current tracing span, if one is entered.
    pub fn with_current_span(self) -> Self {
        match tracing::Span::current().id() {
            Some(id) => self.with_request_id(id.into_u64().to_string()),
            None => self,
        }
    }

    pub fn with_errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

pub fn bad_request(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail).into()
}

pub fn forbidden(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::FORBIDDEN, "Forbidden", detail).into()
}

pub fn not_found(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::NOT_FOUND, "Not Found", detail).into()
}

pub fn conflict(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::CONFLICT, "Conflict", detail).into()
}

pub fn internal_error(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        detail,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let p = Problem::new(StatusCode::FORBIDDEN, "Forbidden", "not allowed");
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn problem_builder_pattern() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Validation Failed", "bad input")
            .with_code("model_admin.validation.v1")
            .with_instance("/admin/modeladmin/blog/article/create")
            .with_request_id("req-1")
            .with_errors(vec![ValidationError {
                detail: "title is required".to_string(),
                pointer: "/fields/title".to_string(),
            }]);

        assert_eq!(p.status, 400);
        assert_eq!(p.code, "model_admin.validation.v1");
        assert_eq!(p.instance, "/admin/modeladmin/blog/article/create");
        assert_eq!(p.request_id.as_deref(), Some("req-1"));
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn serializes_type_key_and_skips_empty_optionals() {
        let p = Problem::new(StatusCode::NOT_FOUND, "Not Found", "gone").with_type("about:x");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "about:x");
        assert!(json.get("request_id").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn unknown_status_falls_back_to_500() {
        let mut p = Problem::new(StatusCode::OK, "x", "y");
        p.status = 1000;
        assert_eq!(p.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(bad_request("x").0.status, 400);
        assert_eq!(forbidden("x").0.status, 403);
        assert_eq!(not_found("x").0.status, 404);
        assert_eq!(conflict("x").0.status, 409);
        assert_eq!(internal_error("x").0.title, "Internal Server Error");
    }
}
