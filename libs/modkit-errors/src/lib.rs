//! Runtime helpers for catalog-driven Problem building.
//!
//! Modules declare their error catalog as `ErrDef` constants and turn them
//! into RFC 9457 problems at the REST boundary.
use http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};

/// Base URL under which catalog error types are documented.
pub const ERROR_TYPE_BASE: &str = "https://errors.example.com/";

/// Static error definition from catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }

    /// Full response with request context, as handlers return it.
    pub fn to_response(
        &self,
        detail: impl Into<String>,
        instance: &str,
        request_id: Option<String>,
    ) -> ProblemResponse {
        let mut p = self.to_problem(detail).with_instance(instance);
        if let Some(id) = request_id {
            p = p.with_request_id(id);
        }
        p.into()
    }
}

/// Declare an `ErrDef` constant whose type URL is derived from its code.
///
/// ```ignore
/// err_def!(NOT_FOUND, 404, "Not Found", "model_admin.record.not_found.v1");
/// ```
#[macro_export]
macro_rules! err_def {
    ($name:ident, $status:expr, $title:literal, $code:literal) => {
        pub const $name: $crate::ErrDef = $crate::ErrDef {
            status: $status,
            title: $title,
            code: $code,
            type_url: concat!("https://errors.example.com/", $code),
        };
    };
}
