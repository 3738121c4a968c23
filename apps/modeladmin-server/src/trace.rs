//! Per-request span naming the admin a request is for.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Request, Response};
use model_admin::AdminRegistry;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::field::Empty;
use tracing::Span;

use crate::request_id;

/// Opens an `admin_request` span. `admin` is the label of the model admin
/// whose index URL prefixes the path; `user` is filled in by the auth
/// middleware, `status` and `latency_ms` by [`RecordOutcome`].
#[derive(Clone, Debug)]
pub struct AdminSpan {
    /// (index URL, admin label), longest index first.
    indexes: Arc<Vec<(String, String)>>,
}

impl AdminSpan {
    pub fn new(registry: &AdminRegistry) -> Self {
        let mut indexes: Vec<(String, String)> = registry
            .iter()
            .map(|svc| (svc.urls().index_url().to_owned(), svc.label()))
            .collect();
        indexes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            indexes: Arc::new(indexes),
        }
    }

    pub fn admin_for(&self, path: &str) -> Option<&str> {
        self.indexes
            .iter()
            .find(|(index, _)| path.starts_with(index.as_str()))
            .map(|(_, label)| label.as_str())
    }
}

impl<B> MakeSpan<B> for AdminSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        let path = req.uri().path();
        let span = tracing::info_span!(
            "admin_request",
            method = %req.method(),
            path = %path,
            query = req.uri().query().unwrap_or(""),
            request_id = request_id::of(req).unwrap_or(""),
            admin = Empty,
            user = Empty,
            status = Empty,
            latency_ms = Empty
        );
        if let Some(label) = self.admin_for(path) {
            span.record("admin", label);
        }
        span
    }
}

/// Records the response status and latency on the request span.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordOutcome;

impl<B> OnResponse<B> for RecordOutcome {
    fn on_response(self, res: &Response<B>, latency: Duration, span: &Span) {
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        span.record("status", res.status().as_u16());
        span.record("latency_ms", latency_ms);
        tracing::debug!(parent: span, "request finished");
    }
}

pub type AdminTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, AdminSpan, DefaultOnRequest, RecordOutcome>;

pub fn layer(registry: &AdminRegistry) -> AdminTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(AdminSpan::new(registry))
        .on_response(RecordOutcome)
}
