use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use thiserror::Error;
use url::form_urlencoded;

use crate::api::problem::{bad_request, ProblemResponse};

pub const MAX_QUERY_LEN: usize = 8 * 1024;
pub const MAX_PARAMS: usize = 64;
pub const MAX_KEY_LEN: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingParamsError {
    #[error("query string too long")]
    TooLong,
    #[error("too many query parameters")]
    TooMany,
    #[error("query parameter name too long")]
    KeyTooLong,
}

/// Decoded query-string pairs of a result-list request, in arrival order.
///
/// Interpretation (which keys are reserved, which are lookups) is left to the
/// module; this type only enforces size budgets and offers query-string
/// rewriting for pagination and sort links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingParams {
    pairs: Vec<(String, String)>,
}

impl ListingParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Decode `a=1&b=2` (without the leading `?`) and enforce budgets.
    pub fn parse(raw: &str) -> Result<Self, ListingParamsError> {
        if raw.len() > MAX_QUERY_LEN {
            return Err(ListingParamsError::TooLong);
        }
        let mut pairs = Vec::new();
        for (k, v) in form_urlencoded::parse(raw.as_bytes()) {
            if k.is_empty() {
                continue;
            }
            if k.len() > MAX_KEY_LEN {
                return Err(ListingParamsError::KeyTooLong);
            }
            if pairs.len() == MAX_PARAMS {
                return Err(ListingParamsError::TooMany);
            }
            pairs.push((k.into_owned(), v.into_owned()));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Last value for `key`; repeated keys follow last-write-wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Copy with every occurrence of `key` replaced by a single `key=value`
    /// at the position of its first occurrence (or appended).
    #[must_use]
    pub fn with(&self, key: &str, value: impl Into<String>) -> Self {
        let mut value = Some(value.into());
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        for (k, v) in &self.pairs {
            if k == key {
                if let Some(v) = value.take() {
                    pairs.push((k.clone(), v));
                }
            } else {
                pairs.push((k.clone(), v.clone()));
            }
        }
        if let Some(v) = value {
            pairs.push((key.to_owned(), v));
        }
        Self { pairs }
    }

    /// Copy without any of `keys`.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// `?a=1&b=2`, or an empty string when there are no pairs.
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let mut ser = form_urlencoded::Serializer::for_suffix(String::from("?"), 1);
        for (k, v) in &self.pairs {
            ser.append_pair(k, v);
        }
        ser.finish()
    }
}

/// Axum extractor for result-list query parameters.
/// Usage in handlers:
///   async fn list(Listing(params): Listing, /* ... */) { /* use `params` */ }
#[derive(Debug, Clone)]
pub struct Listing(pub ListingParams);

impl Listing {
    #[inline]
    pub fn into_inner(self) -> ListingParams {
        self.0
    }
}

impl Deref for Listing {
    type Target = ListingParams;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Listing
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let parsed = ListingParams::parse(parts.uri.query().unwrap_or(""));
        async move {
            parsed
                .map(Listing)
                .map_err(|e| bad_request(e.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod listing_tests;
