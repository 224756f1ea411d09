//! Visitor identification.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;

pub const VISITOR_TOKEN_HEADER: &str = "x-visitor-token";
pub const VISITOR_TOKEN_COOKIE: &str = "visitor_token";
pub const FORWARDED_VISITOR_TOKEN_HEADER: &str = "x-forwarded-visitor-token";

/// Opaque visitor id used for unique visitor counting.
///
/// Taken from the `X-Visitor-Token` header, then the `visitor_token` cookie,
/// then `X-Forwarded-Visitor-Token`. Requests carrying none of these share
/// the empty id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorId(String);

impl VisitorId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let id = header_value(headers, VISITOR_TOKEN_HEADER)
            .or_else(|| cookie_value(headers, VISITOR_TOKEN_COOKIE))
            .or_else(|| header_value(headers, FORWARDED_VISITOR_TOKEN_HEADER))
            .unwrap_or_default();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for VisitorId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
