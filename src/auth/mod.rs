//! API key authentication.
//!
//! Keys are compared in constant time.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware rejecting requests that do not present `expected_psk`.
///
/// With no key configured every request passes (dev mode).
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let verdict = presented_key(request.headers()).map(|key| keys_match(key, &expected));
    match verdict {
        Some(true) => next.run(request).await,
        Some(false) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing API key"),
    }
}

/// The key from `x-api-key`, else from an `Authorization: Bearer` header.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    tracing::debug!("Rejected request: {}", message);
    AppError::Unauthorized(message.to_string()).into_response()
}
