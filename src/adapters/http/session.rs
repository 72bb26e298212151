//! Session header extraction.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::error::ErrorResponse;

pub const SESSION_HEADER: &str = "x-session-id";

/// Reads the `X-Session-Id` header; a missing or non-UTF8 value is a
/// validation failure.
pub fn require_session_id(headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or_else(|| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new("X-Session-Id header is required")),
            )
                .into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn present_header_is_returned() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("session-1"));
        assert_eq!(require_session_id(&headers).unwrap(), "session-1");
    }

    #[test]
    fn missing_header_is_422() {
        let headers = HeaderMap::new();
        let response = require_session_id(&headers).unwrap_err();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn empty_header_is_422() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static(""));
        assert!(require_session_id(&headers).is_err());
    }
}
