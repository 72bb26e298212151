//! Error-to-HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::ParcelError;

/// Uniform error body: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Maps a domain error to its response.
///
/// Infrastructure failures are collapsed into a generic 500 so transport
/// details never leak to clients.
pub fn handle_parcel_error(error: ParcelError) -> Response {
    let (status, message) = match &error {
        ParcelError::ParcelNotFound | ParcelError::CompanyNotFound => {
            (StatusCode::NOT_FOUND, error.to_string())
        }
        ParcelError::AlreadyBound
        | ParcelError::ParcelAlreadyExists
        | ParcelError::OutboxDuplicate => (StatusCode::CONFLICT, error.to_string()),
        ParcelError::AccessDenied => (StatusCode::FORBIDDEN, error.to_string()),
        ParcelError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
        ParcelError::OutboxPersistence(_)
        | ParcelError::Database(_)
        | ParcelError::Cache(_)
        | ParcelError::Broker(_)
        | ParcelError::BrokerConnection(_)
        | ParcelError::DocumentStore(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    };

    (status, Json(ErrorResponse::new(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_errors_map_to_404() {
        assert_eq!(
            handle_parcel_error(ParcelError::ParcelNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            handle_parcel_error(ParcelError::CompanyNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn conflict_errors_map_to_409() {
        assert_eq!(
            handle_parcel_error(ParcelError::AlreadyBound).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            handle_parcel_error(ParcelError::ParcelAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            handle_parcel_error(ParcelError::OutboxDuplicate).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn access_denied_maps_to_403() {
        assert_eq!(
            handle_parcel_error(ParcelError::AccessDenied).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn validation_maps_to_422() {
        let error = ParcelError::validation("weight_kg", "out of range");
        assert_eq!(
            handle_parcel_error(error).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn transport_errors_map_to_generic_500() {
        assert_eq!(
            handle_parcel_error(ParcelError::Database("connection refused".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            handle_parcel_error(ParcelError::OutboxPersistence("disk full".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            handle_parcel_error(ParcelError::BrokerConnection("reset".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
