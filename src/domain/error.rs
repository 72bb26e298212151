//! Error types for the parcel domain.

use thiserror::Error;

/// Domain and infrastructure errors surfaced by the core.
///
/// The first group maps one-to-one onto HTTP statuses (see the HTTP adapter);
/// the second group wraps transport failures from the database, cache, broker,
/// and document store.
#[derive(Debug, Clone, Error)]
pub enum ParcelError {
    #[error("Parcel not found")]
    ParcelNotFound,

    #[error("Parcel already exists")]
    ParcelAlreadyExists,

    #[error("Parcel is already bound to a company")]
    AlreadyBound,

    #[error("Transport company not found")]
    CompanyNotFound,

    #[error("Access to parcel denied")]
    AccessDenied,

    #[error("Duplicate outbox event")]
    OutboxDuplicate,

    #[error("Failed to persist outbox event: {0}")]
    OutboxPersistence(String),

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Broker error: {0}")]
    Broker(String),

    #[error("Broker connection error: {0}")]
    BrokerConnection(String),

    #[error("Document store error: {0}")]
    DocumentStore(String),
}

impl ParcelError {
    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ParcelError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when the broker link itself failed (connect, channel, or confirm
    /// transport). A rejected single message is `Broker`, not a connection
    /// failure, and does not warrant breaking a publish batch.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ParcelError::BrokerConnection(_))
    }
}

impl From<sqlx::Error> for ParcelError {
    fn from(err: sqlx::Error) -> Self {
        ParcelError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for ParcelError {
    fn from(err: redis::RedisError) -> Self {
        ParcelError::Cache(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_field_and_message() {
        let err = ParcelError::validation("weight_kg", "must be between 0.01 and 100");
        assert_eq!(
            format!("{}", err),
            "Validation failed for 'weight_kg': must be between 0.01 and 100"
        );
    }

    #[test]
    fn only_connection_failures_count_as_connection_errors() {
        assert!(ParcelError::BrokerConnection("connection reset".into()).is_connection_error());
        assert!(!ParcelError::Broker("message nacked".into()).is_connection_error());
        assert!(!ParcelError::ParcelNotFound.is_connection_error());
    }
}
