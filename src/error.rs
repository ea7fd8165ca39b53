//! Error types for the invoice service
//!
//! Provides unified error handling using thiserror. The cache has no error
//! type: every cache operation is total.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error ==
/// Failure reported by a durable invoice store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert
    #[error("Duplicate mapping: order '{order_number}' / invoice {invoice_number}")]
    Conflict {
        order_number: String,
        invoice_number: i64,
    },

    /// The store could not be reached or failed the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true for uniqueness violations.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Convert sqlx errors to StoreError.
///
/// Only inserts can violate uniqueness; they map that case themselves since
/// they know which pair was rejected.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

// == Allocator Error ==
/// Failure to resolve an invoice number.
#[derive(Error, Debug)]
pub enum AllocatorError {
    /// Order number is empty or blank
    #[error("Invalid order number: {0:?}")]
    InvalidOrderNumber(String),

    /// The durable store failed; not retried
    #[error("Invoice store unavailable")]
    StoreUnavailable {
        #[source]
        source: StoreError,
    },

    /// Every attempt lost a race against another writer
    #[error("Could not allocate an invoice number for '{order_number}' after {attempts} attempts")]
    AllocationConflict {
        order_number: String,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// The highest issued invoice number has no successor
    #[error("Invoice numbers exhausted: highest issued is {max}")]
    SequenceExhausted { max: i64 },
}

impl From<StoreError> for AllocatorError {
    fn from(source: StoreError) -> Self {
        AllocatorError::StoreUnavailable { source }
    }
}

// == Source Error ==
/// Failure reported by the external order API.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request could not be completed
    #[error("Order API request failed: {0}")]
    Request(String),

    /// The response could not be understood
    #[error("Order API returned an unreadable response: {0}")]
    Decode(String),
}

// == API Error ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Allocation lost every retry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backing store is down
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The order API failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<AllocatorError> for ApiError {
    fn from(err: AllocatorError) -> Self {
        let message = match &err {
            AllocatorError::InvalidOrderNumber(_) | AllocatorError::SequenceExhausted { .. } => {
                err.to_string()
            }
            AllocatorError::StoreUnavailable { source }
            | AllocatorError::AllocationConflict { source, .. } => {
                format!("{}: {}", err, source)
            }
        };

        match err {
            AllocatorError::InvalidOrderNumber(_) => ApiError::InvalidRequest(message),
            AllocatorError::AllocationConflict { .. } => ApiError::Conflict(message),
            AllocatorError::StoreUnavailable { .. } => ApiError::Unavailable(message),
            AllocatorError::SequenceExhausted { .. } => ApiError::Internal(message),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_is_conflict() {
        let conflict = StoreError::Conflict {
            order_number: "A100".to_string(),
            invoice_number: 1,
        };
        assert!(conflict.is_conflict());
        assert!(!StoreError::Unavailable("down".to_string()).is_conflict());
    }

    #[test]
    fn test_allocator_error_keeps_cause() {
        use std::error::Error as _;

        let err = AllocatorError::from(StoreError::Unavailable("connection reset".to_string()));
        let source = err.source().expect("cause should be attached");
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (
                ApiError::from(AllocatorError::InvalidOrderNumber(" ".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(AllocatorError::AllocationConflict {
                    order_number: "A100".to_string(),
                    attempts: 3,
                    source: StoreError::Conflict {
                        order_number: "A100".to_string(),
                        invoice_number: 7,
                    },
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(AllocatorError::from(StoreError::Unavailable(
                    "down".to_string(),
                ))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(SourceError::Request("timeout".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(AllocatorError::SequenceExhausted { max: i64::MAX }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should map to correct HTTP status"
            );
        }
    }

    #[test]
    fn test_unavailable_message_includes_cause() {
        let err = ApiError::from(AllocatorError::from(StoreError::Unavailable(
            "disk I/O error".to_string(),
        )));
        assert!(err.to_string().contains("disk I/O error"));
    }
}
