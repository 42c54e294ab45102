//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Hearth POS                             │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  fetch('/api/orders', POST)                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── StoreError::Io(..) ────────────┐              │  │
//! │  │         │                                          │              │  │
//! │  │         ▼                                          ▼              │  │
//! │  │  Validation Error? ─── CoreError::Validation ─── ApiError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 400 {"code":"VALIDATION_ERROR","message":..,"field":..} ──────  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use hearth_core::{CoreError, ValidationError};
use hearth_db::StoreError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "items[0].quantity must be between 1 and 999",
///   "field": "items[0].quantity"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Offending request field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing or bad credentials (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound,

    /// Unique field already taken (409)
    Duplicate,

    /// Record store failed (500)
    StorageError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Duplicate => StatusCode::CONFLICT,
            ErrorCode::StorageError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        let code = match err {
            ValidationError::Duplicate { .. } => ErrorCode::Duplicate,
            _ => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string()).with_field(field)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::EmptyCart => ApiError::validation(err.to_string()).with_field("items"),
            CoreError::CartTooLarge { .. } => {
                ApiError::validation(err.to_string()).with_field("items")
            }
            CoreError::QuantityTooLarge { .. } => {
                ApiError::validation(err.to_string()).with_field("quantity")
            }
            CoreError::InvalidPaymentAmount { .. } => {
                ApiError::validation(err.to_string()).with_field("amount")
            }
            CoreError::NotInCart { .. } | CoreError::TenderIncomplete { .. } => {
                ApiError::validation(err.to_string())
            }
        }
    }
}

/// Converts record store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => ApiError::not_found(&entity),
            StoreError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            )
            .with_field(field),
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Record store operation failed");
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text()).with_field("id")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found: ApiError = StoreError::not_found("Product", 7).into();
        assert_eq!(not_found.code.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.message, "Product not found");

        let duplicate: ApiError = StoreError::duplicate("sku", "CC001").into();
        assert_eq!(duplicate.code.status(), StatusCode::CONFLICT);
        assert_eq!(duplicate.field.as_deref(), Some("sku"));

        let io: ApiError =
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")).into();
        assert_eq!(io.code, ErrorCode::StorageError);
        assert_eq!(io.message, "Storage operation failed");
    }

    #[test]
    fn test_validation_carries_field() {
        let err: ApiError = CoreError::from(
            ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .at("payments", 1),
        )
        .into();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("payments[1].amount"));

        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_empty_cart_is_bad_request() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("items"));
    }
}
