//! # Error Types
//!
//! Domain-specific error types for hearth-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hearth-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures (per field)          │
//! │                                                                         │
//! │  hearth-db errors                                                      │
//! │  └── StoreError       - Record store failures                          │
//! │                                                                         │
//! │  hearth-server errors                                                  │
//! │  └── ApiError         - What the browser sees (JSON + status code)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                         StoreError ─┴──► ApiError → HTTP response      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with no cart lines.
    ///
    /// ## When This Occurs
    /// - `POST /api/orders` with `items: []`
    /// - Tender completed after the cart was cleared
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A cart operation referenced a product that is not in the cart.
    #[error("Product {product_id} is not in the cart")]
    NotInCart { product_id: i64 },

    /// Payment amount is invalid.
    ///
    /// ## User Workflow
    /// ```text
    /// Split payment: remaining 58.00
    ///      │
    ///      ▼
    /// Cashier enters 0 or 70.00
    ///      │
    ///      ▼
    /// InvalidPaymentAmount { reason: "must not exceed remaining 58.00" }
    /// ```
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Tender cannot complete in its current state.
    #[error("Payment cannot be completed: {reason}")]
    TenderIncomplete { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors. Every variant names the offending field so the
/// API can report it back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }

    /// Prefixes the field with its position in a list, e.g. `items[2].quantity`.
    pub fn at(self, prefix: &str, index: usize) -> Self {
        let rename = |field: String| format!("{}[{}].{}", prefix, index, field);
        match self {
            ValidationError::Required { field } => ValidationError::Required {
                field: rename(field),
            },
            ValidationError::TooLong { field, max } => ValidationError::TooLong {
                field: rename(field),
                max,
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: rename(field),
                min,
                max,
            },
            ValidationError::MustBePositive { field } => ValidationError::MustBePositive {
                field: rename(field),
            },
            ValidationError::MustNotBeNegative { field } => ValidationError::MustNotBeNegative {
                field: rename(field),
            },
            ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
                field: rename(field),
                reason,
            },
            ValidationError::NotAllowed { field, allowed } => ValidationError::NotAllowed {
                field: rename(field),
                allowed,
            },
            ValidationError::Duplicate { field, value } => ValidationError::Duplicate {
                field: rename(field),
                value,
            },
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");

        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1000 exceeds maximum allowed (999)");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");
        assert_eq!(err.field(), "sku");
    }

    #[test]
    fn test_field_path_prefix() {
        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .at("payments", 1);
        assert_eq!(err.field(), "payments[1].amount");
        assert_eq!(err.to_string(), "payments[1].amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
