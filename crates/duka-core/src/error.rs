//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  duka-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  duka-api errors (in app)                                              │
//! │  └── ApiError         - What the client sees (status + JSON body)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, held order id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to exactly one HTTP status class

use thiserror::Error;

use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more products in a cart could not be resolved.
    ///
    /// ## When This Occurs
    /// - A sale or held order references product ids that don't exist
    ///
    /// Every missing id is reported, not just the first one, so the cashier
    /// can fix the whole cart in one go.
    #[error("Products not found with IDs: [{}]", .ids.join(", "))]
    ProductsNotFound { ids: Vec<String> },

    /// A single referenced entity does not exist.
    ///
    /// ## When This Occurs
    /// - Unknown customer on a sale or held order
    /// - Unknown held order id on update/delete/resume
    /// - Product without a stock row
    #[error("{entity} not found with ID: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller does not own the resource it is acting on.
    ///
    /// ## When This Occurs
    /// - Cashier B tries to update, delete or resume cashier A's held order
    #[error("Access denied: {reason}")]
    Forbidden { reason: String },

    /// Not enough stock on hand (only raised under the `reject` oversell
    /// policy; the default policy clamps to zero instead).
    #[error("Insufficient stock for product {product_id}: requested {requested}")]
    InsufficientStock {
        product_id: String,
        requested: Quantity,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a Forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request doesn't meet requirements. They are
/// raised before any lookup or persistence happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value carries more decimal places than allowed.
    #[error("{field} must have at most {max_scale} decimal places")]
    TooPrecise { field: String, max_scale: u32 },

    /// A discount is larger than the amount it applies to.
    #[error("{field} cannot exceed {limit}")]
    ExceedsLimit { field: String, limit: String },

    /// A value, or a total derived from it, is too large to represent.
    ///
    /// ## When This Occurs
    /// - price × quantity or a running total overflows the decimal range
    /// - A quantity does not fit the stock ledger's integer storage
    #[error("{field} is out of range")]
    OutOfRange { field: String },
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
    fn test_products_not_found_lists_every_id() {
        let err = CoreError::ProductsNotFound {
            ids: vec!["999".to_string(), "1000".to_string()],
        };
        assert_eq!(err.to_string(), "Products not found with IDs: [999, 1000]");
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::not_found("Customer", "c-1");
        assert_eq!(err.to_string(), "Customer not found with ID: c-1");

        let err = CoreError::forbidden("held order belongs to another user");
        assert_eq!(
            err.to_string(),
            "Access denied: held order belongs to another user"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::TooPrecise {
            field: "items[0].quantity".to_string(),
            max_scale: 3,
        };
        assert_eq!(
            err.to_string(),
            "items[0].quantity must have at most 3 decimal places"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
