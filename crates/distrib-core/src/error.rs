//! # Error Types
//!
//! Domain error taxonomy for the sales engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  distrib-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Malformed or out-of-range input                 │
//! │                                                                         │
//! │  distrib-db errors                                                      │
//! │  └── DbError          - Storage failures                                │
//! │                                                                         │
//! │  distrib-sales errors                                                   │
//! │  ├── SalesError       - Core | Db                                       │
//! │  └── ApiError         - What the client sees (serialized)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is recoverable by the caller: it is never retried
//! internally and always carries enough detail (ids, current vs. expected
//! values) to correct the request and resubmit.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::status::{SaleOperation, SaleStatus};

// =============================================================================
// Stock Shortage
// =============================================================================

/// One line that cannot be satisfied from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockShortage {
    pub product_id: String,
    pub requested: i64,
    pub available: i64,
}

impl StockShortage {
    pub fn new(product_id: impl Into<String>, requested: i64, available: i64) -> Self {
        StockShortage {
            product_id: product_id.into(),
            requested,
            available,
        }
    }

    /// Units missing to satisfy the request.
    pub fn shortfall(&self) -> i64 {
        (self.requested - self.available).max(0)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the sales engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed field-level validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A sale, item, customer or product does not exist (or is inactive,
    /// for customers).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The product exists but is no longer sold.
    #[error("Product {0} is inactive")]
    ProductInactive(String),

    /// The access policy rejected the caller.
    #[error("User {user_id} may not {action} sale {sale_id}")]
    PermissionDenied {
        user_id: String,
        action: String,
        sale_id: String,
    },

    /// The operation is not allowed in the sale's current status.
    ///
    /// ## When This Occurs
    /// - Adding an item to a confirmed sale
    /// - Confirming a draft that was never submitted
    /// - Cancelling a completed sale
    #[error("Cannot {operation} sale {sale_id} in status {current}; allowed from {allowed:?}")]
    InvalidStateTransition {
        sale_id: String,
        operation: SaleOperation,
        current: SaleStatus,
        allowed: Vec<SaleStatus>,
    },

    /// One or more lines exceed the quantity on hand.
    #[error("Insufficient stock for {} product(s)", .0.len())]
    InsufficientStock(Vec<StockShortage>),

    /// The product is already a line on this sale.
    #[error("Product {product_id} is already on sale {sale_id}")]
    DuplicateItem { sale_id: String, product_id: String },

    /// Submit/confirm requires at least one item.
    #[error("Sale {0} has no items")]
    EmptySale(String),

    /// A computed amount fell below zero or overflowed.
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Builds the state error for `operation` from the transition table.
    pub fn invalid_state(
        sale_id: impl Into<String>,
        operation: SaleOperation,
        current: SaleStatus,
    ) -> Self {
        CoreError::InvalidStateTransition {
            sale_id: sale_id.into(),
            operation,
            current,
            allowed: operation.permitted_from(),
        }
    }

    pub fn negative_amount(field: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: "result would be negative".to_string(),
        }
    }

    pub fn overflow(field: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: "amount overflow".to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
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

    /// Same value given twice where uniqueness is required.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },

    /// A request that changes nothing.
    #[error("at least one field must be provided")]
    EmptyUpdate,

    /// Two fields that are individually valid but inconsistent together.
    #[error("{field}: {reason}")]
    Inconsistent { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_lists_allowed_statuses() {
        let err = CoreError::invalid_state("s-1", SaleOperation::Confirm, SaleStatus::Draft);
        match err {
            CoreError::InvalidStateTransition {
                current, allowed, ..
            } => {
                assert_eq!(current, SaleStatus::Draft);
                assert_eq!(allowed, vec![SaleStatus::Pending]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock(vec![
            StockShortage::new("p-1", 6, 4),
            StockShortage::new("p-2", 2, 0),
        ]);
        assert_eq!(err.to_string(), "Insufficient stock for 2 product(s)");

        let err = CoreError::not_found("Sale item", "i-9");
        assert_eq!(err.to_string(), "Sale item not found: i-9");
    }

    #[test]
    fn test_shortfall() {
        assert_eq!(StockShortage::new("p", 6, 4).shortfall(), 2);
        assert_eq!(StockShortage::new("p", 1, 4).shortfall(), 0);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core: CoreError = ValidationError::EmptyUpdate.into();
        assert!(matches!(core, CoreError::Validation(_)));
    }
}
