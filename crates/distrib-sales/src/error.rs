//! # Service and API Error Types
//!
//! `SalesError` is what the service layer returns; `ApiError` is what a
//! transport binding (HTTP handler, desktop command) hands to the client.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderLifecycle / LineItemManager                                       │
//! │       │                                                                 │
//! │       ├── CoreError (business rule)  ──┐                                │
//! │       ├── DbError   (storage)        ──┼──► SalesError                  │
//! │       └── ConfigError (startup)      ──┘        │                       │
//! │                                                 ▼                       │
//! │                                     ApiError { code, message, details } │
//! │                                                                         │
//! │  Domain errors keep their structure (shortages, current vs. allowed     │
//! │  statuses). Storage errors are logged and replaced with a generic       │
//! │  message.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use distrib_core::{CoreError, ValidationError};
use distrib_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by the sales service.
#[derive(Debug, Error)]
pub enum SalesError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ValidationError> for SalesError {
    fn from(err: ValidationError) -> Self {
        SalesError::Core(CoreError::Validation(err))
    }
}

impl SalesError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            SalesError::Core(err) => Some(err),
            _ => None,
        }
    }
}

pub type SalesResult<T> = Result<T, SalesError>;

// =============================================================================
// API Error
// =============================================================================

/// Error envelope returned to clients.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for 1 product(s)",
///   "details": { "items": [{ "productId": "…", "requested": 6, "available": 4 }] }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Structured data the client needs to correct the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Sale, item, customer or product not found (404)
    NotFound,

    /// Access policy rejected the caller (403)
    Forbidden,

    /// Operation not allowed in the sale's status (409)
    InvalidState,

    /// Not enough stock for one or more lines (409)
    InsufficientStock,

    /// Product already on the sale (409)
    DuplicateItem,

    /// Sale has no items (422)
    EmptySale,

    /// Computed amount negative or overflowed (422)
    InvalidAmount,

    /// Product exists but is not sold anymore (422)
    ProductInactive,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status a transport binding should use.
    pub const fn status_code(self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::InvalidState | ErrorCode::InsufficientStock | ErrorCode::DuplicateItem => {
                409
            }
            ErrorCode::EmptySale | ErrorCode::InvalidAmount | ErrorCode::ProductInactive => 422,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

/// Converts domain errors, keeping their structured detail.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
            CoreError::NotFound { entity, id } => ApiError::new(ErrorCode::NotFound, message)
                .with_details(json!({ "entity": entity, "id": id })),
            CoreError::ProductInactive(product_id) => {
                ApiError::new(ErrorCode::ProductInactive, message)
                    .with_details(json!({ "productId": product_id }))
            }
            // Only ids the caller already supplied; never the owner.
            CoreError::PermissionDenied { .. } => ApiError::new(ErrorCode::Forbidden, message),
            CoreError::InvalidStateTransition {
                sale_id,
                operation,
                current,
                allowed,
            } => {
                let allowed: Vec<&str> = allowed.iter().map(|s| s.as_str()).collect();
                ApiError::new(ErrorCode::InvalidState, message).with_details(json!({
                    "saleId": sale_id,
                    "operation": operation.to_string(),
                    "currentStatus": current.as_str(),
                    "allowedStatuses": allowed,
                }))
            }
            CoreError::InsufficientStock(shortages) => {
                let error = ApiError::new(ErrorCode::InsufficientStock, message);
                match serde_json::to_value(&shortages) {
                    Ok(items) => error.with_details(json!({ "items": items })),
                    Err(_) => error,
                }
            }
            CoreError::DuplicateItem {
                sale_id,
                product_id,
            } => ApiError::new(ErrorCode::DuplicateItem, message)
                .with_details(json!({ "saleId": sale_id, "productId": product_id })),
            CoreError::EmptySale(sale_id) => ApiError::new(ErrorCode::EmptySale, message)
                .with_details(json!({ "saleId": sale_id })),
            CoreError::InvalidAmount { field, .. } => ApiError::new(ErrorCode::InvalidAmount, message)
                .with_details(json!({ "field": field })),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, .. } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} already exists", field),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value out of range")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<SalesError> for ApiError {
    fn from(err: SalesError) -> Self {
        match err {
            SalesError::Core(e) => e.into(),
            SalesError::Db(e) => e.into(),
            SalesError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                ApiError::new(ErrorCode::Internal, "Service misconfigured")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
