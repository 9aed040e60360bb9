//! # Validation Module
//!
//! Field-level checks run before any transaction is opened.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request DTOs (distrib-sales)                                  │
//! │  └── THIS MODULE: ranges, lengths, id format, duplicates                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Lifecycle rules (distrib-sales)                               │
//! │  └── status gates, ownership, stock                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (quantity >= 0)                                              │
//! │  ├── UNIQUE (sale_id, product_id)                                       │
//! │  └── Foreign keys                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_CENTS, MAX_PAGE_SIZE, MAX_QUANTITY, NOTES_MAX_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifiers
// =============================================================================

/// Validates an entity id. Ids are UUID strings, used verbatim for lookups,
/// so surrounding whitespace is rejected rather than trimmed.
///
/// ```rust
/// use distrib_core::validation::validate_id;
///
/// assert!(validate_id("sale_id", "6f1c2b8e-9a43-4c55-8d1e-3b2a7c9d0e11").is_ok());
/// assert!(validate_id("sale_id", "").is_err());
/// assert!(validate_id("sale_id", "42").is_err());
/// assert!(validate_id("sale_id", " 6f1c2b8e-9a43-4c55-8d1e-3b2a7c9d0e11").is_err());
/// ```
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.trim() != value {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "surrounding whitespace".to_string(),
        });
    }

    Uuid::parse_str(value).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Validates optional free-text notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(text) if text.chars().count() > NOTES_MAX_LENGTH => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: NOTES_MAX_LENGTH,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_QUANTITY`]
///
/// ```rust
/// use distrib_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(10_001).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price in cents. Must be positive.
pub fn validate_unit_price(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a non-negative amount (discount, tax) in cents.
pub fn validate_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates and normalises paging parameters.
///
/// Returns `(page, limit)` with defaults applied.
pub fn validate_paging(
    page: Option<u32>,
    limit: Option<u32>,
    default_limit: u32,
) -> ValidationResult<(u32, u32)> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: i64::from(u32::MAX),
        });
    }

    let limit = limit.unwrap_or(default_limit);
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }

    Ok((page, limit))
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Rejects a batch of lines that names the same product twice.
pub fn validate_unique_products<'a, I>(product_ids: I) -> ValidationResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in product_ids {
        if !seen.insert(id) {
            return Err(ValidationError::Duplicate {
                field: "product_id".to_string(),
                value: id.to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
