//! # Domain Types
//!
//! Row-shaped domain types used throughout the sales engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  1   * ┌─────────────────┐  *   1 ┌─────────────┐ │
//! │  │      Sale       │───────►│    SaleItem     │───────►│   Product   │ │
//! │  │  ─────────────  │        │  ─────────────  │        │  (catalog)  │ │
//! │  │  status         │        │  quantity       │        └──────┬──────┘ │
//! │  │  discount/tax   │        │  unit_price     │               │ 1      │
//! │  │  total          │        │  discount/total │               ▼ 1      │
//! │  └────────┬────────┘        └─────────────────┘        ┌─────────────┐ │
//! │           │ *                                          │  Inventory  │ │
//! │           ▼ 1                                          │  Record     │ │
//! │  ┌─────────────────┐                                   └─────────────┘ │
//! │  │    Customer     │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amount columns are stored as integer cents (`*_cents`) and exposed as
//! [`Money`] through accessor methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::status::SaleStatus;

// =============================================================================
// Catalog (read-only here)
// =============================================================================

/// A product as seen by the sales engine: existence, active flag and the
/// current list price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    /// Business code printed on documents.
    pub code: String,
    pub name: String,
    /// Current catalog price in cents.
    pub price_cents: i64,
    /// Inactive products cannot be added to sales.
    pub is_active: bool,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A customer reference. Sales may only be created for active customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Tax document (CPF/CNPJ or equivalent).
    pub document: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Inventory
// =============================================================================

/// Per-product stock record.
///
/// `quantity` may reach zero but is never driven below it by a sale.
/// `min_stock`/`max_stock` are informational thresholds for alerting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Whether `requested` units can be taken right now.
    #[inline]
    pub fn can_fulfil(&self, requested: i64) -> bool {
        self.quantity >= requested
    }

    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.min_stock
    }

    pub fn is_above_maximum(&self) -> bool {
        self.max_stock.is_some_and(|max| self.quantity > max)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The sale aggregate root.
///
/// Invariant: `total = subtotal - discount + tax`, where `subtotal` is the
/// sum of the item totals. Recomputed on every write that touches items or
/// these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    /// Owning salesperson (creator).
    pub user_id: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Human-facing sale number, e.g. `VD-1A2B3C4D`.
    pub fn number(&self) -> String {
        let short: String = self
            .id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect();
        format!("VD-{}", short.to_uppercase())
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line on a sale.
///
/// `unit_price_cents` is captured when the line is added and is not linked
/// to later catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    /// `quantity * unit_price - discount`, never negative.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A sale together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
