//! # distrib-core: Pure Business Logic for Distrib Sales
//!
//! Pricing arithmetic, the sale status machine, the access policy and input
//! validation. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Distrib Sales Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 distrib-sales (SalesService)                    │    │
//! │  │    LineItemManager ──► OrderLifecycle ──► ApiError mapping      │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ distrib-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐  │    │
//! │  │   │  types  │ │ pricing │ │ status  │ │ policy  │ │validation│  │    │
//! │  │   │  Sale   │ │ totals  │ │ table   │ │ roles   │ │  ranges  │  │    │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘  │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 distrib-db (SQLite layer)                       │    │
//! │  │       sales, sale items, inventory ledger, catalog lookups      │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Sale, SaleItem, Product, Customer, InventoryRecord
//! - [`money`] - Integer-cent money type
//! - [`pricing`] - Line and sale totals
//! - [`status`] - Sale statuses and the transition table
//! - [`policy`] - Role/ownership access decisions
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use distrib_core::money::Money;
//! use distrib_core::pricing::{item_total, sale_total};
//!
//! let line = item_total(5, Money::from_cents(1000), Money::zero()).unwrap();
//! let total = sale_total(line, Money::from_cents(500), Money::from_cents(200)).unwrap();
//! assert_eq!(total.cents(), 4700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod pricing;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, StockShortage, ValidationError};
pub use money::Money;
pub use policy::{AccessPolicy, Actor, Role, RoleOwnershipPolicy, SaleAction};
pub use pricing::{DiscountKind, SaleTotals};
pub use status::{SaleOperation, SaleStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity on a single sale line.
pub const MAX_QUANTITY: i64 = 10_000;

/// Upper bound for any caller-supplied amount (price, discount, tax), in cents.
pub const MAX_AMOUNT_CENTS: i64 = 99_999_999;

/// Maximum length of sale notes, in characters.
pub const NOTES_MAX_LENGTH: usize = 1_000;

/// Page size used when a listing request omits `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: u32 = 100;
