//! # distrib-db: Database Layer for Distrib Sales
//!
//! SQLite storage for sales, sale items, the inventory ledger and catalog
//! lookups, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  distrib-sales (LineItemManager, OrderLifecycle)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   distrib-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐     │    │
//! │  │   │   Database    │   │ Repositories  │   │  UnitOfWork   │     │    │
//! │  │   │   (pool.rs)   │◄──│ catalog       │   │ (transaction) │     │    │
//! │  │   │  SqlitePool   │   │ inventory     │◄──│ reserve()     │     │    │
//! │  │   │  migrations   │   │ sale          │   │ release()     │     │    │
//! │  │   └───────────────┘   └───────────────┘   └───────────────┘     │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use distrib_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./distrib.db")).await?;
//! let on_hand = db.inventory().available(&product_id).await?;
//!
//! let mut uow = db.begin().await?;
//! uow.reserve(&product_id, 2).await?;
//! uow.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

pub use repository::catalog::CatalogRepository;
pub use repository::inventory::{InventoryRepository, Reservation};
pub use repository::sale::{
    SaleFilter, SalePage, SaleQuery, SaleRepository, SaleSort, SaleSummary, SortOrder,
};
