//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SalesService                                                           │
//! │       │                                                                 │
//! │       ├── db.sales().list(&query)          pool reads                   │
//! │       │                                                                 │
//! │       └── db.begin() ──► UnitOfWork        transactional reads/writes   │
//! │                │                                                        │
//! │                ▼                                                        │
//! │   catalog.rs   inventory.rs   sale.rs      (SQL lives only here)        │
//! │                │                                                        │
//! │                ▼                                                        │
//! │             SQLite                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Product and customer lookups
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock reads and manual adjustment
//! - [`SaleRepository`](sale::SaleRepository) - Sale reads and listing

pub mod catalog;
pub mod inventory;
pub mod sale;
