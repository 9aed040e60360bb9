//! # distrib-sales: Order Lifecycle Service
//!
//! The sales engine's service layer. Request validation, status gates,
//! authorization and stock reservation are orchestrated here; the rules
//! live in `distrib-core` and every write goes through a `distrib-db`
//! unit of work.
//!
//! ## Module Organization
//! ```text
//! distrib_sales/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── service.rs      ◄─── SalesService facade, reads, stock preview
//! ├── lifecycle.rs    ◄─── OrderLifecycle: create and status transitions
//! ├── items.rs        ◄─── LineItemManager: item and sale field edits
//! ├── guard.rs        ◄─── load + authorize + status gate helpers
//! ├── dto.rs          ◄─── Request/response structs
//! ├── config.rs       ◄─── Environment configuration
//! ├── telemetry.rs    ◄─── tracing-subscriber setup
//! └── error.rs        ◄─── SalesError, ApiError
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use distrib_sales::{telemetry, SalesConfig, SalesService};
//! use distrib_sales::dto::{AddItemRequest, CreateSaleRequest};
//! use distrib_core::Actor;
//!
//! telemetry::init_tracing();
//! let service = SalesService::connect(SalesConfig::load()?).await?;
//! let actor = Actor::salesperson(user_id);
//!
//! let sale = service
//!     .orders()
//!     .create_sale(&actor, CreateSaleRequest {
//!         customer_id,
//!         items: vec![AddItemRequest::new(product_id, 5)],
//!         ..Default::default()
//!     })
//!     .await?;
//! service.orders().submit(&actor, &sale.sale.id).await?;
//! service.orders().confirm(&actor, &sale.sale.id).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
mod guard;
pub mod items;
pub mod lifecycle;
pub mod service;
pub mod telemetry;

pub use config::{ConfigError, SalesConfig};
pub use error::{ApiError, ErrorCode, SalesError, SalesResult};
pub use items::LineItemManager;
pub use lifecycle::OrderLifecycle;
pub use service::SalesService;
