//! # Sales Service
//!
//! Facade a transport binding holds: one database, one access policy, and
//! the two engines built on them.
//!
//! ```text
//! SalesService
//! ├── orders()      ──► OrderLifecycle   create / submit / confirm / complete / cancel
//! ├── line_items()  ──► LineItemManager  add / update / remove item, sale fields, discount
//! ├── get_sale / list_sales              pool reads, policy applied
//! └── validate_stock                     read-only stock preview
//! ```

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SalesConfig;
use crate::dto::{
    ListSalesRequest, Pagination, SaleListResponse, StockCheckLine, StockCheckResult,
    StockValidation,
};
use crate::error::SalesResult;
use crate::items::LineItemManager;
use crate::lifecycle::OrderLifecycle;
use distrib_core::validation::validate_id;
use distrib_core::{AccessPolicy, Actor, CoreError, RoleOwnershipPolicy, SaleAction, SaleWithItems};
use distrib_db::Database;

/// Entry point of the sales engine.
#[derive(Clone)]
pub struct SalesService {
    db: Database,
    config: SalesConfig,
    policy: Arc<dyn AccessPolicy>,
    orders: OrderLifecycle,
    line_items: LineItemManager,
}

impl std::fmt::Debug for SalesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SalesService {
    /// Opens the configured database (running migrations) with the default
    /// role/ownership policy.
    pub async fn connect(config: SalesConfig) -> SalesResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.db_path.display(), "Sales service connected");
        Ok(SalesService::new(db, config, Arc::new(RoleOwnershipPolicy)))
    }

    pub fn new(db: Database, config: SalesConfig, policy: Arc<dyn AccessPolicy>) -> Self {
        SalesService {
            orders: OrderLifecycle::new(db.clone(), Arc::clone(&policy)),
            line_items: LineItemManager::new(db.clone(), Arc::clone(&policy)),
            db,
            config,
            policy,
        }
    }

    pub fn orders(&self) -> &OrderLifecycle {
        &self.orders
    }

    pub fn line_items(&self) -> &LineItemManager {
        &self.line_items
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &SalesConfig {
        &self.config
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A sale with its items, if the actor may view it.
    pub async fn get_sale(&self, actor: &Actor, sale_id: &str) -> SalesResult<SaleWithItems> {
        validate_id("sale_id", sale_id)?;

        let sale = self
            .db
            .sales()
            .get_with_items(sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        self.policy
            .authorize(actor, SaleAction::View, &sale.sale.id, &sale.sale.user_id)?;
        Ok(sale)
    }

    /// Filtered, paginated listing with summary figures.
    ///
    /// Actors restricted by the policy only ever see their own sales,
    /// whatever owner filter they pass.
    pub async fn list_sales(
        &self,
        actor: &Actor,
        request: ListSalesRequest,
    ) -> SalesResult<SaleListResponse> {
        let mut query = request.into_query(self.config.default_page_size)?;
        if self.policy.restrict_to_own(actor) {
            query.filter.user_id = Some(actor.user_id.clone());
        }

        let page = self.db.sales().list(&query).await?;
        debug!(total = page.total, returned = page.sales.len(), "Sales listed");

        Ok(SaleListResponse {
            pagination: Pagination::new(query.page, query.limit, page.total),
            data: page.sales,
            summary: page.summary,
        })
    }

    /// Read-only preview of whether the ledger covers the given lines.
    ///
    /// Nothing is reserved; a later confirmation re-checks.
    pub async fn validate_stock(&self, lines: &[StockCheckLine]) -> SalesResult<StockValidation> {
        let catalog = self.db.catalog();
        let inventory = self.db.inventory();

        let mut results = Vec::with_capacity(lines.len());
        for line in lines {
            let product = catalog.get_product(&line.product_id).await?;
            let available = match &product {
                Some(_) => inventory.available(&line.product_id).await?,
                None => 0,
            };

            let reason = match product {
                None => Some("Product not found"),
                Some(p) if !p.is_active => Some("Product is inactive"),
                Some(_) if line.quantity <= 0 => Some("Quantity must be positive"),
                Some(_) if available < line.quantity => Some("Insufficient stock"),
                Some(_) => None,
            };

            results.push(StockCheckResult {
                product_id: line.product_id.clone(),
                requested: line.quantity,
                available,
                valid: reason.is_none(),
                reason: reason.map(str::to_string),
            });
        }

        let can_proceed = results.iter().all(|r| r.valid);
        Ok(StockValidation {
            items: results,
            can_proceed,
        })
    }
}
