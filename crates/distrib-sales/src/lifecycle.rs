//! # Order Lifecycle
//!
//! The transition engine: moves a sale through its statuses and reserves
//! or releases stock at the `Confirmed` boundary.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft ─submit─► Pending ─confirm─► Confirmed ─complete─► Completed    │
//! │     │                 │                  │                              │
//! │     └─────cancel──────┴──────cancel──────┴──► Cancelled                 │
//! │                                                                         │
//! │   confirm:  reserve every line (guarded decrement), all or nothing      │
//! │   cancel:   release every line, only if the sale was Confirmed          │
//! │   Refunded: reserved, no operation produces it                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Each transition is one `UnitOfWork`. A confirmation that finds any
//! shortage drops the unit of work, so decrements already applied for
//! earlier lines roll back with it. Two confirmations touching the same
//! product serialize on SQLite's writer lock; the second one sees the
//! first one's decrements.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::CreateSaleRequest;
use crate::error::SalesResult;
use crate::guard::{ensure_permitted, load_sale, save_sale};
use crate::items::{normalize_notes, prepare_item};
use distrib_core::validation::validate_id;
use distrib_core::{
    AccessPolicy, Actor, CoreError, Sale, SaleAction, SaleOperation, SaleStatus, SaleTotals,
    SaleWithItems,
};
use distrib_db::{Database, Reservation, UnitOfWork};

/// Drives sales through their statuses.
#[derive(Clone)]
pub struct OrderLifecycle {
    db: Database,
    policy: Arc<dyn AccessPolicy>,
}

impl std::fmt::Debug for OrderLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLifecycle")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl OrderLifecycle {
    pub fn new(db: Database, policy: Arc<dyn AccessPolicy>) -> Self {
        OrderLifecycle { db, policy }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a draft sale owned by `actor`, with any supplied items.
    ///
    /// The customer must exist and be active. Items follow the same rules
    /// as `LineItemManager::add_item`. The sale and its items are written
    /// together or not at all.
    pub async fn create_sale(
        &self,
        actor: &Actor,
        request: CreateSaleRequest,
    ) -> SalesResult<SaleWithItems> {
        request.validate()?;

        let now = Utc::now();
        let mut sale = Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: request.customer_id.clone(),
            user_id: actor.user_id.clone(),
            status: SaleStatus::Draft,
            subtotal_cents: 0,
            discount_cents: request.discount_cents,
            tax_cents: request.tax_cents,
            total_cents: 0,
            notes: normalize_notes(request.notes.clone()),
            sale_date: now,
            created_at: now,
            updated_at: now,
            completed_at: None,
            cancelled_at: None,
        };
        self.policy
            .authorize(actor, SaleAction::Create, &sale.id, &sale.user_id)?;

        let mut uow = self.db.begin().await?;

        match uow.customer(&request.customer_id).await? {
            Some(customer) if customer.is_active => {}
            _ => return Err(CoreError::not_found("Customer", &request.customer_id).into()),
        }

        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            items.push(prepare_item(&mut uow, &sale.id, line, now).await?);
        }
        SaleTotals::apply(&mut sale, &items)?;

        uow.insert_sale(&sale).await?;
        for item in &items {
            uow.insert_item(item).await?;
        }
        uow.commit().await?;

        info!(
            sale_id = %sale.id,
            number = %sale.number(),
            user_id = %sale.user_id,
            items = items.len(),
            total_cents = sale.total_cents,
            "Sale created"
        );
        Ok(SaleWithItems { sale, items })
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// `Draft → Pending`. The sale needs at least one item.
    pub async fn submit(&self, actor: &Actor, sale_id: &str) -> SalesResult<SaleWithItems> {
        let (mut uow, mut sale) = self
            .open(actor, sale_id, SaleAction::Submit, SaleOperation::Submit)
            .await?;

        let items = uow.items(&sale.id).await?;
        if items.is_empty() {
            return Err(CoreError::EmptySale(sale.id).into());
        }

        let from = sale.status;
        sale.status = SaleStatus::Pending;
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(sale_id = %sale.id, from = %from, to = %sale.status, "Sale transitioned");
        Ok(SaleWithItems { sale, items })
    }

    /// `Pending → Confirmed`, reserving stock for every line.
    ///
    /// ## Errors
    /// - `EmptySale` if the sale has no items
    /// - `InsufficientStock` listing every line the ledger cannot cover;
    ///   nothing is decremented and the status is unchanged
    pub async fn confirm(&self, actor: &Actor, sale_id: &str) -> SalesResult<SaleWithItems> {
        let (mut uow, mut sale) = self
            .open(actor, sale_id, SaleAction::Confirm, SaleOperation::Confirm)
            .await?;

        let items = uow.items(&sale.id).await?;
        if items.is_empty() {
            return Err(CoreError::EmptySale(sale.id).into());
        }

        let mut shortages = Vec::new();
        for item in &items {
            if let Reservation::Short(shortage) = uow.reserve(&item.product_id, item.quantity).await? {
                shortages.push(shortage);
            }
        }
        if !shortages.is_empty() {
            warn!(
                sale_id = %sale.id,
                shortages = shortages.len(),
                "Confirmation rejected: insufficient stock"
            );
            // Dropping the unit of work undoes the lines already reserved.
            drop(uow);
            return Err(CoreError::InsufficientStock(shortages).into());
        }

        SaleTotals::apply(&mut sale, &items)?;
        let from = sale.status;
        sale.status = SaleStatus::Confirmed;
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(
            sale_id = %sale.id,
            from = %from,
            to = %sale.status,
            lines = items.len(),
            "Sale transitioned, stock reserved"
        );
        Ok(SaleWithItems { sale, items })
    }

    /// `Confirmed → Completed`. Stock was already taken at confirmation.
    pub async fn complete(&self, actor: &Actor, sale_id: &str) -> SalesResult<SaleWithItems> {
        let (mut uow, mut sale) = self
            .open(actor, sale_id, SaleAction::Complete, SaleOperation::Complete)
            .await?;

        let from = sale.status;
        sale.status = SaleStatus::Completed;
        sale.completed_at = Some(Utc::now());
        save_sale(&mut uow, &mut sale).await?;
        let items = uow.items(&sale.id).await?;
        uow.commit().await?;

        info!(sale_id = %sale.id, from = %from, to = %sale.status, "Sale transitioned");
        Ok(SaleWithItems { sale, items })
    }

    /// `{Draft, Pending, Confirmed} → Cancelled`.
    ///
    /// A confirmed sale returns every line's quantity to the ledger in the
    /// same unit of work as the status change.
    pub async fn cancel(&self, actor: &Actor, sale_id: &str) -> SalesResult<SaleWithItems> {
        let (mut uow, mut sale) = self
            .open(actor, sale_id, SaleAction::Cancel, SaleOperation::Cancel)
            .await?;

        let items = uow.items(&sale.id).await?;
        let from = sale.status;
        let release = from.holds_reservation();
        if release {
            for item in &items {
                uow.release(&item.product_id, item.quantity).await?;
            }
        }

        sale.status = SaleStatus::Cancelled;
        sale.cancelled_at = Some(Utc::now());
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(
            sale_id = %sale.id,
            from = %from,
            to = %sale.status,
            stock_released = release,
            "Sale transitioned"
        );
        Ok(SaleWithItems { sale, items })
    }

    /// Opens the unit of work, loads and authorizes the sale and checks the
    /// transition table.
    async fn open(
        &self,
        actor: &Actor,
        sale_id: &str,
        action: SaleAction,
        operation: SaleOperation,
    ) -> SalesResult<(UnitOfWork, Sale)> {
        validate_id("sale_id", sale_id)?;

        let mut uow = self.db.begin().await?;
        let sale = load_sale(&mut uow, self.policy.as_ref(), actor, action, sale_id).await?;
        ensure_permitted(&sale, operation)?;
        Ok((uow, sale))
    }
}
