//! # Line-Item Manager
//!
//! Add, update and remove lines on an editable sale, plus the sale-level
//! field edits. Every mutation recomputes the sale's totals from its items
//! and writes the item and the sale in one unit of work.
//!
//! ## Add Item
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate request                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ── load sale ── authorize(Edit) ── status ∈ {Draft, Pending}?    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product exists? active? ── already on sale? ── stock ≥ quantity?       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unit price = request or catalog price (frozen on the item)             │
//! │  insert item ── SaleTotals::apply ── update sale ── COMMIT              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check here is a pre-check; the authoritative one runs at
//! confirmation. Items on an unconfirmed sale never hold stock, so removal
//! leaves the ledger alone.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::{AddItemRequest, UpdateItemRequest, UpdateSaleRequest};
use crate::error::{SalesError, SalesResult};
use crate::guard::{ensure_permitted, load_sale, save_sale};
use distrib_core::pricing::{self, DiscountKind, SaleTotals};
use distrib_core::validation::validate_id;
use distrib_core::{
    AccessPolicy, Actor, CoreError, Money, SaleAction, SaleItem, SaleOperation, SaleWithItems,
    StockShortage,
};
use distrib_db::{Database, DbError, UnitOfWork};

/// Item and field edits on draft and pending sales.
#[derive(Clone)]
pub struct LineItemManager {
    db: Database,
    policy: Arc<dyn AccessPolicy>,
}

impl std::fmt::Debug for LineItemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineItemManager")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl LineItemManager {
    pub fn new(db: Database, policy: Arc<dyn AccessPolicy>) -> Self {
        LineItemManager { db, policy }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Adds a product line to the sale.
    ///
    /// ## Errors
    /// - `InvalidStateTransition` unless the sale is draft or pending
    /// - `NotFound` / `ProductInactive` for an unknown or retired product
    /// - `DuplicateItem` if the product is already on the sale
    /// - `InsufficientStock` if fewer units are on hand than requested
    pub async fn add_item(
        &self,
        actor: &Actor,
        sale_id: &str,
        request: AddItemRequest,
    ) -> SalesResult<SaleWithItems> {
        validate_id("sale_id", sale_id)?;
        request.validate()?;

        let mut uow = self.db.begin().await?;
        let mut sale =
            load_sale(&mut uow, self.policy.as_ref(), actor, SaleAction::Edit, sale_id).await?;
        ensure_permitted(&sale, SaleOperation::Edit)?;

        let mut items = uow.items(&sale.id).await?;
        if items.iter().any(|i| i.product_id == request.product_id) {
            return Err(CoreError::DuplicateItem {
                sale_id: sale.id,
                product_id: request.product_id,
            }
            .into());
        }

        let item = prepare_item(&mut uow, &sale.id, &request, Utc::now()).await?;
        uow.insert_item(&item)
            .await
            .map_err(|e| duplicate_or(e, &sale.id, &item.product_id))?;

        items.push(item);
        SaleTotals::apply(&mut sale, &items)?;
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(
            sale_id = %sale.id,
            product_id = %request.product_id,
            quantity = request.quantity,
            total_cents = sale.total_cents,
            "Item added"
        );
        Ok(SaleWithItems { sale, items })
    }

    /// Changes quantity, unit price or discount of a line.
    ///
    /// A quantity change re-checks stock against the ledger.
    pub async fn update_item(
        &self,
        actor: &Actor,
        sale_id: &str,
        item_id: &str,
        request: UpdateItemRequest,
    ) -> SalesResult<SaleWithItems> {
        validate_id("sale_id", sale_id)?;
        validate_id("item_id", item_id)?;
        request.validate()?;

        let mut uow = self.db.begin().await?;
        let mut sale =
            load_sale(&mut uow, self.policy.as_ref(), actor, SaleAction::Edit, sale_id).await?;
        ensure_permitted(&sale, SaleOperation::Edit)?;

        let mut items = uow.items(&sale.id).await?;
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::not_found("Sale item", item_id))?;

        if let Some(quantity) = request.quantity {
            if quantity != item.quantity {
                let available = uow.available(&item.product_id).await?;
                if available < quantity {
                    return Err(CoreError::InsufficientStock(vec![StockShortage::new(
                        item.product_id.clone(),
                        quantity,
                        available,
                    )])
                    .into());
                }
            }
            item.quantity = quantity;
        }
        if let Some(price) = request.unit_price_cents {
            item.unit_price_cents = price;
        }
        if let Some(discount) = request.discount_cents {
            item.discount_cents = discount;
        }
        item.total_cents = pricing::item_total(item.quantity, item.unit_price(), item.discount())?
            .cents();
        item.updated_at = Utc::now();

        if !uow.update_item(item).await? {
            return Err(CoreError::not_found("Sale item", item_id).into());
        }

        SaleTotals::apply(&mut sale, &items)?;
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(sale_id = %sale.id, item_id, total_cents = sale.total_cents, "Item updated");
        Ok(SaleWithItems { sale, items })
    }

    /// Removes a line. Fails if the result would leave the sale discount
    /// larger than the remaining subtotal plus tax.
    pub async fn remove_item(
        &self,
        actor: &Actor,
        sale_id: &str,
        item_id: &str,
    ) -> SalesResult<SaleWithItems> {
        validate_id("sale_id", sale_id)?;
        validate_id("item_id", item_id)?;

        let mut uow = self.db.begin().await?;
        let mut sale =
            load_sale(&mut uow, self.policy.as_ref(), actor, SaleAction::Edit, sale_id).await?;
        ensure_permitted(&sale, SaleOperation::Edit)?;

        let mut items = uow.items(&sale.id).await?;
        let position = items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::not_found("Sale item", item_id))?;
        let removed = items.remove(position);

        SaleTotals::apply(&mut sale, &items)?;
        if !uow.delete_item(&sale.id, &removed.id).await? {
            return Err(CoreError::not_found("Sale item", item_id).into());
        }
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(
            sale_id = %sale.id,
            product_id = %removed.product_id,
            total_cents = sale.total_cents,
            "Item removed"
        );
        Ok(SaleWithItems { sale, items })
    }

    // =========================================================================
    // Sale fields
    // =========================================================================

    /// Changes customer, notes, discount or tax.
    pub async fn update_sale(
        &self,
        actor: &Actor,
        sale_id: &str,
        request: UpdateSaleRequest,
    ) -> SalesResult<SaleWithItems> {
        validate_id("sale_id", sale_id)?;
        request.validate()?;

        let mut uow = self.db.begin().await?;
        let mut sale =
            load_sale(&mut uow, self.policy.as_ref(), actor, SaleAction::Edit, sale_id).await?;
        ensure_permitted(&sale, SaleOperation::Edit)?;

        if let Some(customer_id) = request.customer_id {
            if customer_id != sale.customer_id {
                match uow.customer(&customer_id).await? {
                    Some(customer) if customer.is_active => sale.customer_id = customer.id,
                    _ => return Err(CoreError::not_found("Customer", customer_id).into()),
                }
            }
        }
        if let Some(notes) = request.notes {
            sale.notes = normalize_notes(Some(notes));
        }
        if let Some(discount) = request.discount_cents {
            sale.discount_cents = discount;
        }
        if let Some(tax) = request.tax_cents {
            sale.tax_cents = tax;
        }

        let items = uow.items(&sale.id).await?;
        SaleTotals::apply(&mut sale, &items)?;
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(sale_id = %sale.id, total_cents = sale.total_cents, "Sale updated");
        Ok(SaleWithItems { sale, items })
    }

    /// Sets the sale discount from a percentage of the current subtotal or
    /// a fixed amount.
    pub async fn apply_discount(
        &self,
        actor: &Actor,
        sale_id: &str,
        discount: DiscountKind,
    ) -> SalesResult<SaleWithItems> {
        validate_id("sale_id", sale_id)?;

        let mut uow = self.db.begin().await?;
        let mut sale =
            load_sale(&mut uow, self.policy.as_ref(), actor, SaleAction::Edit, sale_id).await?;
        ensure_permitted(&sale, SaleOperation::Edit)?;

        let items = uow.items(&sale.id).await?;
        let amount = discount.amount(pricing::subtotal(&items)?)?;
        sale.discount_cents = amount.cents();

        SaleTotals::apply(&mut sale, &items)?;
        save_sale(&mut uow, &mut sale).await?;
        uow.commit().await?;

        info!(
            sale_id = %sale.id,
            discount_cents = sale.discount_cents,
            total_cents = sale.total_cents,
            "Discount applied"
        );
        Ok(SaleWithItems { sale, items })
    }
}

// =============================================================================
// Helpers shared with OrderLifecycle
// =============================================================================

/// Builds a new line after checking the catalog and the ledger.
pub(crate) async fn prepare_item(
    uow: &mut UnitOfWork,
    sale_id: &str,
    request: &AddItemRequest,
    now: DateTime<Utc>,
) -> SalesResult<SaleItem> {
    let product = uow
        .product(&request.product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", &request.product_id))?;
    if !product.is_active {
        return Err(CoreError::ProductInactive(product.id).into());
    }

    let available = uow.available(&product.id).await?;
    if available < request.quantity {
        return Err(CoreError::InsufficientStock(vec![StockShortage::new(
            product.id,
            request.quantity,
            available,
        )])
        .into());
    }

    let unit_price = request
        .unit_price_cents
        .map(Money::from_cents)
        .unwrap_or_else(|| product.price());
    let discount = Money::from_cents(request.discount_cents);
    let total = pricing::item_total(request.quantity, unit_price, discount)?;

    debug!(product_id = %product.id, unit_price = %unit_price, "Line prepared");

    Ok(SaleItem {
        id: Uuid::new_v4().to_string(),
        sale_id: sale_id.to_string(),
        product_id: product.id,
        quantity: request.quantity,
        unit_price_cents: unit_price.cents(),
        discount_cents: discount.cents(),
        total_cents: total.cents(),
        created_at: now,
        updated_at: now,
    })
}

/// Blank notes are stored as NULL.
pub(crate) fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// A racing insert of the same product surfaces as a unique violation.
fn duplicate_or(err: DbError, sale_id: &str, product_id: &str) -> SalesError {
    if err.is_unique_violation_on("sale_items.product_id") {
        CoreError::DuplicateItem {
            sale_id: sale_id.to_string(),
            product_id: product_id.to_string(),
        }
        .into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_notes() {
        assert_eq!(normalize_notes(Some("  ".to_string())), None);
        assert_eq!(
            normalize_notes(Some(" Entregar pela manhã ".to_string())),
            Some("Entregar pela manhã".to_string())
        );
        assert_eq!(normalize_notes(None), None);
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_item() {
        let err = duplicate_or(
            DbError::duplicate("sale_items.sale_id, sale_items.product_id", "unknown"),
            "s-1",
            "p-1",
        );
        assert!(matches!(
            err,
            SalesError::Core(CoreError::DuplicateItem { .. })
        ));

        let err = duplicate_or(DbError::PoolExhausted, "s-1", "p-1");
        assert!(matches!(err, SalesError::Db(DbError::PoolExhausted)));
    }
}
