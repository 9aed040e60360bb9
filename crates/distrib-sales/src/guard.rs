//! Shared steps every mutating operation runs inside its unit of work.
//!
//! ```text
//! load_sale ──► NotFound?  ──► policy.authorize ──► ensure_permitted ──► …
//!                                                                        │
//!                                             save_sale ◄── mutate ◄─────┘
//! ```

use chrono::Utc;

use crate::error::SalesResult;
use distrib_core::{AccessPolicy, Actor, CoreError, CoreResult, Sale, SaleAction, SaleOperation};
use distrib_db::UnitOfWork;

/// Loads the sale inside `uow` and checks the actor may perform `action`.
///
/// Runs before any write so a denied caller changes nothing.
pub(crate) async fn load_sale(
    uow: &mut UnitOfWork,
    policy: &dyn AccessPolicy,
    actor: &Actor,
    action: SaleAction,
    sale_id: &str,
) -> SalesResult<Sale> {
    let sale = uow
        .sale(sale_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

    policy.authorize(actor, action, &sale.id, &sale.user_id)?;
    Ok(sale)
}

/// Checks the transition table for `operation` in the sale's status.
pub(crate) fn ensure_permitted(sale: &Sale, operation: SaleOperation) -> CoreResult<()> {
    if operation.is_permitted_in(sale.status) {
        Ok(())
    } else {
        Err(CoreError::invalid_state(&sale.id, operation, sale.status))
    }
}

/// Stamps `updated_at` and writes the sale row.
pub(crate) async fn save_sale(uow: &mut UnitOfWork, sale: &mut Sale) -> SalesResult<()> {
    sale.updated_at = Utc::now();
    if !uow.update_sale(sale).await? {
        return Err(CoreError::not_found("Sale", &sale.id).into());
    }
    Ok(())
}
