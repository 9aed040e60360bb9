//! # Unit of Work
//!
//! The transaction boundary for every multi-row mutation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut uow = db.begin().await?;      BEGIN + claim writer lock        │
//! │  let sale = uow.sale(id).await?;       reads see latest committed rows  │
//! │  uow.reserve(product, qty).await?;     guarded decrement                │
//! │  uow.update_sale(&sale).await?;                                         │
//! │  uow.commit().await?;                  COMMIT                           │
//! │                                                                         │
//! │  Any early return drops `uow` ──► ROLLBACK, nothing persisted           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite allows one writer at a time. `begin` claims the writer lock with
//! its first statement, before any read, so a concurrent unit of work
//! waits (up to the busy timeout) and then reads the state the first one
//! committed. Without that, a deferred transaction would read a snapshot
//! and fail with `SQLITE_BUSY_SNAPSHOT` when it later tried to write.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::inventory::{self, Reservation};
use crate::repository::{catalog, sale};
use distrib_core::{Customer, InventoryRecord, Product, Sale, SaleItem};

/// An open write transaction. Dropping it without [`commit`](Self::commit)
/// rolls back.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let mut tx = pool.begin().await?;

        // A write that matches nothing still takes the RESERVED lock.
        sqlx::query("UPDATE sales SET updated_at = updated_at WHERE 0")
            .execute(&mut *tx)
            .await?;

        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Explicit rollback. Equivalent to dropping, but surfaces errors.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!("Unit of work rolled back");
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn product(&mut self, id: &str) -> DbResult<Option<Product>> {
        catalog::fetch_product(&mut *self.tx, id).await
    }

    pub async fn customer(&mut self, id: &str) -> DbResult<Option<Customer>> {
        catalog::fetch_customer(&mut *self.tx, id).await
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn sale(&mut self, id: &str) -> DbResult<Option<Sale>> {
        sale::fetch_sale(&mut *self.tx, id).await
    }

    pub async fn items(&mut self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        sale::fetch_items(&mut *self.tx, sale_id).await
    }

    pub async fn item(&mut self, sale_id: &str, item_id: &str) -> DbResult<Option<SaleItem>> {
        sale::fetch_item(&mut *self.tx, sale_id, item_id).await
    }

    pub async fn insert_sale(&mut self, sale: &Sale) -> DbResult<()> {
        sale::insert_sale(&mut *self.tx, sale).await
    }

    pub async fn update_sale(&mut self, sale: &Sale) -> DbResult<bool> {
        sale::update_sale(&mut *self.tx, sale).await
    }

    pub async fn insert_item(&mut self, item: &SaleItem) -> DbResult<()> {
        sale::insert_item(&mut *self.tx, item).await
    }

    pub async fn update_item(&mut self, item: &SaleItem) -> DbResult<bool> {
        sale::update_item(&mut *self.tx, item).await
    }

    pub async fn delete_item(&mut self, sale_id: &str, item_id: &str) -> DbResult<bool> {
        sale::delete_item(&mut *self.tx, sale_id, item_id).await
    }

    // =========================================================================
    // Inventory ledger
    // =========================================================================

    pub async fn inventory(&mut self, product_id: &str) -> DbResult<Option<InventoryRecord>> {
        inventory::fetch_record(&mut *self.tx, product_id).await
    }

    /// On-hand quantity as seen inside this transaction.
    pub async fn available(&mut self, product_id: &str) -> DbResult<i64> {
        inventory::available(&mut *self.tx, product_id).await
    }

    /// Guarded decrement. A shortage leaves the record untouched.
    pub async fn reserve(&mut self, product_id: &str, amount: i64) -> DbResult<Reservation> {
        inventory::decrement(&mut self.tx, product_id, amount).await
    }

    /// Returns stock to the ledger.
    pub async fn release(&mut self, product_id: &str, amount: i64) -> DbResult<()> {
        inventory::increment(&mut *self.tx, product_id, amount).await
    }
}
