//! # Inventory Ledger
//!
//! One stock record per product, mutated only by relative, guarded
//! statements so concurrent writers can never lose an update or drive the
//! quantity below zero.
//!
//! ## Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE inventory                                                       │
//! │     SET quantity = quantity - :n                                        │
//! │   WHERE product_id = :p AND quantity >= :n                              │
//! │                                                                         │
//! │  rows_affected = 1  ──► Reservation::Reserved                           │
//! │  rows_affected = 0  ──► Reservation::Short { requested, available }     │
//! │                                                                         │
//! │  The check and the decrement are one statement: no window between       │
//! │  reading the quantity and writing it.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Releases (`increment`) have no bound to check and always apply.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use distrib_core::{InventoryRecord, StockShortage};

/// Outcome of a guarded decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    Reserved,
    Short(StockShortage),
}

/// Repository for pool-level inventory reads and manual adjustments.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Current stock record for a product.
    pub async fn get(&self, product_id: &str) -> DbResult<Option<InventoryRecord>> {
        fetch_record(&self.pool, product_id).await
    }

    /// On-hand quantity, zero when the product has no record.
    pub async fn available(&self, product_id: &str) -> DbResult<i64> {
        available(&self.pool, product_id).await
    }

    /// Manual adjustment: sets absolute stock and thresholds.
    ///
    /// Creates the record when missing. Fails with a check violation if
    /// `quantity` is negative.
    pub async fn set_stock(
        &self,
        product_id: &str,
        quantity: i64,
        min_stock: i64,
        max_stock: Option<i64>,
    ) -> DbResult<InventoryRecord> {
        debug!(product_id, quantity, min_stock, "Setting stock");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, quantity, min_stock, max_stock, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(product_id) DO UPDATE SET
                quantity = excluded.quantity,
                min_stock = excluded.min_stock,
                max_stock = excluded.max_stock,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(min_stock)
        .bind(max_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        fetch_record(&self.pool, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", product_id))
    }

    /// Records whose quantity is under `min_stock`, lowest first.
    pub async fn list_below_minimum(&self) -> DbResult<Vec<InventoryRecord>> {
        let records = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT product_id, quantity, min_stock, max_stock, updated_at
            FROM inventory
            WHERE quantity < min_stock
            ORDER BY quantity ASC, product_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// =============================================================================
// Executor-generic ledger operations
// =============================================================================

pub(crate) async fn fetch_record<'c, E>(
    executor: E,
    product_id: &str,
) -> DbResult<Option<InventoryRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let record = sqlx::query_as::<_, InventoryRecord>(
        r#"
        SELECT product_id, quantity, min_stock, max_stock, updated_at
        FROM inventory
        WHERE product_id = ?1
        "#,
    )
    .bind(product_id)
    .fetch_optional(executor)
    .await?;

    Ok(record)
}

pub(crate) async fn available<'c, E>(executor: E, product_id: &str) -> DbResult<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    let quantity: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;

    Ok(quantity.unwrap_or(0))
}

/// Takes `amount` units if, and only if, that many are on hand.
pub(crate) async fn decrement(
    conn: &mut SqliteConnection,
    product_id: &str,
    amount: i64,
) -> DbResult<Reservation> {
    let result = sqlx::query(
        r#"
        UPDATE inventory
        SET quantity = quantity - ?2, updated_at = ?3
        WHERE product_id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        debug!(product_id, amount, "Stock decremented");
        return Ok(Reservation::Reserved);
    }

    let on_hand = available(&mut *conn, product_id).await?;
    debug!(product_id, amount, on_hand, "Stock decrement refused");
    Ok(Reservation::Short(StockShortage::new(product_id, amount, on_hand)))
}

/// Returns `amount` units to stock, creating the record if it vanished.
pub(crate) async fn increment<'c, E>(executor: E, product_id: &str, amount: i64) -> DbResult<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO inventory (product_id, quantity, min_stock, max_stock, updated_at)
        VALUES (?1, ?2, 0, NULL, ?3)
        ON CONFLICT(product_id) DO UPDATE SET
            quantity = quantity + excluded.quantity,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    debug!(product_id, amount, "Stock incremented");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use distrib_core::Product;

    async fn setup(stock: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .catalog()
            .insert_product(&Product {
                id: String::new(),
                code: "PAN001".to_string(),
                name: "Panela de Pressão 10L".to_string(),
                price_cents: 18990,
                is_active: true,
            })
            .await
            .unwrap();
        db.inventory()
            .set_stock(&product.id, stock, 2, Some(100))
            .await
            .unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_set_stock_overwrites() {
        let (db, product_id) = setup(5).await;

        let record = db.inventory().set_stock(&product_id, 1, 3, None).await.unwrap();
        assert_eq!(record.quantity, 1);
        assert_eq!(record.max_stock, None);
        assert!(record.is_below_minimum());

        let low = db.inventory().list_below_minimum().await.unwrap();
        assert_eq!(low.len(), 1);
    }

    #[tokio::test]
    async fn test_set_stock_rejects_negative() {
        let (db, product_id) = setup(5).await;
        let err = db.inventory().set_stock(&product_id, -1, 0, None).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_decrement_is_guarded() {
        let (db, product_id) = setup(5).await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(
            decrement(&mut conn, &product_id, 5).await.unwrap(),
            Reservation::Reserved
        );
        assert_eq!(
            decrement(&mut conn, &product_id, 1).await.unwrap(),
            Reservation::Short(StockShortage::new(product_id.clone(), 1, 0))
        );
        drop(conn);

        assert_eq!(db.inventory().available(&product_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_restores_stock() {
        let (db, product_id) = setup(0).await;

        increment(db.pool(), &product_id, 5).await.unwrap();
        assert_eq!(db.inventory().available(&product_id).await.unwrap(), 5);

        let record = db.inventory().get(&product_id).await.unwrap().unwrap();
        assert_eq!(record.min_stock, 2);
        assert_eq!(db.inventory().available("unknown").await.unwrap(), 0);
    }
}
