//! # Catalog Repository
//!
//! Product and customer lookups. The sales engine only reads these; the
//! insert helpers exist for seeding and tests.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use distrib_core::{Customer, Product};

/// Repository for catalog reads.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product by ID, active or not.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Gets a product by its business code.
    pub async fn get_product_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, price_cents, is_active FROM products WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a customer by ID, active or not.
    pub async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        fetch_customer(&self.pool, id).await
    }

    pub async fn count_products(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a product. A blank `id` gets a fresh UUID.
    pub async fn insert_product(&self, product: &Product) -> DbResult<Product> {
        let mut product = product.clone();
        if product.id.is_empty() {
            product.id = Uuid::new_v4().to_string();
        }

        debug!(id = %product.id, code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, code, name, price_cents, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.is_active)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a customer. A blank `id` gets a fresh UUID.
    pub async fn insert_customer(&self, customer: &Customer) -> DbResult<Customer> {
        let mut customer = customer.clone();
        if customer.id.is_empty() {
            customer.id = Uuid::new_v4().to_string();
        }

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, document, is_active)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.document)
        .bind(customer.is_active)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Changes the catalog price. Existing sale lines keep their frozen price.
    pub async fn set_product_price(&self, id: &str, price_cents: i64) -> DbResult<bool> {
        let result = sqlx::query("UPDATE products SET price_cents = ?2 WHERE id = ?1")
            .bind(id)
            .bind(price_cents)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn set_product_active(&self, id: &str, active: bool) -> DbResult<bool> {
        let result = sqlx::query("UPDATE products SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn set_customer_active(&self, id: &str, active: bool) -> DbResult<bool> {
        let result = sqlx::query("UPDATE customers SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Executor-generic queries (shared with UnitOfWork)
// =============================================================================

pub(crate) async fn fetch_product<'c, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, code, name, price_cents, is_active FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

pub(crate) async fn fetch_customer<'c, E>(executor: E, id: &str) -> DbResult<Option<Customer>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, document, is_active FROM customers WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}
