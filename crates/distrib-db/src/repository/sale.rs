//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Read vs. Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleRepository (pool)              UnitOfWork (transaction)            │
//! │  ─────────────────────              ────────────────────────            │
//! │  get_by_id                          sale / items / item                 │
//! │  get_items                          insert_sale / update_sale           │
//! │  get_with_items                     insert_item / update_item           │
//! │  list (filters, paging, summary)    delete_item                         │
//! │                                                                         │
//! │  Both sides call the same executor-generic query functions below.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are never deleted. Items are deleted only while the sale is
//! editable; that gate lives in the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use distrib_core::{Sale, SaleItem, SaleStatus, SaleWithItems};

const SALE_COLUMNS: &str = "s.id, s.customer_id, s.user_id, s.status, s.subtotal_cents, \
     s.discount_cents, s.tax_cents, s.total_cents, s.notes, s.sale_date, s.created_at, \
     s.updated_at, s.completed_at, s.cancelled_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price_cents, \
     discount_cents, total_cents, created_at, updated_at";

// =============================================================================
// Listing types
// =============================================================================

/// Row filters for [`SaleRepository::list`]. Every field is optional and
/// the set filters are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub customer_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<SaleStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub min_total_cents: Option<i64>,
    pub max_total_cents: Option<i64>,
    /// Case-insensitive match on notes or customer name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaleSort {
    #[default]
    SaleDate,
    Total,
    Status,
    CreatedAt,
}

impl SaleSort {
    fn column(self) -> &'static str {
        match self {
            SaleSort::SaleDate => "s.sale_date",
            SaleSort::Total => "s.total_cents",
            SaleSort::Status => "s.status",
            SaleSort::CreatedAt => "s.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A page request. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleQuery {
    pub filter: SaleFilter,
    pub sort: SaleSort,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Aggregates over every sale matching the filter, not just the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub total_sales: i64,
    pub total_revenue_cents: i64,
    pub average_order_value_cents: i64,
    pub total_quantity: i64,
}

/// One page of sales plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePage {
    pub sales: Vec<Sale>,
    pub total: i64,
    pub summary: SaleSummary,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for pool-level sale reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        fetch_sale(&self.pool, id).await
    }

    /// Items of a sale in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        fetch_items(&self.pool, sale_id).await
    }

    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Filtered, sorted, paginated listing with aggregates.
    pub async fn list(&self, query: &SaleQuery) -> DbResult<SalePage> {
        debug!(page = query.page, limit = query.limit, "Listing sales");

        let offset = i64::from(query.page.saturating_sub(1)) * i64::from(query.limit);

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {SALE_COLUMNS} FROM sales s"));
        push_filters(&mut select, &query.filter);
        select
            .push(" ORDER BY ")
            .push(query.sort.column())
            .push(" ")
            .push(query.order.keyword())
            .push(", s.id ")
            .push(query.order.keyword())
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(offset);
        let sales = select.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        let mut totals = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*), COALESCE(SUM(s.total_cents), 0) FROM sales s",
        );
        push_filters(&mut totals, &query.filter);
        let (count, revenue): (i64, i64) = totals.build_query_as().fetch_one(&self.pool).await?;

        let mut quantity = QueryBuilder::<Sqlite>::new(
            "SELECT COALESCE(SUM(i.quantity), 0) FROM sale_items i \
             WHERE i.sale_id IN (SELECT s.id FROM sales s",
        );
        push_filters(&mut quantity, &query.filter);
        quantity.push(")");
        let (total_quantity,): (i64,) = quantity.build_query_as().fetch_one(&self.pool).await?;

        let average = if count > 0 {
            (revenue + count / 2) / count
        } else {
            0
        };

        Ok(SalePage {
            sales,
            total: count,
            summary: SaleSummary {
                total_sales: count,
                total_revenue_cents: revenue,
                average_order_value_cents: average,
                total_quantity,
            },
        })
    }
}

/// Appends ` WHERE ...` for every set filter. The sales table must be
/// aliased `s`.
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(customer_id) = &filter.customer_id {
        builder.push(" AND s.customer_id = ").push_bind(customer_id.clone());
    }
    if let Some(user_id) = &filter.user_id {
        builder.push(" AND s.user_id = ").push_bind(user_id.clone());
    }
    if let Some(status) = filter.status {
        builder.push(" AND s.status = ").push_bind(status);
    }
    if let Some(from) = filter.date_from {
        builder.push(" AND s.sale_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        builder.push(" AND s.sale_date <= ").push_bind(to);
    }
    if let Some(min) = filter.min_total_cents {
        builder.push(" AND s.total_cents >= ").push_bind(min);
    }
    if let Some(max) = filter.max_total_cents {
        builder.push(" AND s.total_cents <= ").push_bind(max);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        builder
            .push(" AND (LOWER(COALESCE(s.notes, '')) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\'")
            .push(" OR EXISTS (SELECT 1 FROM customers c WHERE c.id = s.customer_id AND LOWER(c.name) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'))");
    }
}

/// Makes `%`, `_` and `\` match themselves in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Executor-generic queries (shared with UnitOfWork)
// =============================================================================

pub(crate) async fn fetch_sale<'c, E>(executor: E, id: &str) -> DbResult<Option<Sale>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let sql = format!("SELECT {SALE_COLUMNS} FROM sales s WHERE s.id = ?1");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(sale)
}

pub(crate) async fn fetch_items<'c, E>(executor: E, sale_id: &str) -> DbResult<Vec<SaleItem>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, id"
    );
    let items = sqlx::query_as::<_, SaleItem>(&sql)
        .bind(sale_id)
        .fetch_all(executor)
        .await?;

    Ok(items)
}

/// Fetches an item only if it belongs to `sale_id`.
pub(crate) async fn fetch_item<'c, E>(
    executor: E,
    sale_id: &str,
    item_id: &str,
) -> DbResult<Option<SaleItem>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE id = ?1 AND sale_id = ?2");
    let item = sqlx::query_as::<_, SaleItem>(&sql)
        .bind(item_id)
        .bind(sale_id)
        .fetch_optional(executor)
        .await?;

    Ok(item)
}

pub(crate) async fn insert_sale<'c, E>(executor: E, sale: &Sale) -> DbResult<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(id = %sale.id, customer_id = %sale.customer_id, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, customer_id, user_id, status,
            subtotal_cents, discount_cents, tax_cents, total_cents,
            notes, sale_date, created_at, updated_at, completed_at, cancelled_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7, ?8,
            ?9, ?10, ?11, ?12, ?13, ?14
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(&sale.user_id)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.tax_cents)
    .bind(sale.total_cents)
    .bind(&sale.notes)
    .bind(sale.sale_date)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .bind(sale.completed_at)
    .bind(sale.cancelled_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Writes every mutable column of `sale`. Returns false if the row is gone.
pub(crate) async fn update_sale<'c, E>(executor: E, sale: &Sale) -> DbResult<bool>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(id = %sale.id, status = %sale.status, "Updating sale");

    let result = sqlx::query(
        r#"
        UPDATE sales SET
            customer_id = ?2,
            status = ?3,
            subtotal_cents = ?4,
            discount_cents = ?5,
            tax_cents = ?6,
            total_cents = ?7,
            notes = ?8,
            updated_at = ?9,
            completed_at = ?10,
            cancelled_at = ?11
        WHERE id = ?1
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.tax_cents)
    .bind(sale.total_cents)
    .bind(&sale.notes)
    .bind(sale.updated_at)
    .bind(sale.completed_at)
    .bind(sale.cancelled_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn insert_item<'c, E>(executor: E, item: &SaleItem) -> DbResult<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Adding sale item");

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, quantity,
            unit_price_cents, discount_cents, total_cents,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_cents)
    .bind(item.total_cents)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn update_item<'c, E>(executor: E, item: &SaleItem) -> DbResult<bool>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(id = %item.id, sale_id = %item.sale_id, "Updating sale item");

    let result = sqlx::query(
        r#"
        UPDATE sale_items SET
            quantity = ?3,
            unit_price_cents = ?4,
            discount_cents = ?5,
            total_cents = ?6,
            updated_at = ?7
        WHERE id = ?1 AND sale_id = ?2
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_cents)
    .bind(item.total_cents)
    .bind(item.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn delete_item<'c, E>(executor: E, sale_id: &str, item_id: &str) -> DbResult<bool>
where
    E: Executor<'c, Database = Sqlite>,
{
    debug!(id = %item_id, sale_id = %sale_id, "Removing sale item");

    let result = sqlx::query("DELETE FROM sale_items WHERE id = ?1 AND sale_id = ?2")
        .bind(item_id)
        .bind(sale_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}
