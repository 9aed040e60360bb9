//! # Request and Response Types
//!
//! Explicit input/output structs for every service operation. Requests
//! validate themselves (`validate`) before any transaction is opened;
//! rules that need stored state (stock, status, ownership) are checked by
//! the service inside the transaction.
//!
//! All amounts are integer cents. Field names serialize as camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use distrib_core::validation::{
    validate_amount, validate_id, validate_notes, validate_paging, validate_quantity,
    validate_unique_products, validate_unit_price, ValidationResult,
};
use distrib_core::{Sale, SaleStatus, ValidationError};
use distrib_db::{SaleFilter, SaleQuery, SaleSort, SaleSummary, SortOrder};

// =============================================================================
// Sale Requests
// =============================================================================

/// Create a draft sale, optionally with its first items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub customer_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub tax_cents: i64,
    #[serde(default)]
    pub items: Vec<AddItemRequest>,
}

impl CreateSaleRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("customer_id", &self.customer_id)?;
        validate_notes(self.notes.as_deref())?;
        validate_amount("discount", self.discount_cents)?;
        validate_amount("tax", self.tax_cents)?;

        for item in &self.items {
            item.validate()?;
        }
        validate_unique_products(self.items.iter().map(|i| i.product_id.as_str()))
    }
}

/// Change sale-level fields. Absent fields are left as they are; an empty
/// `notes` string clears the notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discount_cents: Option<i64>,
    #[serde(default)]
    pub tax_cents: Option<i64>,
}

impl UpdateSaleRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.customer_id.is_none()
            && self.notes.is_none()
            && self.discount_cents.is_none()
            && self.tax_cents.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(customer_id) = &self.customer_id {
            validate_id("customer_id", customer_id)?;
        }
        validate_notes(self.notes.as_deref())?;
        if let Some(discount) = self.discount_cents {
            validate_amount("discount", discount)?;
        }
        if let Some(tax) = self.tax_cents {
            validate_amount("tax", tax)?;
        }
        Ok(())
    }
}

// =============================================================================
// Item Requests
// =============================================================================

/// Add one product line. `unit_price_cents` defaults to the catalog price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub discount_cents: i64,
}

impl AddItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        AddItemRequest {
            product_id: product_id.into(),
            quantity,
            unit_price_cents: None,
            discount_cents: 0,
        }
    }

    pub fn unit_price(mut self, cents: i64) -> Self {
        self.unit_price_cents = Some(cents);
        self
    }

    pub fn discount(mut self, cents: i64) -> Self {
        self.discount_cents = cents;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("product_id", &self.product_id)?;
        validate_quantity(self.quantity)?;
        if let Some(price) = self.unit_price_cents {
            validate_unit_price(price)?;
        }
        validate_amount("discount", self.discount_cents)
    }
}

/// Change an existing line. At least one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub discount_cents: Option<i64>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.quantity.is_none() && self.unit_price_cents.is_none() && self.discount_cents.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(price) = self.unit_price_cents {
            validate_unit_price(price)?;
        }
        if let Some(discount) = self.discount_cents {
            validate_amount("discount", discount)?;
        }
        Ok(())
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Filters, paging and sorting for the sales listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub min_total_cents: Option<i64>,
    #[serde(default)]
    pub max_total_cents: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort_by: Option<SaleSort>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl ListSalesRequest {
    /// Validates the request and turns it into a repository query.
    pub fn into_query(self, default_limit: u32) -> ValidationResult<SaleQuery> {
        let (page, limit) = validate_paging(self.page, self.limit, default_limit)?;

        if let Some(customer_id) = &self.customer_id {
            validate_id("customer_id", customer_id)?;
        }
        if let Some(min) = self.min_total_cents {
            validate_amount("min_total", min)?;
        }
        if let Some(max) = self.max_total_cents {
            validate_amount("max_total", max)?;
        }
        if let (Some(min), Some(max)) = (self.min_total_cents, self.max_total_cents) {
            if min > max {
                return Err(ValidationError::Inconsistent {
                    field: "min_total".to_string(),
                    reason: "must not exceed max_total".to_string(),
                });
            }
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ValidationError::Inconsistent {
                    field: "date_from".to_string(),
                    reason: "must not be after date_to".to_string(),
                });
            }
        }

        Ok(SaleQuery {
            filter: SaleFilter {
                customer_id: self.customer_id,
                user_id: self.user_id,
                status: self.status,
                date_from: self.date_from,
                date_to: self.date_to,
                min_total_cents: self.min_total_cents,
                max_total_cents: self.max_total_cents,
                search: self.search,
            },
            sort: self.sort_by.unwrap_or_default(),
            order: self.sort_order.unwrap_or_default(),
            page,
            limit,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        let pages = (total + limit_i - 1) / limit_i;
        Pagination {
            page,
            limit,
            total,
            pages,
            has_next: i64::from(page) < pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleListResponse {
    pub data: Vec<Sale>,
    pub pagination: Pagination,
    pub summary: SaleSummary,
}

// =============================================================================
// Stock Preview
// =============================================================================

/// One line of a stock preview request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckLine {
    pub product_id: String,
    pub quantity: i64,
}

impl StockCheckLine {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        StockCheckLine {
            product_id: product_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckResult {
    pub product_id: String,
    pub requested: i64,
    pub available: i64,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockValidation {
    pub items: Vec<StockCheckResult>,
    pub can_proceed: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
