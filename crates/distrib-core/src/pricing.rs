//! # Pricing Calculator
//!
//! Pure functions for line and sale totals. Both the item mutation paths and
//! the lifecycle transitions call these, so the stored totals can never
//! drift from the items.
//!
//! ## Formulae
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  item total  = quantity × unit_price − item discount      (>= 0)        │
//! │  subtotal    = Σ item totals                                            │
//! │  sale total  = subtotal − sale discount + tax             (>= 0)        │
//! │                                                                         │
//! │  Example: one item 50.00, discount 5.00, tax 2.00  →  total 47.00       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::validate_amount;
use crate::types::{Sale, SaleItem};

/// Computes `quantity * unit_price - discount`.
///
/// ## Errors
/// `InvalidAmount` if the result is negative or overflows.
///
/// ```rust
/// use distrib_core::money::Money;
/// use distrib_core::pricing::item_total;
///
/// let total = item_total(5, Money::from_cents(1000), Money::zero()).unwrap();
/// assert_eq!(total, Money::from_cents(5000));
/// assert!(item_total(1, Money::from_cents(100), Money::from_cents(101)).is_err());
/// ```
pub fn item_total(quantity: i64, unit_price: Money, discount: Money) -> CoreResult<Money> {
    let gross = unit_price
        .checked_mul_quantity(quantity)
        .ok_or_else(|| CoreError::overflow("item total"))?;
    let total = gross
        .checked_sub(discount)
        .ok_or_else(|| CoreError::overflow("item total"))?;

    if total.is_negative() {
        return Err(CoreError::negative_amount("item total"));
    }

    Ok(total)
}

/// Sums the stored totals of `items`.
pub fn subtotal(items: &[SaleItem]) -> CoreResult<Money> {
    items.iter().try_fold(Money::zero(), |acc, item| {
        acc.checked_add(item.total())
            .ok_or_else(|| CoreError::overflow("subtotal"))
    })
}

/// Computes `subtotal - sale_discount + tax`.
///
/// ## Errors
/// `InvalidAmount` when the discount exceeds `subtotal + tax`.
pub fn sale_total(subtotal: Money, sale_discount: Money, tax: Money) -> CoreResult<Money> {
    let total = subtotal
        .checked_sub(sale_discount)
        .and_then(|m| m.checked_add(tax))
        .ok_or_else(|| CoreError::overflow("sale total"))?;

    if total.is_negative() {
        return Err(CoreError::negative_amount("sale total"));
    }

    Ok(total)
}

// =============================================================================
// Sale Totals
// =============================================================================

/// The derived monetary fields of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Recomputes every derived field from the items and the sale-level
    /// discount and tax.
    pub fn compute(items: &[SaleItem], discount: Money, tax: Money) -> CoreResult<Self> {
        let subtotal = subtotal(items)?;
        let total = sale_total(subtotal, discount, tax)?;
        Ok(SaleTotals {
            subtotal,
            discount,
            tax,
            total,
        })
    }

    /// Recomputes the totals of `sale` from `items` and writes them back.
    ///
    /// On error `sale` is left unchanged.
    pub fn apply(sale: &mut Sale, items: &[SaleItem]) -> CoreResult<Self> {
        let totals = SaleTotals::compute(items, sale.discount(), sale.tax())?;
        sale.subtotal_cents = totals.subtotal.cents();
        sale.discount_cents = totals.discount.cents();
        sale.tax_cents = totals.tax.cents();
        sale.total_cents = totals.total.cents();
        Ok(totals)
    }
}

// =============================================================================
// Sale-level discount
// =============================================================================

/// How a sale-level discount is expressed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage in basis points (1000 = 10%). Must be in 1..=10000.
    Percentage(u32),
    /// Fixed amount off the subtotal.
    Fixed(Money),
}

impl DiscountKind {
    /// Resolves the discount to an amount against `subtotal`.
    ///
    /// ```rust
    /// use distrib_core::money::Money;
    /// use distrib_core::pricing::DiscountKind;
    ///
    /// let amount = DiscountKind::Percentage(1000).amount(Money::from_cents(5000)).unwrap();
    /// assert_eq!(amount, Money::from_cents(500));
    /// ```
    pub fn amount(self, subtotal: Money) -> CoreResult<Money> {
        match self {
            DiscountKind::Percentage(bps) => {
                if bps == 0 || bps > 10_000 {
                    return Err(ValidationError::OutOfRange {
                        field: "discount percentage".to_string(),
                        min: 1,
                        max: 10_000,
                    }
                    .into());
                }
                Ok(subtotal.percentage_bps(bps))
            }
            DiscountKind::Fixed(amount) => {
                if !amount.is_positive() {
                    return Err(ValidationError::MustBePositive {
                        field: "discount".to_string(),
                    }
                    .into());
                }
                validate_amount("discount", amount.cents())?;
                Ok(amount)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(quantity: i64, unit_price_cents: i64, discount_cents: i64) -> SaleItem {
        let now = Utc::now();
        let total = item_total(
            quantity,
            Money::from_cents(unit_price_cents),
            Money::from_cents(discount_cents),
        )
        .unwrap();
        SaleItem {
            id: format!("item-{quantity}-{unit_price_cents}"),
            sale_id: "sale-1".to_string(),
            product_id: format!("product-{unit_price_cents}"),
            quantity,
            unit_price_cents,
            discount_cents,
            total_cents: total.cents(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_item_total() {
        let total = item_total(3, Money::from_cents(299), Money::from_cents(97)).unwrap();
        assert_eq!(total.cents(), 800);
    }

    #[test]
    fn test_item_total_may_be_zero() {
        let total = item_total(2, Money::from_cents(500), Money::from_cents(1000)).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_item_total_rejects_negative() {
        let err = item_total(1, Money::from_cents(500), Money::from_cents(501)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_item_total_rejects_overflow() {
        let err = item_total(i64::MAX, Money::from_cents(2), Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_subtotal_of_empty_sale() {
        assert_eq!(subtotal(&[]).unwrap(), Money::zero());
    }

    #[test]
    fn test_sale_total_example() {
        // One item totalling 50.00, sale discount 5.00, tax 2.00 -> 47.00
        let items = vec![item(5, 1000, 0)];
        let totals = SaleTotals::compute(&items, Money::from_cents(500), Money::from_cents(200))
            .unwrap();
        assert_eq!(totals.subtotal.cents(), 5000);
        assert_eq!(totals.total.cents(), 4700);
    }

    #[test]
    fn test_sale_total_sums_items() {
        let items = vec![item(2, 1000, 100), item(1, 350, 0)];
        let totals = SaleTotals::compute(&items, Money::zero(), Money::zero()).unwrap();
        assert_eq!(totals.subtotal.cents(), 2250);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_sale_total_rejects_excess_discount() {
        let err = sale_total(Money::from_cents(100), Money::from_cents(400), Money::from_cents(200))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_apply_writes_back_totals() {
        let now = Utc::now();
        let mut sale = Sale {
            id: "sale-1".to_string(),
            customer_id: "c-1".to_string(),
            user_id: "u-1".to_string(),
            status: crate::status::SaleStatus::Draft,
            subtotal_cents: 0,
            discount_cents: 500,
            tax_cents: 200,
            total_cents: 0,
            notes: None,
            sale_date: now,
            created_at: now,
            updated_at: now,
            completed_at: None,
            cancelled_at: None,
        };

        SaleTotals::apply(&mut sale, &[item(5, 1000, 0)]).unwrap();
        assert_eq!((sale.subtotal_cents, sale.total_cents), (5000, 4700));

        // Removing every line would leave 0 - 5.00 + 2.00
        assert!(SaleTotals::apply(&mut sale, &[]).is_err());
        assert_eq!(sale.total_cents, 4700);
    }

    #[test]
    fn test_discount_kind() {
        let subtotal = Money::from_cents(12345);
        assert_eq!(
            DiscountKind::Percentage(10_000).amount(subtotal).unwrap(),
            subtotal
        );
        assert_eq!(
            DiscountKind::Fixed(Money::from_cents(45)).amount(subtotal).unwrap(),
            Money::from_cents(45)
        );
        assert!(DiscountKind::Percentage(0).amount(subtotal).is_err());
        assert!(DiscountKind::Percentage(10_001).amount(subtotal).is_err());
        assert!(DiscountKind::Fixed(Money::zero()).amount(subtotal).is_err());
    }

    #[test]
    fn test_fixed_discount_is_bounded() {
        let subtotal = Money::from_cents(crate::MAX_AMOUNT_CENTS);
        assert!(DiscountKind::Fixed(Money::from_cents(crate::MAX_AMOUNT_CENTS))
            .amount(subtotal)
            .is_ok());

        let err = DiscountKind::Fixed(Money::from_cents(crate::MAX_AMOUNT_CENTS + 1))
            .amount(subtotal)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
}
