//! # Money Module
//!
//! The `Money` type used for every price, discount, tax and total.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Unit price 10.00 × 5 units − 0.00 discount                             │
//! │                                                                         │
//! │    Money::from_cents(1000) × 5 = Money::from_cents(5000)   (= 50.00)    │
//! │                                                                         │
//! │  Every amount in the sales engine is an i64 count of cents.             │
//! │  Conversion to a decimal string happens only for display.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use distrib_core::money::Money;
//!
//! let unit_price = Money::from_major_minor(10, 0);
//! let line = unit_price.checked_mul_quantity(5).unwrap();
//! assert_eq!(line, Money::from_cents(5000));
//! assert_eq!(line.to_string(), "50.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the smallest currency unit.
///
/// Signed so intermediate results (a discount larger than the line) can be
/// represented and then rejected by the pricing rules, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// ```rust
    /// use distrib_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(47, 0).cents(), 4700);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts an amount, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ```rust
    /// use distrib_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).checked_mul_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub fn checked_mul_quantity(self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Computes `percent`% of this amount, rounding half away from zero to
    /// the cent. `percent` is given in basis points (1000 = 10%).
    ///
    /// ```rust
    /// use distrib_core::money::Money;
    ///
    /// // 12.5% of 10.01 = 1.25125 -> 1.25
    /// assert_eq!(Money::from_cents(1001).percentage_bps(1250), Money::from_cents(125));
    /// // 50% of 0.03 = 0.015 -> 0.02
    /// assert_eq!(Money::from_cents(3).percentage_bps(5000), Money::from_cents(2));
    /// ```
    pub fn percentage_bps(&self, bps: u32) -> Money {
        // i128 so large subtotals cannot overflow the intermediate product
        let scaled = self.0 as i128 * bps as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`47.00`, `-5.50`). Currency symbols are a
/// presentation concern of the front end.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
