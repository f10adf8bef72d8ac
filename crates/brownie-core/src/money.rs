//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing prices as floats:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing a month of sales that way drifts by fractions of a centavo    │
//! │  and the dashboard stops matching the bank statement.                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    R$ 8,00 × 5 = 800 × 5 = 4000 centavos, exactly                      │
//! │    Division (average cost) rounds once, explicitly                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use brownie_core::money::Money;
//!
//! let price = Money::from_cents(800);          // R$ 8,00
//! let total = price.multiply_quantity(5);      // R$ 40,00
//! assert_eq!(total.map(|m| m.cents()), Some(4000));
//! assert_eq!(total.to_string(), "R$ 40,00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest unit of the Brazilian real).
///
/// ## Design Decisions
/// - **i64 (signed)**: net profit is negative while the business is still
///   paying back its first purchases
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized transparently**: JSON carries plain integers
///
/// ## Where Money is Used
/// ```text
/// Purchase.total_value ──► totalInvestment ──┐
///                                            ├──► netProfit, profitMargin
/// Sale.unit_price × qty ──► Sale.total_value ┴──► totalRevenue
///                                   │
///                                   └──► Customer.total_spent
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use brownie_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// Returns `None` when the product does not fit in centavos.
    ///
    /// ## Example
    /// ```rust
    /// use brownie_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(800);
    /// assert_eq!(unit_price.multiply_quantity(5), Some(Money::from_cents(4000)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Divides evenly across `units`, rounding half away from zero.
    ///
    /// Returns zero when `units` is not positive, which is how the
    /// average-cost and average-price guards are expressed.
    ///
    /// ## Example
    /// ```rust
    /// use brownie_core::money::Money;
    ///
    /// let investment = Money::from_cents(15000); // R$ 150,00
    /// assert_eq!(investment.per_unit(50).cents(), 300);
    /// assert_eq!(Money::from_cents(1000).per_unit(3).cents(), 333);
    /// assert_eq!(Money::from_cents(1000).per_unit(0), Money::zero());
    /// ```
    pub fn per_unit(&self, units: i64) -> Money {
        if units <= 0 {
            return Money::zero();
        }
        let value = self.0 as i128;
        let units = units as i128;
        let half = units / 2;
        let rounded = if value >= 0 {
            (value + half) / units
        } else {
            (value - half) / units
        };
        Money(rounded as i64)
    }

    /// Expresses `self` as a percentage of `whole`.
    ///
    /// Returns `0.0` when `whole` is zero instead of NaN or infinity.
    ///
    /// ## Example
    /// ```rust
    /// use brownie_core::money::Money;
    ///
    /// let profit = Money::from_cents(-11000);
    /// let revenue = Money::from_cents(4000);
    /// assert_eq!(profit.percent_of(revenue), -275.0);
    /// assert_eq!(profit.percent_of(Money::zero()), 0.0);
    /// ```
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }

    /// Formats with the given currency symbol and Brazilian separators.
    ///
    /// ## Example
    /// ```rust
    /// use brownie_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(123456).format_with("R$"), "R$ 1.234,56");
    /// assert_eq!(Money::from_cents(-550).format_with("R$"), "-R$ 5,50");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.reais().abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}{} {},{:02}", sign, symbol, grouped, self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in reais with Brazilian separators.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("R$"))
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

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
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

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "R$ 10,99");
        assert_eq!(Money::from_cents(500).to_string(), "R$ 5,00");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5,50");
        assert_eq!(Money::from_cents(0).to_string(), "R$ 0,00");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "R$ 1.234.567,89");
        assert_eq!(Money::from_cents(100_000).to_string(), "R$ 1.000,00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
    }

    #[test]
    fn test_multiply_quantity_checks_overflow() {
        let price = Money::from_cents(800);
        assert_eq!(price.multiply_quantity(3), Some(Money::from_cents(2400)));
        assert_eq!(price.multiply_quantity(0), Some(Money::zero()));

        let huge = Money::from_cents(i64::MAX / 100);
        assert_eq!(huge.multiply_quantity(crate::MAX_QUANTITY), None);

        let largest = crate::MAX_AMOUNT.multiply_quantity(crate::MAX_QUANTITY);
        assert_eq!(
            largest.map(|m| m.cents()),
            Some(crate::MAX_AMOUNT.cents() * crate::MAX_QUANTITY)
        );
    }

    #[test]
    fn test_sum() {
        let values = [Money::from_cents(150), Money::from_cents(250)];
        let total: Money = values.iter().sum();
        assert_eq!(total.cents(), 400);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_per_unit_rounding() {
        assert_eq!(Money::from_cents(15000).per_unit(50).cents(), 300);
        assert_eq!(Money::from_cents(1000).per_unit(3).cents(), 333);
        assert_eq!(Money::from_cents(1001).per_unit(2).cents(), 501);
        assert_eq!(Money::from_cents(-1001).per_unit(2).cents(), -501);
        assert_eq!(Money::from_cents(1000).per_unit(0), Money::zero());
        assert_eq!(Money::from_cents(1000).per_unit(-4), Money::zero());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(Money::from_cents(2500).percent_of(Money::from_cents(10000)), 25.0);
        assert_eq!(Money::from_cents(2500).percent_of(Money::zero()), 0.0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert!(!negative.is_zero());
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(4000)).unwrap();
        assert_eq!(json, "4000");
        let back: Money = serde_json::from_str("4000").unwrap();
        assert_eq!(back, Money::from_cents(4000));
    }
}
