//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  parseFloat("60.10") + parseFloat("57.90") = 117.99999999999999  ❌     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise)                              │
//! │    6010 + 5790 = 11800  →  "118.00"                                     │
//! │                                                                         │
//! │  The wire format stays a decimal string, so the browser never has to   │
//! │  round-trip money through a JS number either.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hearth_core::money::Money;
//!
//! let price = Money::from_minor(5000); // 50.00
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.to_string(), "100.00");
//!
//! let parsed: Money = "118.00".parse().unwrap();
//! assert_eq!(parsed.minor(), 11800);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::types::TaxRate;

/// Two amounts closer than this (in minor units) are treated as equal.
///
/// Payments reconcile against an order total when `|paid - total| < 0.01`,
/// which in whole paise means "exactly equal".
pub const MONEY_TOLERANCE_MINOR: i64 = 1;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.counter_price ──┬──► CartLine.unit_price ──► CartLine.total    │
/// │  Product.wholesale_price ┘          (resolved once, at add time)        │
/// │                                                                         │
/// │  Σ line totals ──► subtotal ──► + GST ──► Order.total                   │
/// │                                                 │                       │
/// │  Σ Payment.amount ──────────── reconcile ◄──────┘                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Serialized as a two-place decimal string (`"118.00"`). Deserializes from
/// a decimal string or a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Largest price or payment amount accepted from a client: 1 000 000 000.00.
    ///
    /// A full cart at this price (100 lines of 999 units) still sums well
    /// inside `i64`, so totals never overflow once inputs are validated.
    pub const MAX_AMOUNT: Money = Money(100_000_000_000);

    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(120, 0).minor(), 12000);
    /// assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Whole currency units, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
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

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(4000); // 40.00
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 12000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// GST on a single amount, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    /// use hearth_core::types::TaxRate;
    ///
    /// let line = Money::from_minor(10000);           // 100.00
    /// let gst = line.calculate_tax(TaxRate::from_bps(1800)); // 18%
    /// assert_eq!(gst.minor(), 1800);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money::tax_on_lines([(*self, rate)])
    }

    /// GST across many lines with a single rounding step.
    ///
    /// Each `amount × bps` product is accumulated exactly in `i128` and the
    /// sum is divided by 10 000 once. Rounding per line would let the
    /// half-paise of several lines compound into a visible error.
    ///
    /// ```text
    /// line A: 33.33 @ 5%  = 1.6665
    /// line B: 33.33 @ 5%  = 1.6665
    ///                       ──────
    /// per-line rounding:    1.67 + 1.67 = 3.34
    /// single rounding:      3.333 → 3.33      ← THIS FUNCTION
    /// ```
    pub fn tax_on_lines<I>(lines: I) -> Money
    where
        I: IntoIterator<Item = (Money, TaxRate)>,
    {
        let scaled: i128 = lines
            .into_iter()
            .map(|(amount, rate)| amount.0 as i128 * rate.bps() as i128)
            .sum();
        Money(div_round_half_away(scaled, 10_000) as i64)
    }

    /// Mean over `count` entries, rounded half away from zero.
    /// Zero when `count` is not positive.
    pub fn average_over(&self, count: i64) -> Money {
        if count <= 0 {
            return Money::zero();
        }
        Money(div_round_half_away(self.0 as i128, count as i128) as i64)
    }

    /// True when the two amounts differ by less than 0.01.
    #[inline]
    pub const fn approx_eq(&self, other: Money) -> bool {
        (self.0 - other.0).abs() < MONEY_TOLERANCE_MINOR
    }

    /// Converts to a decimal with two places (`11800` → `118.00`).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Converts from a decimal, rounding anything beyond two places.
    ///
    /// Returns `None` when the value does not fit in `i64` minor units.
    pub fn from_decimal(value: Decimal) -> Option<Money> {
        value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
    }
}

/// Integer division rounding half away from zero.
fn div_round_half_away(value: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        (value - half) / divisor
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-place decimal. The currency symbol is a display concern of
/// the client.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Error returned when a string is not a valid money amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid money amount: {0}")]
pub struct ParseMoneyError(pub String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| ParseMoneyError(s.to_string()))?;
        Money::from_decimal(value).ok_or_else(|| ParseMoneyError(s.to_string()))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", value)))
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
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
    fn test_display() {
        assert_eq!(Money::from_minor(11800).to_string(), "118.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("118.00".parse::<Money>().unwrap().minor(), 11800);
        assert_eq!("118".parse::<Money>().unwrap().minor(), 11800);
        assert_eq!(" 0.5 ".parse::<Money>().unwrap().minor(), 50);
        // Third decimal rounds half away from zero
        assert_eq!("1.005".parse::<Money>().unwrap().minor(), 101);
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_serde_accepts_string_and_number() {
        let from_str: Money = serde_json::from_str("\"60.10\"").unwrap();
        let from_num: Money = serde_json::from_str("57.9").unwrap();
        assert_eq!(from_str.minor(), 6010);
        assert_eq!(from_num.minor(), 5790);
        assert_eq!(serde_json::to_string(&(from_str + from_num)).unwrap(), "\"118.00\"");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        assert_eq!([a, b].iter().sum::<Money>().minor(), 1500);
    }

    #[test]
    fn test_tax_single_line() {
        let line = Money::from_minor(10000);
        assert_eq!(line.calculate_tax(TaxRate::from_bps(1800)).minor(), 1800);
        assert_eq!(line.calculate_tax(TaxRate::zero()).minor(), 0);
    }

    #[test]
    fn test_tax_rounds_once_across_lines() {
        let line = Money::from_minor(3333);
        let rate = TaxRate::from_bps(500);

        let per_line: i64 = (0..2).map(|_| line.calculate_tax(rate).minor()).sum();
        let combined = Money::tax_on_lines([(line, rate), (line, rate)]);

        assert_eq!(per_line, 334);
        assert_eq!(combined.minor(), 333);
    }

    #[test]
    fn test_average_over() {
        assert_eq!(Money::from_minor(10000).average_over(3).minor(), 3333);
        assert_eq!(Money::from_minor(5).average_over(2).minor(), 3);
        assert_eq!(Money::from_minor(5000).average_over(0), Money::zero());
    }

    #[test]
    fn test_approx_eq() {
        let total = Money::from_minor(11800);
        assert!(total.approx_eq(Money::from_minor(11800)));
        assert!(!total.approx_eq(Money::from_minor(11799)));
    }

    #[test]
    fn test_decimal_round_trip_keeps_scale() {
        let money = Money::from_minor(12000);
        assert_eq!(money.to_decimal().to_string(), "120.00");
        assert_eq!(Money::from_decimal(money.to_decimal()), Some(money));
    }
}
