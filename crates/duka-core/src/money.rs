//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  WRONG                               │
//! │                                                                         │
//! │  Weighed goods make it worse:                                           │
//! │    1.250 kg × 349.99/kg must be exactly 437.4875                        │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal (rust_decimal)                           │
//! │    Exact sums and products, scale grows only as the inputs demand       │
//! │    Nothing is rounded unless a caller explicitly asks for it            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire & Storage Format
//! - JSON: a decimal string (`"200.00"`). Deserialization also accepts plain
//!   JSON numbers so hand-written clients can send `200`.
//! - SQLite: TEXT. Money is never aggregated in SQL, so the canonical string
//!   round-trips without loss.
//!
//! ## Usage
//! ```rust
//! use duka_core::money::Money;
//! use duka_core::quantity::Quantity;
//!
//! let price: Money = "100.00".parse().unwrap();
//! let qty: Quantity = "2".parse().unwrap();
//!
//! let line = price * qty;
//! assert_eq!(line.to_string(), "200.00");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store's single currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values exist transiently (a discount
///   that exceeds its line) so validation can detect them
/// - **Single field tuple struct**: zero-cost wrapper, no currency tag
///   (multi-currency is out of scope)
/// - **Equality is numeric**: `200` == `200.00`
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  SaleItemRequest.price × quantity − discount ──► SaleItem.total         │
/// │                                                                         │
/// │  Σ SaleItem.total − Sale.discount ──► Sale.grand_total                  │
/// │                                                                         │
/// │  Σ Payment.amount ──► Sale.paid_amount ──► PaymentStatus                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, 2))
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Addition that returns `None` instead of panicking on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtraction that returns `None` instead of panicking on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Unit price × quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    /// use duka_core::quantity::Quantity;
    ///
    /// let price: Money = "79000000000000000000000000".parse().unwrap();
    /// assert!(price.checked_mul(Quantity::from(1_000_000)).is_none());
    /// assert_eq!(
    ///     Money::from(250).checked_mul(Quantity::from(2)),
    ///     Some(Money::from(500))
    /// );
    /// ```
    #[inline]
    pub fn checked_mul(self, qty: Quantity) -> Option<Money> {
        self.0.checked_mul(qty.value()).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display prints the canonical decimal string, preserving scale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<i64> for Money {
    fn from(whole: i64) -> Self {
        Money(Decimal::from(whole))
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

/// Unit price × quantity (line amounts, purchase costs).
impl Mul<Quantity> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: Quantity) -> Self {
        Money(self.0 * qty.value())
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
// SQLite Mapping (TEXT)
// =============================================================================

#[cfg(feature = "sqlx")]
mod sqlite {
    use super::Money;
    use rust_decimal::Decimal;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
    use sqlx::{Database, Decode, Encode, Type};
    use std::str::FromStr;

    impl Type<Sqlite> for Money {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Money {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.0.to_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Money {
        fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(Money(Decimal::from_str(text)?))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_minor() {
        assert_eq!(Money::from_minor(1099).amount(), dec!(10.99));
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_display_preserves_scale() {
        assert_eq!(Money::new(dec!(200.00)).to_string(), "200.00");
        assert_eq!(Money::new(dec!(0)).to_string(), "0");
    }

    #[test]
    fn test_numeric_equality_ignores_scale() {
        assert_eq!(Money::new(dec!(200)), Money::new(dec!(200.00)));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(dec!(10.00));
        let b = Money::new(dec!(5.50));

        assert_eq!(a + b, Money::new(dec!(15.50)));
        assert_eq!(a - b, Money::new(dec!(4.50)));

        let mut c = a;
        c += b;
        c -= Money::new(dec!(0.50));
        assert_eq!(c, Money::new(dec!(15)));
    }

    #[test]
    fn test_multiply_by_fractional_quantity_is_exact() {
        let price = Money::new(dec!(349.99));
        let qty: Quantity = "1.25".parse().unwrap();
        assert_eq!(price * qty, Money::new(dec!(437.4875)));
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_add(Money::from(1)), None);
        assert_eq!(Money::new(Decimal::MIN).checked_sub(Money::from(1)), None);
        assert_eq!(huge.checked_mul(Quantity::from(2)), None);

        let a = Money::new(dec!(10.00));
        assert_eq!(a.checked_add(Money::from(5)), Some(Money::from(15)));
        assert_eq!(a.checked_sub(Money::from(5)), Some(Money::from(5)));
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::new(dec!(0.1)),
            Money::new(dec!(0.2)),
            Money::new(dec!(0.3)),
        ];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::new(dec!(0.6)));
        let empty: Vec<Money> = Vec::new();
        assert!(empty.into_iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from(5).is_positive());
        assert!(Money::from(-5).is_negative());
    }

    #[test]
    fn test_json_accepts_string_or_number() {
        let from_str: Money = serde_json::from_str("\"150.50\"").unwrap();
        let from_num: Money = serde_json::from_str("150").unwrap();
        assert_eq!(from_str, Money::new(dec!(150.50)));
        assert_eq!(from_num, Money::new(dec!(150)));

        assert_eq!(
            serde_json::to_string(&Money::new(dec!(200.00))).unwrap(),
            "\"200.00\""
        );
    }
}
