//! # Quantity Module
//!
//! Item and stock quantities. Whole units for most products, fractional for
//! goods sold by weight or volume (0.250 kg of sugar).
//!
//! ## Precision
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  At most 3 decimal places (thousandths)                                 │
//! │                                                                         │
//! │   JSON "1.25"  ──► Quantity(1.25) ──► SQLite INTEGER 1250               │
//! │                                                                         │
//! │  Storing thousandths as INTEGER lets the stock ledger do                │
//! │     UPDATE stock SET quantity = MAX(quantity - ?, 0)                    │
//! │  in one statement, so concurrent sales never lose an update.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values with more than [`Quantity::MAX_SCALE`] decimal places are rejected
//! by validation before they can reach the database.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;
use ts_rs::TS;

/// A decimal quantity of product.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
pub struct Quantity(#[ts(type = "string")] Decimal);

impl Quantity {
    /// Maximum number of decimal places a quantity may carry.
    pub const MAX_SCALE: u32 = 3;

    /// Storage units per whole unit.
    const STORAGE_FACTOR: i64 = 1000;

    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Quantity(value)
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(Decimal::ZERO)
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Number of significant decimal places (`2.500` has scale 1).
    pub fn scale(&self) -> u32 {
        self.0.normalize().scale()
    }

    /// Converts to integer thousandths for storage.
    ///
    /// Returns `None` when the value has more than three decimal places or
    /// does not fit in an `i64`.
    pub fn to_thousandths(&self) -> Option<i64> {
        if self.scale() > Self::MAX_SCALE {
            return None;
        }
        self.0
            .checked_mul(Decimal::from(Self::STORAGE_FACTOR))?
            .to_i64()
    }

    /// Rebuilds a quantity from stored thousandths.
    pub fn from_thousandths(raw: i64) -> Self {
        Quantity(Decimal::new(raw, Self::MAX_SCALE).normalize())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Quantity)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity(value)
    }
}

impl From<i64> for Quantity {
    fn from(whole: i64) -> Self {
        Quantity(Decimal::from(whole))
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

// =============================================================================
// SQLite Mapping (INTEGER thousandths)
// =============================================================================

#[cfg(feature = "sqlx")]
mod sqlite {
    use super::Quantity;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
    use sqlx::{Database, Decode, Encode, Type};

    impl Type<Sqlite> for Quantity {
        fn type_info() -> SqliteTypeInfo {
            <i64 as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <i64 as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Quantity {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            let raw = self
                .to_thousandths()
                .ok_or_else(|| format!("quantity {self} cannot be stored in thousandths"))?;
            <i64 as Encode<'q, Sqlite>>::encode(raw, buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Quantity {
        fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            let raw = <i64 as Decode<'r, Sqlite>>::decode(value)?;
            Ok(Quantity::from_thousandths(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scale_ignores_trailing_zeros() {
        assert_eq!(Quantity::new(dec!(2.500)).scale(), 1);
        assert_eq!(Quantity::new(dec!(2)).scale(), 0);
        assert_eq!(Quantity::new(dec!(0.0005)).scale(), 4);
    }

    #[test]
    fn test_thousandths_conversion() {
        assert_eq!(Quantity::new(dec!(1.25)).to_thousandths(), Some(1250));
        assert_eq!(Quantity::new(dec!(3)).to_thousandths(), Some(3000));
        assert_eq!(Quantity::new(dec!(0.001)).to_thousandths(), Some(1));
        assert_eq!(Quantity::new(dec!(0.0001)).to_thousandths(), None);

        assert_eq!(Quantity::from_thousandths(1250), Quantity::new(dec!(1.25)));
        assert_eq!(Quantity::from_thousandths(0).to_string(), "0");
        assert_eq!(Quantity::from_thousandths(2000).to_string(), "2");
    }

    #[test]
    fn test_sign_checks() {
        assert!(Quantity::from(1).is_positive());
        assert!(!Quantity::zero().is_positive());
        assert!(Quantity::new(dec!(-0.5)).is_negative());
    }

    #[test]
    fn test_json_shape() {
        let qty: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(qty, Quantity::from(2));
        let qty: Quantity = serde_json::from_str("\"0.75\"").unwrap();
        assert_eq!(serde_json::to_string(&qty).unwrap(), "\"0.75\"");
    }
}
