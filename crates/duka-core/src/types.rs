//! # Domain Types
//!
//! Persisted entities of the Duka POS core.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Product ◄──1:1── Stock             (stock ledger, quantity ≥ 0)        │
//! │     ▲                                                                   │
//! │     │ referenced, never owned                                           │
//! │     ├────────── SaleItem ──────┐                                        │
//! │     ├────────── HeldOrderItem ─┼──► owned by Sale / HeldOrder /         │
//! │     └────────── PurchaseItem ──┘    Purchase (cascade delete)           │
//! │                                                                         │
//! │  Sale ──1:n── Payment               (split tender)                      │
//! │  Sale ──n:1── User (cashier)   Sale ──n:1── Customer (optional)         │
//! │  HeldOrder ──n:1── User (owner)     HeldOrder ──n:1── Customer          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every transactional entity has:
//! - `id`: UUID v4, immutable, used for relations
//! - `reference`: human-readable business key (`SALE-20260114093015123-7F3A`)
//!
//! ## Snapshot Pattern
//! Line items copy the product name and unit price at write time so later
//! catalog edits never alter historical records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Tag Enums
// =============================================================================

/// How a product's price relates to tax. Stored only; no tax is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TaxMethod {
    /// Price already includes tax.
    Inclusive,
    /// Tax is charged on top of the price.
    #[default]
    Exclusive,
}

/// Derived settlement state of a sale.
///
/// Never supplied by the caller. See [`crate::checkout::derive_payment_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentStatus {
    /// Paid amount covers the grand total.
    Paid,
    /// Something was paid, but less than the grand total.
    Partial,
    /// Nothing was paid.
    Unpaid,
}

/// Tender type of a single payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMethod {
    /// M-Pesa mobile money.
    Mpesa,
    /// Physical cash.
    Cash,
    /// Store credit / account.
    Credit,
    /// Card on an external terminal.
    Card,
    /// Given away (staff meal, promotion).
    Complimentary,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Unique business code.
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductUnit {
    pub id: String,
    /// Unique unit name ("Kilogram").
    pub name: String,
    /// Label printed on receipts ("kg").
    pub short_name: String,
}

/// Product ranking weight, stored as TEXT like [`Money`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopularityScore(Decimal);

impl PopularityScore {
    #[inline]
    pub const fn new(score: Decimal) -> Self {
        PopularityScore(score)
    }

    #[inline]
    pub const fn zero() -> Self {
        PopularityScore(Decimal::ZERO)
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for PopularityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "sqlx")]
mod score_sqlite {
    use super::PopularityScore;
    use rust_decimal::Decimal;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
    use sqlx::{Database, Decode, Encode, Type};
    use std::str::FromStr;

    impl Type<Sqlite> for PopularityScore {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for PopularityScore {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.0.to_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for PopularityScore {
        fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(PopularityScore(Decimal::from_str(text)?))
        }
    }
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier, unique across the catalog.
    pub code: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Purchase cost per unit.
    pub cost: Money,

    /// Current catalog selling price per unit.
    pub price: Money,

    /// Cashier may change the price at the till (negotiated items).
    pub is_variable_price: bool,

    pub sale_unit_id: Option<String>,

    pub purchase_unit_id: Option<String>,

    /// Low-stock alert threshold.
    pub stock_alert: Quantity,

    pub category_id: Option<String>,

    pub tax_method: TaxMethod,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Ranking heuristic recomputed out-of-band; not consistency-critical.
    pub popularity_score: PopularityScore,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Stock
// =============================================================================

/// Quantity on hand for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stock {
    pub product_id: String,
    /// Never negative; guarded by the ledger and a CHECK constraint.
    pub quantity: Quantity,
    /// Bumped by every ledger write.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// People
// =============================================================================

/// An authenticated cashier (read-only for the core).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name printed on receipts: "first last", falling back to the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller of a core operation.
///
/// Passed explicitly into every engine call instead of being read from
/// request-scoped state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub permissions: Vec<String>,
}

impl Principal {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Append-only once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub reference: String,
    pub grand_total: Money,
    /// Sale-level discount.
    pub discount: Money,
    pub paid_amount: Money,
    pub payment_status: PaymentStatus,
    /// Stored as supplied; does not influence `payment_status`.
    pub is_credit_sale: bool,
    /// Cashier.
    pub user_id: String,
    pub customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Position in the cart, starting at 1.
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: Quantity,
    /// Unit price agreed at the till (frozen).
    pub price: Money,
    /// Item-level discount.
    pub discount: Money,
    /// price × quantity − discount, computed once at insertion.
    pub total: Money,
}

/// A payment towards a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    /// Cashier that took the payment.
    pub user_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

// =============================================================================
// Held Order
// =============================================================================

/// A parked cart owned by one cashier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HeldOrder {
    pub id: String,
    pub reference: String,
    /// Owner; the only user allowed to see or touch this order.
    pub user_id: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HeldOrderItem {
    pub id: String,
    pub held_order_id: String,
    pub line_no: i64,
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    /// Catalog price captured when the order was held.
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A supplier receipt. Increases stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub reference: String,
    pub supplier: Option<String>,
    /// Σ item totals, computed at creation and never recomputed.
    pub total_cost: Money,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub line_no: i64,
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub cost_price: Money,
    /// quantity × cost_price.
    pub total_cost: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
