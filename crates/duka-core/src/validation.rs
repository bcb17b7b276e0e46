//! # Validation Module
//!
//! Request validation for the sale, held order, purchase and stock
//! endpoints. Runs before any lookup or persistence.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (serde)                                       │
//! │  ├── Shape + type checks (missing items, bad enum tag)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: business rule validation                        │
//! │  ├── non-empty carts, positive quantities, ≤ 3 decimal places          │
//! │  └── non-negative prices/discounts/payments, totals in range           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0) on stock                                    │
//! │  ├── UNIQUE refs / codes                                               │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown ids are NOT a validation concern: ids are opaque strings and
//! resolving them is the engines' job (NotFound, 404).

use crate::checkout::{compute_sale_totals, line_amount};
use crate::dto::{
    CreateSaleRequest, HoldOrderItemRequest, HoldOrderRequest, PurchaseRequest,
    StockAdjustmentRequest, UpdateHeldOrderRequest,
};
use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::MAX_CART_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of free-text notes and supplier names.
pub const MAX_TEXT_LEN: usize = 255;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an opaque id is present.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - At most 3 decimal places
/// - Must fit the stock ledger's integer thousandths
pub fn validate_quantity(field: &str, qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    validate_precision(field, qty)
}

/// Validates an absolute stock level (zero allowed).
pub fn validate_stock_level(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    validate_precision(field, qty)
}

fn validate_precision(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.scale() > Quantity::MAX_SCALE {
        return Err(ValidationError::TooPrecise {
            field: field.to_string(),
            max_scale: Quantity::MAX_SCALE,
        });
    }
    if qty.to_thousandths().is_none() {
        return Err(out_of_range(field));
    }
    Ok(())
}

pub(crate) fn out_of_range(field: impl Into<String>) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.into(),
    }
}

/// Validates an amount is zero or greater (prices, discounts, costs).
///
/// ## Example
/// ```rust
/// use duka_core::money::Money;
/// use duka_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", Money::from(0)).is_ok());
/// assert!(validate_non_negative("price", Money::from(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must not be negative. A zero payment (a credit sale recorded with
///   nothing tendered) is accepted and writes no payment row.
pub fn validate_payment_amount(field: &str, amount: Money) -> ValidationResult<()> {
    validate_non_negative(field, amount)
}

fn validate_text(field: &str, text: Option<&str>) -> ValidationResult<()> {
    if let Some(text) = text {
        if text.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_TEXT_LEN,
            });
        }
    }
    Ok(())
}

/// Validates the number of lines in a cart.
pub fn validate_cart_size(field: &str, lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::TooMany {
            field: field.to_string(),
            max: MAX_CART_ITEMS,
        });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a sale request.
///
/// ## Rules
/// ```text
/// items        non-empty, ≤ MAX_CART_ITEMS
/// quantity     > 0, ≤ 3 decimal places
/// price        ≥ 0
/// discount     ≥ 0 and ≤ price × quantity          (per line)
/// payments     amount ≥ 0
/// discount     ≥ 0 and ≤ Σ line totals             (sale level)
/// totals       every product and sum representable
/// ```
pub fn validate_create_sale(request: &CreateSaleRequest) -> ValidationResult<()> {
    validate_cart_size("items", request.items.len())?;

    for (i, item) in request.items.iter().enumerate() {
        validate_id(&format!("items[{i}].productId"), &item.product_id)?;
        validate_quantity(&format!("items[{i}].quantity"), item.quantity)?;
        validate_non_negative(&format!("items[{i}].price"), item.price)?;
        validate_non_negative(&format!("items[{i}].discount"), item.discount)?;

        let amount = line_amount(item.price, item.quantity)
            .ok_or_else(|| out_of_range(format!("items[{i}]")))?;
        if item.discount > amount {
            return Err(ValidationError::ExceedsLimit {
                field: format!("items[{i}].discount"),
                limit: format!("line amount {amount}"),
            });
        }
    }

    for (i, payment) in request.payments.iter().enumerate() {
        validate_payment_amount(&format!("payments[{i}].amount"), payment.amount)?;
        validate_text(&format!("payments[{i}].notes"), payment.notes.as_deref())?;
    }

    validate_non_negative("discount", request.discount)?;
    let totals = compute_sale_totals(request)?;
    if request.discount > totals.items_total {
        return Err(ValidationError::ExceedsLimit {
            field: "discount".to_string(),
            limit: format!("items total {}", totals.items_total),
        });
    }

    if let Some(customer_id) = &request.customer_id {
        validate_id("customerId", customer_id)?;
    }

    Ok(())
}

fn validate_hold_items(items: &[HoldOrderItemRequest]) -> ValidationResult<()> {
    validate_cart_size("items", items.len())?;
    for (i, item) in items.iter().enumerate() {
        validate_id(&format!("items[{i}].productId"), &item.product_id)?;
        validate_quantity(&format!("items[{i}].quantity"), item.quantity)?;
    }
    Ok(())
}

/// Validates a hold request.
pub fn validate_hold_order(request: &HoldOrderRequest) -> ValidationResult<()> {
    validate_hold_items(&request.items)?;
    validate_id("customerId", &request.customer_id)
}

/// Validates a held order update.
pub fn validate_update_held_order(request: &UpdateHeldOrderRequest) -> ValidationResult<()> {
    validate_hold_items(&request.items)
}

/// Validates a purchase request.
pub fn validate_purchase(request: &PurchaseRequest) -> ValidationResult<()> {
    validate_cart_size("items", request.items.len())?;

    if let Some(supplier) = &request.supplier {
        if supplier.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "supplier".to_string(),
            });
        }
    }
    validate_text("supplier", request.supplier.as_deref())?;

    let mut total_cost = Money::zero();
    for (i, item) in request.items.iter().enumerate() {
        validate_id(&format!("items[{i}].productId"), &item.product_id)?;
        validate_quantity(&format!("items[{i}].quantity"), item.quantity)?;
        validate_non_negative(&format!("items[{i}].costPrice"), item.cost_price)?;

        total_cost = line_amount(item.cost_price, item.quantity)
            .and_then(|cost| total_cost.checked_add(cost))
            .ok_or_else(|| out_of_range(format!("items[{i}]")))?;
    }
    Ok(())
}

/// Validates a manual stock correction.
pub fn validate_stock_adjustment(request: &StockAdjustmentRequest) -> ValidationResult<()> {
    validate_id("productId", &request.product_id)?;
    validate_stock_level("newQuantity", request.new_quantity)
}

/// Validates a batch stock lookup.
pub fn validate_product_ids(ids: &[String]) -> ValidationResult<()> {
    validate_cart_size("productIds", ids.len())?;
    for (i, id) in ids.iter().enumerate() {
        validate_id(&format!("productIds[{i}]"), id)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{PaymentRequest, PurchaseItemRequest, SaleItemRequest};
    use crate::types::PaymentMethod;
    use rust_decimal_macros::dec;

    fn item(qty: Quantity, price: i64, discount: i64) -> SaleItemRequest {
        SaleItemRequest {
            product_id: "p-1".to_string(),
            quantity: qty,
            price: Money::from(price),
            discount: Money::from(discount),
        }
    }

    fn sale(items: Vec<SaleItemRequest>) -> CreateSaleRequest {
        CreateSaleRequest {
            items,
            payments: vec![],
            discount: Money::zero(),
            is_credit_sale: false,
            customer_id: None,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = validate_create_sale(&sale(vec![])).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_valid_sale() {
        let mut request = sale(vec![item(Quantity::from(2), 100, 0)]);
        request.payments.push(PaymentRequest {
            amount: Money::from(200),
            method: PaymentMethod::Cash,
            notes: None,
        });
        assert!(validate_create_sale(&request).is_ok());
    }

    #[test]
    fn test_quantity_rules() {
        assert!(validate_quantity("q", Quantity::new(dec!(0.25))).is_ok());
        assert!(validate_quantity("q", Quantity::zero()).is_err());
        assert!(validate_quantity("q", Quantity::from(-1)).is_err());
        assert!(matches!(
            validate_quantity("q", Quantity::new(dec!(1.0005))),
            Err(ValidationError::TooPrecise { .. })
        ));
        // trailing zeros don't count
        assert!(validate_quantity("q", Quantity::new(dec!(1.5000))).is_ok());
    }

    #[test]
    fn test_item_discount_cannot_exceed_line() {
        let request = sale(vec![item(Quantity::from(1), 100, 101)]);
        assert!(matches!(
            validate_create_sale(&request),
            Err(ValidationError::ExceedsLimit { .. })
        ));

        let request = sale(vec![item(Quantity::from(1), 100, 100)]);
        assert!(validate_create_sale(&request).is_ok());
    }

    #[test]
    fn test_sale_discount_cannot_make_total_negative() {
        let mut request = sale(vec![item(Quantity::from(2), 100, 0)]);
        request.discount = Money::from(201);
        let err = validate_create_sale(&request).unwrap_err();
        assert_eq!(err.to_string(), "discount cannot exceed items total 200");

        request.discount = Money::from(200);
        assert!(validate_create_sale(&request).is_ok());
    }

    #[test]
    fn test_zero_credit_payment_accepted() {
        let mut request = sale(vec![item(Quantity::from(1), 150, 0)]);
        request.is_credit_sale = true;
        request.payments.push(PaymentRequest {
            amount: Money::zero(),
            method: PaymentMethod::Credit,
            notes: None,
        });
        assert!(validate_create_sale(&request).is_ok());

        request.payments[0].amount = Money::from(-1);
        let err = validate_create_sale(&request).unwrap_err();
        assert_eq!(err.to_string(), "payments[0].amount must not be negative");
    }

    #[test]
    fn test_overflowing_line_amount_is_rejected() {
        let request = sale(vec![SaleItemRequest {
            product_id: "p-1".to_string(),
            quantity: Quantity::from(1_000_000),
            price: "79000000000000000000000000".parse().unwrap(),
            discount: Money::zero(),
        }]);
        let err = validate_create_sale(&request).unwrap_err();
        assert_eq!(err.to_string(), "items[0] is out of range");
    }

    #[test]
    fn test_overflowing_items_total_is_rejected() {
        let price: Money = "50000000000000000000000000000".parse().unwrap();
        let line = SaleItemRequest {
            product_id: "p-1".to_string(),
            quantity: Quantity::from(1),
            price,
            discount: Money::zero(),
        };
        let request = sale(vec![line.clone(), line]);
        assert!(matches!(
            validate_create_sale(&request),
            Err(ValidationError::OutOfRange { field }) if field == "items[1]"
        ));
    }

    #[test]
    fn test_quantity_beyond_storage_range_is_rejected() {
        let huge: Quantity = "10000000000000000".parse().unwrap();
        assert!(matches!(
            validate_quantity("q", huge),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_stock_level("newQuantity", huge),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_quantity("q", Quantity::from(1_000_000_000)).is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let request = sale(vec![item(Quantity::from(1), -5, 0)]);
        assert!(matches!(
            validate_create_sale(&request),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_unknown_looking_ids_are_not_validation_errors() {
        let mut request = sale(vec![item(Quantity::from(1), 10, 0)]);
        request.items[0].product_id = "999".to_string();
        assert!(validate_create_sale(&request).is_ok());

        request.items[0].product_id = "  ".to_string();
        assert!(validate_create_sale(&request).is_err());
    }

    #[test]
    fn test_hold_order_requires_customer() {
        let request = HoldOrderRequest {
            items: vec![HoldOrderItemRequest {
                product_id: "p-1".to_string(),
                quantity: Quantity::from(1),
            }],
            customer_id: "".to_string(),
        };
        assert!(validate_hold_order(&request).is_err());
    }

    #[test]
    fn test_purchase_rules() {
        let mut request = PurchaseRequest {
            supplier: Some("Bidco".to_string()),
            items: vec![PurchaseItemRequest {
                product_id: "p-1".to_string(),
                quantity: Quantity::from(10),
                cost_price: Money::from(20),
            }],
        };
        assert!(validate_purchase(&request).is_ok());

        request.supplier = None;
        assert!(validate_purchase(&request).is_ok());

        request.supplier = Some(" ".to_string());
        assert!(validate_purchase(&request).is_err());

        request.supplier = None;
        request.items[0].cost_price = Money::from(-1);
        assert!(validate_purchase(&request).is_err());

        request.items[0].cost_price = "79000000000000000000000000".parse().unwrap();
        request.items[0].quantity = Quantity::from(1_000_000);
        assert!(matches!(
            validate_purchase(&request),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_stock_adjustment_rejects_negative() {
        let mut request = StockAdjustmentRequest {
            product_id: "p-1".to_string(),
            new_quantity: Quantity::zero(),
        };
        assert!(validate_stock_adjustment(&request).is_ok());

        request.new_quantity = Quantity::from(-3);
        let err = validate_stock_adjustment(&request).unwrap_err();
        assert_eq!(err.to_string(), "newQuantity must not be negative");
    }

    #[test]
    fn test_cart_size_limit() {
        assert!(validate_cart_size("items", MAX_CART_ITEMS).is_ok());
        assert!(validate_cart_size("items", MAX_CART_ITEMS + 1).is_err());
    }
}
