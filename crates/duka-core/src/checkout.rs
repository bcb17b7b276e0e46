//! # Checkout Module
//!
//! The pure half of the sale, held order and purchase engines: totals,
//! payment status derivation, and assembly of the entity rows that the
//! database layer persists. Nothing in here touches I/O, so every rule is
//! testable in isolation.
//!
//! ## Sale Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line.total   = line.price × line.quantity − line.discount              │
//! │  grand_total  = Σ line.total − sale.discount                            │
//! │  paid_amount  = Σ payment.amount                                        │
//! │                                                                         │
//! │  payment_status:                                                        │
//! │     paid_amount ≥ grand_total ──► PAID                                  │
//! │     paid_amount > 0           ──► PARTIAL                               │
//! │     otherwise                 ──► UNPAID                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rules are checked in that order, so a zero-total sale with no
//! payments is PAID: nothing is owed.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::{CreateSaleRequest, HoldOrderItemRequest, PurchaseRequest};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::reference::{generate_reference, RefKind};
use crate::types::{
    HeldOrderItem, Payment, PaymentStatus, Principal, Product, Purchase, PurchaseItem, Sale,
    SaleItem,
};
use crate::validation::{out_of_range, ValidationResult};

// =============================================================================
// Totals
// =============================================================================

/// price × quantity, before any discount. `None` on overflow.
#[inline]
pub fn line_amount(price: Money, quantity: Quantity) -> Option<Money> {
    price.checked_mul(quantity)
}

/// price × quantity − discount. `None` on overflow.
#[inline]
pub fn line_total(price: Money, quantity: Quantity, discount: Money) -> Option<Money> {
    line_amount(price, quantity)?.checked_sub(discount)
}

/// Derives the settlement state of a sale.
///
/// ## Example
/// ```rust
/// use duka_core::checkout::derive_payment_status;
/// use duka_core::{Money, PaymentStatus};
///
/// assert_eq!(derive_payment_status(Money::from(200), Money::from(200)), PaymentStatus::Paid);
/// assert_eq!(derive_payment_status(Money::from(50), Money::from(150)), PaymentStatus::Partial);
/// assert_eq!(derive_payment_status(Money::zero(), Money::from(150)), PaymentStatus::Unpaid);
/// ```
pub fn derive_payment_status(paid_amount: Money, grand_total: Money) -> PaymentStatus {
    if paid_amount >= grand_total {
        PaymentStatus::Paid
    } else if paid_amount.is_positive() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}

/// Totals of a sale request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    /// Σ line totals (after item discounts).
    pub items_total: Money,
    pub grand_total: Money,
    pub paid_amount: Money,
    pub payment_status: PaymentStatus,
}

/// Computes totals. Prices and discounts are taken from the request as-is.
///
/// Fails with `ValidationError::OutOfRange` naming the first line or
/// payment whose amount overflows.
pub fn compute_sale_totals(request: &CreateSaleRequest) -> ValidationResult<SaleTotals> {
    let mut items_total = Money::zero();
    for (i, item) in request.items.iter().enumerate() {
        items_total = line_total(item.price, item.quantity, item.discount)
            .and_then(|total| items_total.checked_add(total))
            .ok_or_else(|| out_of_range(format!("items[{i}]")))?;
    }

    let grand_total = items_total
        .checked_sub(request.discount)
        .ok_or_else(|| out_of_range("discount"))?;

    let mut paid_amount = Money::zero();
    for (i, payment) in request.payments.iter().enumerate() {
        paid_amount = paid_amount
            .checked_add(payment.amount)
            .ok_or_else(|| out_of_range(format!("payments[{i}].amount")))?;
    }

    Ok(SaleTotals {
        items_total,
        grand_total,
        paid_amount,
        payment_status: derive_payment_status(paid_amount, grand_total),
    })
}

// =============================================================================
// Product Resolution
// =============================================================================

/// Returns requested ids absent from `found`, deduplicated, in request order.
pub fn missing_product_ids<'a, I>(requested: I, found: &HashMap<String, Product>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    requested
        .into_iter()
        .filter(|id| !found.contains_key(*id))
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Fails with every missing id when any requested product is absent.
pub fn ensure_products_exist<'a, I>(requested: I, found: &HashMap<String, Product>) -> CoreResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let ids = missing_product_ids(requested, found);
    if ids.is_empty() {
        Ok(())
    } else {
        Err(CoreError::ProductsNotFound { ids })
    }
}

fn lookup<'p>(products: &'p HashMap<String, Product>, id: &str) -> CoreResult<&'p Product> {
    products
        .get(id)
        .ok_or_else(|| CoreError::ProductsNotFound {
            ids: vec![id.to_string()],
        })
}

// =============================================================================
// Sale Assembly
// =============================================================================

/// Rows of a new sale, ready to persist in one transaction.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// Empty when nothing was paid.
    pub payments: Vec<Payment>,
}

/// Builds the sale rows for `request`.
///
/// `products` must hold every product the cart references (a batch lookup);
/// any that are missing are reported together. Product data is used only for
/// the name snapshot: the price comes from the request.
pub fn assemble_sale(
    request: &CreateSaleRequest,
    principal: &Principal,
    products: &HashMap<String, Product>,
    now: DateTime<Utc>,
) -> CoreResult<SaleDraft> {
    ensure_products_exist(request.items.iter().map(|i| i.product_id.as_str()), products)?;

    let totals = compute_sale_totals(request)?;
    let sale_id = Uuid::new_v4().to_string();

    let sale = Sale {
        id: sale_id.clone(),
        reference: generate_reference(RefKind::Sale, now),
        grand_total: totals.grand_total,
        discount: request.discount,
        paid_amount: totals.paid_amount,
        payment_status: totals.payment_status,
        is_credit_sale: request.is_credit_sale,
        user_id: principal.user_id.clone(),
        customer_id: request.customer_id.clone(),
        created_at: now,
    };

    let items = request
        .items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let product = lookup(products, &line.product_id)?;
            Ok(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                line_no: i as i64 + 1,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                price: line.price,
                discount: line.discount,
                total: line_total(line.price, line.quantity, line.discount)
                    .ok_or_else(|| out_of_range(format!("items[{i}]")))?,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let payments = if totals.paid_amount.is_positive() {
        request
            .payments
            .iter()
            .map(|p| Payment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                user_id: principal.user_id.clone(),
                amount: p.amount,
                method: p.method,
                notes: p.notes.clone(),
                paid_at: now,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(SaleDraft {
        sale,
        items,
        payments,
    })
}

// =============================================================================
// Held Order Assembly
// =============================================================================

/// Builds held order lines, snapshotting each product's CURRENT catalog price.
pub fn assemble_held_items(
    held_order_id: &str,
    items: &[HoldOrderItemRequest],
    products: &HashMap<String, Product>,
    now: DateTime<Utc>,
) -> CoreResult<Vec<HeldOrderItem>> {
    ensure_products_exist(items.iter().map(|i| i.product_id.as_str()), products)?;

    items
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let product = lookup(products, &line.product_id)?;
            Ok(HeldOrderItem {
                id: Uuid::new_v4().to_string(),
                held_order_id: held_order_id.to_string(),
                line_no: i as i64 + 1,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                price: product.price,
                created_at: now,
            })
        })
        .collect()
}

// =============================================================================
// Purchase Assembly
// =============================================================================

#[derive(Debug, Clone)]
pub struct PurchaseDraft {
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}

/// Builds purchase rows. `products[i]` is the resolved product of
/// `request.items[i]`.
pub fn assemble_purchase(
    request: &PurchaseRequest,
    products: &[Product],
    now: DateTime<Utc>,
) -> CoreResult<PurchaseDraft> {
    let purchase_id = Uuid::new_v4().to_string();

    let items = request
        .items
        .iter()
        .zip(products)
        .enumerate()
        .map(|(i, (line, product))| {
            Ok(PurchaseItem {
                id: Uuid::new_v4().to_string(),
                purchase_id: purchase_id.clone(),
                line_no: i as i64 + 1,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                cost_price: line.cost_price,
                total_cost: line_amount(line.cost_price, line.quantity)
                    .ok_or_else(|| out_of_range(format!("items[{i}]")))?,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let total_cost = items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total_cost))
        .ok_or_else(|| out_of_range("items"))?;

    let purchase = Purchase {
        id: purchase_id,
        reference: generate_reference(RefKind::Purchase, now),
        supplier: request.supplier.as_ref().map(|s| s.trim().to_string()),
        total_cost,
        purchase_date: now,
    };

    Ok(PurchaseDraft { purchase, items })
}

// =============================================================================
// Unit Tests
// =============================================================================
