//! Projections from persisted entities to response DTOs.
//!
//! Pure functions: the caller loads the rows (sale, lines, payments, cashier,
//! customer) and these assemble the wire shape. Line order follows
//! `line_no`.

use crate::dto::{
    CustomerResponse, HeldOrderItemResponse, HeldOrderResponse, PaymentResponse,
    PurchaseItemResponse, PurchaseResponse, SaleItemResponse, SaleResponse, StockResponse,
};
use crate::types::{
    Customer, HeldOrder, HeldOrderItem, Payment, Purchase, PurchaseItem, Sale, SaleItem, Stock,
    User,
};

impl From<&Customer> for CustomerResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
            phone_number: customer.phone_number.clone(),
        }
    }
}

impl From<&Stock> for StockResponse {
    fn from(stock: &Stock) -> Self {
        Self {
            product_id: stock.product_id.clone(),
            quantity: stock.quantity,
            version: stock.version,
            updated_at: stock.updated_at,
        }
    }
}

impl From<&SaleItem> for SaleItemResponse {
    fn from(item: &SaleItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price,
            discount: item.discount,
            total: item.total,
        }
    }
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            amount: payment.amount,
            method: payment.method,
            notes: payment.notes.clone(),
            paid_at: payment.paid_at,
        }
    }
}

impl From<&HeldOrderItem> for HeldOrderItemResponse {
    fn from(item: &HeldOrderItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
        }
    }
}

impl From<&PurchaseItem> for PurchaseItemResponse {
    fn from(item: &PurchaseItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            cost_price: item.cost_price,
            total_cost: item.total_cost,
        }
    }
}

/// Builds the sale receipt view.
pub fn sale_response(
    sale: &Sale,
    items: &[SaleItem],
    payments: &[Payment],
    cashier: &User,
    customer: Option<&Customer>,
) -> SaleResponse {
    let mut items: Vec<&SaleItem> = items.iter().collect();
    items.sort_by_key(|i| i.line_no);

    SaleResponse {
        id: sale.id.clone(),
        reference: sale.reference.clone(),
        grand_total: sale.grand_total,
        discount: sale.discount,
        paid_amount: sale.paid_amount,
        payment_status: sale.payment_status,
        is_credit_sale: sale.is_credit_sale,
        cashier: cashier.display_name(),
        customer: customer.map(CustomerResponse::from),
        sale_date: sale.created_at,
        items: items.into_iter().map(SaleItemResponse::from).collect(),
        payments: payments.iter().map(PaymentResponse::from).collect(),
    }
}

pub fn held_order_response(order: &HeldOrder, items: &[HeldOrderItem]) -> HeldOrderResponse {
    let mut items: Vec<&HeldOrderItem> = items.iter().collect();
    items.sort_by_key(|i| i.line_no);

    HeldOrderResponse {
        id: order.id.clone(),
        customer_id: order.customer_id.clone(),
        reference: order.reference.clone(),
        items: items.into_iter().map(HeldOrderItemResponse::from).collect(),
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

pub fn purchase_response(purchase: &Purchase, items: &[PurchaseItem]) -> PurchaseResponse {
    let mut items: Vec<&PurchaseItem> = items.iter().collect();
    items.sort_by_key(|i| i.line_no);

    PurchaseResponse {
        id: purchase.id.clone(),
        reference: purchase.reference.clone(),
        supplier: purchase.supplier.clone(),
        total_cost: purchase.total_cost,
        purchase_date: purchase.purchase_date,
        items: items.into_iter().map(PurchaseItemResponse::from).collect(),
    }
}
