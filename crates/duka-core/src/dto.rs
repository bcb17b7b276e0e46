//! # Data Transfer Objects
//!
//! Request and response shapes of the REST surface. All JSON is camelCase;
//! decimals travel as strings. Every type exports a TypeScript binding so
//! the client application can import it instead of re-declaring it.
//!
//! ## Request → Entity → Response
//! ```text
//! CreateSaleRequest ──validate──► checkout::assemble_sale ──► Sale + items
//!                                                              │
//!                  SaleResponse ◄──── mapping::sale_response ◄─┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{PaymentMethod, PaymentStatus};

// =============================================================================
// Sale Requests
// =============================================================================

/// One cart line. Price and discount come from the till, not the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItemRequest {
    pub product_id: String,
    pub quantity: Quantity,
    /// Unit price agreed at the time of sale.
    pub price: Money,
    #[serde(default)]
    pub discount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentRequest {
    pub amount: Money,
    pub method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `POST /sales` and `POST /held-orders/{id}/resume`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSaleRequest {
    pub items: Vec<SaleItemRequest>,
    #[serde(default)]
    pub payments: Vec<PaymentRequest>,
    /// Overall discount on the entire sale.
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub is_credit_sale: bool,
    #[serde(default)]
    pub customer_id: Option<String>,
}

// =============================================================================
// Held Order Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HoldOrderItemRequest {
    pub product_id: String,
    pub quantity: Quantity,
}

/// Body of `POST /held-orders`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HoldOrderRequest {
    pub items: Vec<HoldOrderItemRequest>,
    pub customer_id: String,
}

/// Body of `PUT /held-orders/{id}`. Replaces the item list wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateHeldOrderRequest {
    pub items: Vec<HoldOrderItemRequest>,
}

// =============================================================================
// Purchase & Stock Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseItemRequest {
    pub product_id: String,
    pub quantity: Quantity,
    pub cost_price: Money,
}

/// Body of `POST /purchases`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub supplier: Option<String>,
    pub items: Vec<PurchaseItemRequest>,
}

/// Body of `POST /stock/adjust`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAdjustmentRequest {
    pub product_id: String,
    pub new_quantity: Quantity,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub price: Money,
    pub discount: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentResponse {
    pub amount: Money,
    pub method: PaymentMethod,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleResponse {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub grand_total: Money,
    pub discount: Money,
    pub paid_amount: Money,
    pub payment_status: PaymentStatus,
    pub is_credit_sale: bool,
    /// Cashier display name.
    pub cashier: String,
    pub customer: Option<CustomerResponse>,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub items: Vec<SaleItemResponse>,
    pub payments: Vec<PaymentResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HeldOrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub price: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HeldOrderResponse {
    pub id: String,
    pub customer_id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub items: Vec<HeldOrderItemResponse>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub cost_price: Money,
    pub total_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseResponse {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub supplier: Option<String>,
    pub total_cost: Money,
    #[ts(as = "String")]
    pub purchase_date: DateTime<Utc>,
    pub items: Vec<PurchaseItemResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockResponse {
    pub product_id: String,
    pub quantity: Quantity,
    pub version: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Listing
// =============================================================================

/// Filter for the paginated sale list. Dates are inclusive, in UTC.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleFilter {
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    /// Matches cashier username or any line's product name.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

impl SaleFilter {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn size(&self) -> u32 {
        self.size
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalePage {
    pub items: Vec<SaleResponse>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sale_request_defaults() {
        let json = r#"{
            "items": [{ "productId": "p-1", "quantity": 2, "price": "100" }]
        }"#;
        let request: CreateSaleRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.items.len(), 1);
        assert!(request.items[0].discount.is_zero());
        assert!(request.payments.is_empty());
        assert!(request.discount.is_zero());
        assert!(!request.is_credit_sale);
        assert!(request.customer_id.is_none());
    }

    #[test]
    fn test_payment_request_method_is_screaming_case() {
        let json = r#"{ "amount": 50, "method": "MPESA" }"#;
        let payment: PaymentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(payment.method, PaymentMethod::Mpesa);
        assert!(payment.notes.is_none());
    }

    #[test]
    fn test_sale_filter_paging() {
        let filter = SaleFilter::default();
        assert_eq!(filter.page(), 0);
        assert_eq!(filter.size(), 20);

        let filter = SaleFilter {
            size: Some(5000),
            ..Default::default()
        };
        assert_eq!(filter.size(), 100);

        let filter = SaleFilter {
            size: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.size(), 1);
    }
}
