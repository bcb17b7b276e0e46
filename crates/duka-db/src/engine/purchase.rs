//! # Purchase Engine
//!
//! Records supplier receipts and increases stock in the same transaction.
//!
//! ```text
//! create_purchase(request)
//!   ├── validate_purchase                      → 400
//!   ├── resolve each product, in request order → 404 on the first miss
//!   ├── checkout::assemble_purchase            → totals = Σ qty × cost
//!   └── BEGIN
//!         ├── add_in(stock) per line
//!         ├── INSERT purchase, purchase_items
//!         └── COMMIT
//! ```

use chrono::Utc;
use tracing::info;

use crate::engine::stock::add_in;
use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::purchase as purchase_sql;
use duka_core::checkout::assemble_purchase;
use duka_core::dto::{PurchaseRequest, PurchaseResponse};
use duka_core::mapping::purchase_response;
use duka_core::validation::validate_purchase;
use duka_core::CoreError;

#[derive(Debug, Clone)]
pub struct PurchaseEngine {
    db: Database,
}

impl PurchaseEngine {
    pub fn new(db: Database) -> Self {
        PurchaseEngine { db }
    }

    pub async fn create_purchase(&self, request: &PurchaseRequest) -> DbResult<PurchaseResponse> {
        validate_purchase(request)?;

        let repo = self.db.products();
        let mut products = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = repo
                .get_by_id(&line.product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", &line.product_id))?;
            products.push(product);
        }

        let draft = assemble_purchase(request, &products, Utc::now())?;

        let mut tx = self.db.pool().begin().await?;
        for item in &draft.items {
            add_in(
                &mut *tx,
                &item.product_id,
                item.quantity,
                draft.purchase.purchase_date,
            )
            .await?;
        }
        purchase_sql::insert_draft(&mut *tx, &draft).await?;
        tx.commit().await?;

        info!(
            purchase_id = %draft.purchase.id,
            reference = %draft.purchase.reference,
            total_cost = %draft.purchase.total_cost,
            lines = draft.items.len(),
            "Purchase recorded"
        );

        Ok(purchase_response(&draft.purchase, &draft.items))
    }

    /// All purchases, newest first.
    pub async fn list_purchases(&self) -> DbResult<Vec<PurchaseResponse>> {
        let purchases = self.db.purchases().list().await?;

        Ok(purchases
            .iter()
            .map(|(purchase, items)| purchase_response(purchase, items))
            .collect())
    }

    pub async fn get_purchase(&self, id: &str) -> DbResult<PurchaseResponse> {
        let repo = self.db.purchases();
        let purchase = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Purchase", id))?;
        let items = repo.get_items(id).await?;

        Ok(purchase_response(&purchase, &items))
    }
}
