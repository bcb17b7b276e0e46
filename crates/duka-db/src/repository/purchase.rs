//! # Purchase Repository
//!
//! Supplier receipts and their lines. Append-only, like sales.

use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use duka_core::checkout::PurchaseDraft;
use duka_core::{Purchase, PurchaseItem};

#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(purchase)
    }

    pub async fn get_items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ?1 ORDER BY line_no",
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// All purchases, newest first, each with its items.
    pub async fn list(&self) -> DbResult<Vec<(Purchase, Vec<PurchaseItem>)>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases ORDER BY purchase_date DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items ORDER BY purchase_id, line_no",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_purchase: HashMap<String, Vec<PurchaseItem>> = HashMap::new();
        for item in items {
            by_purchase
                .entry(item.purchase_id.clone())
                .or_default()
                .push(item);
        }

        Ok(purchases
            .into_iter()
            .map(|purchase| {
                let items = by_purchase.remove(&purchase.id).unwrap_or_default();
                (purchase, items)
            })
            .collect())
    }
}

/// Inserts a purchase with its items on `conn`.
pub async fn insert_draft(conn: &mut SqliteConnection, draft: &PurchaseDraft) -> DbResult<()> {
    let purchase = &draft.purchase;
    debug!(id = %purchase.id, reference = %purchase.reference, "Inserting purchase");

    sqlx::query(
        r#"
        INSERT INTO purchases (id, reference, supplier, total_cost, purchase_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&purchase.id)
    .bind(&purchase.reference)
    .bind(&purchase.supplier)
    .bind(purchase.total_cost)
    .bind(purchase.purchase_date)
    .execute(&mut *conn)
    .await?;

    for item in &draft.items {
        sqlx::query(
            r#"
            INSERT INTO purchase_items (
                id, purchase_id, line_no, product_id, product_name,
                quantity, cost_price, total_cost
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.purchase_id)
        .bind(item.line_no)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.cost_price)
        .bind(item.total_cost)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
