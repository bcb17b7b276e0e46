//! # Held Order Repository
//!
//! Parked carts. Every mutating statement is keyed by `(id, user_id)` so a
//! row can only ever be changed by its owner, whatever the caller checked
//! beforehand.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use duka_core::{HeldOrder, HeldOrderItem};

#[derive(Debug, Clone)]
pub struct HeldOrderRepository {
    pool: SqlitePool,
}

impl HeldOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HeldOrderRepository { pool }
    }

    /// Gets a held order by ID, regardless of owner.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<HeldOrder>> {
        let order = sqlx::query_as::<_, HeldOrder>("SELECT * FROM held_orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn get_items(&self, held_order_id: &str) -> DbResult<Vec<HeldOrderItem>> {
        let items = sqlx::query_as::<_, HeldOrderItem>(
            "SELECT * FROM held_order_items WHERE held_order_id = ?1 ORDER BY line_no",
        )
        .bind(held_order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Every held order owned by `user_id`, newest first, with its items.
    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> DbResult<Vec<(HeldOrder, Vec<HeldOrderItem>)>> {
        let orders = sqlx::query_as::<_, HeldOrder>(
            "SELECT * FROM held_orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, HeldOrderItem>(
            r#"
            SELECT i.* FROM held_order_items i
            JOIN held_orders o ON o.id = i.held_order_id
            WHERE o.user_id = ?1
            ORDER BY i.held_order_id, i.line_no
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<HeldOrderItem>> = HashMap::new();
        for item in items {
            by_order
                .entry(item.held_order_id.clone())
                .or_default()
                .push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                (order, items)
            })
            .collect())
    }
}

// =============================================================================
// Connection-scoped writes
// =============================================================================

pub async fn insert(
    conn: &mut SqliteConnection,
    order: &HeldOrder,
    items: &[HeldOrderItem],
) -> DbResult<()> {
    debug!(id = %order.id, reference = %order.reference, "Inserting held order");

    sqlx::query(
        r#"
        INSERT INTO held_orders (id, reference, user_id, customer_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&order.id)
    .bind(&order.reference)
    .bind(&order.user_id)
    .bind(&order.customer_id)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    insert_items(conn, items).await
}

async fn insert_items(conn: &mut SqliteConnection, items: &[HeldOrderItem]) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO held_order_items (
                id, held_order_id, line_no, product_id, product_name,
                quantity, price, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.held_order_id)
        .bind(item.line_no)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Replaces the item list of an owned order and bumps `updated_at`.
///
/// Returns `false` (and writes nothing) when no order `(id, user_id)` exists.
pub async fn replace_items(
    conn: &mut SqliteConnection,
    id: &str,
    user_id: &str,
    items: &[HeldOrderItem],
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let touched = sqlx::query("UPDATE held_orders SET updated_at = ?1 WHERE id = ?2 AND user_id = ?3")
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    if touched.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM held_order_items WHERE held_order_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    insert_items(conn, items).await?;

    Ok(true)
}

/// Deletes an owned order (items cascade). Returns whether a row went.
pub async fn delete(conn: &mut SqliteConnection, id: &str, user_id: &str) -> DbResult<bool> {
    debug!(id = %id, "Deleting held order");

    let result = sqlx::query("DELETE FROM held_orders WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() == 1)
}
