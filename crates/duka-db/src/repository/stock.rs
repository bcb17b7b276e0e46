//! # Stock Repository
//!
//! SQL for the stock ledger. Reads go through [`StockRepository`] on the
//! pool; writes are free functions over a `SqliteConnection` so the engines
//! can run them inside their own transaction.
//!
//! ## Atomic Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every write is ONE statement; SQLite applies it under the writer lock │
//! │                                                                         │
//! │  increase   quantity = quantity + ?                                    │
//! │  reduce     quantity = MAX(quantity - ?, 0)          (clamp)           │
//! │  reduce     quantity = quantity - ?  WHERE quantity >= ?   (strict)    │
//! │  set        quantity = ?                                               │
//! │                                                                         │
//! │  …, version = version + 1 RETURNING the new row                        │
//! │                                                                         │
//! │  No read-modify-write round trip, so two concurrent sales can never    │
//! │  both read "10" and both write "9".                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

use crate::error::DbResult;
use duka_core::{Quantity, Stock};

const RETURNING: &str = "RETURNING product_id, quantity, version, updated_at";

/// Read access to stock rows.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets the stock row of one product.
    pub async fn get(&self, product_id: &str) -> DbResult<Option<Stock>> {
        let stock = sqlx::query_as::<_, Stock>("SELECT * FROM stock WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Gets stock rows for many products. Unknown ids are absent.
    pub async fn get_many(&self, product_ids: &[String]) -> DbResult<HashMap<String, Stock>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM stock WHERE product_id IN (");
        let mut separated = builder.separated(", ");
        for id in product_ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<Stock> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|s| (s.product_id.clone(), s))
            .collect())
    }
}

// =============================================================================
// Connection-scoped writes
// =============================================================================

/// `quantity += qty`. `None` when the product has no stock row.
pub async fn increase(
    conn: &mut SqliteConnection,
    product_id: &str,
    qty: Quantity,
    now: DateTime<Utc>,
) -> DbResult<Option<Stock>> {
    let sql = format!(
        "UPDATE stock SET quantity = quantity + ?1, version = version + 1, updated_at = ?2 \
         WHERE product_id = ?3 {RETURNING}"
    );
    let stock = sqlx::query_as::<_, Stock>(&sql)
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    Ok(stock)
}

/// `quantity = max(quantity - qty, 0)`. `None` when there is no stock row.
pub async fn reduce_clamped(
    conn: &mut SqliteConnection,
    product_id: &str,
    qty: Quantity,
    now: DateTime<Utc>,
) -> DbResult<Option<Stock>> {
    let sql = format!(
        "UPDATE stock SET quantity = MAX(quantity - ?1, 0), version = version + 1, updated_at = ?2 \
         WHERE product_id = ?3 {RETURNING}"
    );
    let stock = sqlx::query_as::<_, Stock>(&sql)
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    Ok(stock)
}

/// `quantity -= qty` only when enough is on hand. `None` when the row is
/// missing OR short; use [`exists`] to tell the two apart.
pub async fn reduce_strict(
    conn: &mut SqliteConnection,
    product_id: &str,
    qty: Quantity,
    now: DateTime<Utc>,
) -> DbResult<Option<Stock>> {
    let sql = format!(
        "UPDATE stock SET quantity = quantity - ?1, version = version + 1, updated_at = ?2 \
         WHERE product_id = ?3 AND quantity >= ?1 {RETURNING}"
    );
    let stock = sqlx::query_as::<_, Stock>(&sql)
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    Ok(stock)
}

/// `quantity = qty`. `None` when there is no stock row.
pub async fn set(
    conn: &mut SqliteConnection,
    product_id: &str,
    qty: Quantity,
    now: DateTime<Utc>,
) -> DbResult<Option<Stock>> {
    let sql = format!(
        "UPDATE stock SET quantity = ?1, version = version + 1, updated_at = ?2 \
         WHERE product_id = ?3 {RETURNING}"
    );
    let stock = sqlx::query_as::<_, Stock>(&sql)
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    Ok(stock)
}

/// Whether a stock row exists for `product_id`.
pub async fn exists(conn: &mut SqliteConnection, product_id: &str) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stock WHERE product_id = ?1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}
