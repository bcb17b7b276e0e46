//! # Sale Repository
//!
//! Database operations for sales, sale items and payments.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. ASSEMBLE (duka-core::checkout)                                     │
//! │     └── SaleDraft { sale, items, payments }                            │
//! │                                                                         │
//! │  2. INSERT (this module, inside the engine's transaction)              │
//! │     └── insert_draft() → sales, sale_items, payments                   │
//! │                                                                         │
//! │  3. READ                                                              │
//! │     └── get_by_id() / get_items() / get_payments() / list()            │
//! │                                                                         │
//! │  There is no UPDATE: a sale is append-only once committed.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use duka_core::checkout::SaleDraft;
use duka_core::dto::SaleFilter;
use duka_core::{Payment, Sale, SaleItem};

/// Shared WHERE clause of the sale list and its count.
///
/// ?1 = start (inclusive), ?2 = end (exclusive), ?3 = LIKE pattern built by
/// [`contains_pattern`].
const LIST_FILTER: &str = r#"
    FROM sales s
    JOIN users u ON u.id = s.user_id
    WHERE (?1 IS NULL OR s.created_at >= ?1)
      AND (?2 IS NULL OR s.created_at < ?2)
      AND (
        ?3 IS NULL
        OR u.username LIKE ?3 ESCAPE '\'
        OR EXISTS (
            SELECT 1 FROM sale_items si
            WHERE si.sale_id = s.id AND si.product_name LIKE ?3 ESCAPE '\'
        )
      )
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in cart order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ?1 ORDER BY line_no",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all payments for a sale.
    pub async fn get_payments(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE sale_id = ?1 ORDER BY paid_at, rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// One page of sales matching `filter`, newest first, plus the total
    /// number of matches.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<(Vec<Sale>, i64)> {
        let start = filter.start_date.map(start_of_day);
        let end = filter
            .end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(start_of_day);
        let query = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        let size = i64::from(filter.size());
        let offset = i64::from(filter.page()) * size;

        debug!(?start, ?end, ?query, size, offset, "Listing sales");

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {LIST_FILTER}"))
            .bind(start)
            .bind(end)
            .bind(&query)
            .fetch_one(&self.pool)
            .await?;

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT s.* {LIST_FILTER} ORDER BY s.created_at DESC, s.rowid DESC LIMIT ?4 OFFSET ?5"
        ))
        .bind(start)
        .bind(end)
        .bind(&query)
        .bind(size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((sales, total))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `%text%` with LIKE metacharacters in `text` matched literally.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Inserts a sale with its items and payments on `conn`.
///
/// The sale row goes first, so the enclosing transaction takes the writer
/// lock on its first statement.
pub async fn insert_draft(conn: &mut SqliteConnection, draft: &SaleDraft) -> DbResult<()> {
    let sale = &draft.sale;
    debug!(id = %sale.id, reference = %sale.reference, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, reference, grand_total, discount, paid_amount,
            payment_status, is_credit_sale, user_id, customer_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.reference)
    .bind(sale.grand_total)
    .bind(sale.discount)
    .bind(sale.paid_amount)
    .bind(sale.payment_status)
    .bind(sale.is_credit_sale)
    .bind(&sale.user_id)
    .bind(&sale.customer_id)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    for item in &draft.items {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, line_no, product_id, product_name,
                quantity, price, discount, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(item.line_no)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.discount)
        .bind(item.total)
        .execute(&mut *conn)
        .await?;
    }

    for payment in &draft.payments {
        sqlx::query(
            r#"
            INSERT INTO payments (id, sale_id, user_id, amount, method, notes, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(&payment.user_id)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(&payment.notes)
        .bind(payment.paid_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
