//! # Stock Ledger
//!
//! The only writer of `stock.quantity`. Every mutation is one atomic UPDATE
//! (see [`crate::repository::stock`]), so the quantity never goes negative
//! and concurrent sales never lose each other's decrements.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_stock(product, qty)       purchases, returns          + qty        │
//! │  reduce_stock(product, qty)    sales                       − qty ≥ 0    │
//! │  adjust_stock(product, level)  manual counts               = level      │
//! │  get_stock / get_stocks_for_products                       read         │
//! │                                                                         │
//! │  Standalone calls run on their own connection. The engines use the     │
//! │  `*_in` variants inside their transaction instead.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Oversell
//! [`OversellPolicy::Clamp`] (default) floors the quantity at zero and lets
//! the sale through. [`OversellPolicy::Reject`] fails the reduction with
//! `InsufficientStock` and leaves the row untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::stock as sql;
use duka_core::dto::StockAdjustmentRequest;
use duka_core::validation::{validate_id, validate_quantity, validate_stock_adjustment};
use duka_core::{CoreError, Quantity, Stock};

/// What a reduction does when it asks for more than is on hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversellPolicy {
    /// Floor at zero, no error.
    #[default]
    Clamp,
    /// Fail with `InsufficientStock`.
    Reject,
}

/// Stock ledger over the shared database.
#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
}

impl StockLedger {
    pub fn new(db: Database) -> Self {
        StockLedger { db }
    }

    /// Increases the quantity on hand.
    pub async fn add_stock(&self, product_id: &str, qty: Quantity) -> DbResult<Stock> {
        validate_id("productId", product_id)?;
        validate_quantity("quantity", qty)?;

        let mut conn = self.db.pool().acquire().await?;
        add_in(&mut conn, product_id, qty, Utc::now()).await
    }

    /// Decreases the quantity on hand according to the configured policy.
    pub async fn reduce_stock(&self, product_id: &str, qty: Quantity) -> DbResult<Stock> {
        validate_id("productId", product_id)?;
        validate_quantity("quantity", qty)?;

        let mut conn = self.db.pool().acquire().await?;
        reduce_in(
            &mut conn,
            product_id,
            qty,
            self.db.oversell_policy(),
            Utc::now(),
        )
        .await
    }

    /// Sets an absolute level after a manual count.
    pub async fn adjust_stock(&self, request: &StockAdjustmentRequest) -> DbResult<Stock> {
        validate_stock_adjustment(request)?;

        let mut conn = self.db.pool().acquire().await?;
        let stock = sql::set(
            &mut conn,
            &request.product_id,
            request.new_quantity,
            Utc::now(),
        )
        .await?
        .ok_or_else(|| CoreError::not_found("Stock", &request.product_id))?;

        info!(
            product_id = %stock.product_id,
            quantity = %stock.quantity,
            version = stock.version,
            "Stock adjusted"
        );

        Ok(stock)
    }

    pub async fn get_stock(&self, product_id: &str) -> DbResult<Stock> {
        let stock = self
            .db
            .stock()
            .get(product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Stock", product_id))?;

        Ok(stock)
    }

    /// Stock rows keyed by product id; unknown ids are simply absent.
    pub async fn get_stocks_for_products(
        &self,
        product_ids: &[String],
    ) -> DbResult<HashMap<String, Stock>> {
        self.db.stock().get_many(product_ids).await
    }
}

// =============================================================================
// Transaction-scoped operations
// =============================================================================

/// `add_stock` on an existing connection or transaction.
pub async fn add_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    qty: Quantity,
    now: DateTime<Utc>,
) -> DbResult<Stock> {
    let stock = sql::increase(conn, product_id, qty, now)
        .await?
        .ok_or_else(|| CoreError::not_found("Stock", product_id))?;

    debug!(product_id, added = %qty, quantity = %stock.quantity, "Stock increased");
    Ok(stock)
}

/// `reduce_stock` on an existing connection or transaction.
pub async fn reduce_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    qty: Quantity,
    policy: OversellPolicy,
    now: DateTime<Utc>,
) -> DbResult<Stock> {
    let stock = match policy {
        OversellPolicy::Clamp => sql::reduce_clamped(&mut *conn, product_id, qty, now)
            .await?
            .ok_or_else(|| CoreError::not_found("Stock", product_id))?,

        OversellPolicy::Reject => match sql::reduce_strict(&mut *conn, product_id, qty, now).await? {
            Some(stock) => stock,
            None if sql::exists(&mut *conn, product_id).await? => {
                warn!(product_id, requested = %qty, "Rejected oversell");
                return Err(CoreError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: qty,
                }
                .into());
            }
            None => return Err(CoreError::not_found("Stock", product_id).into()),
        },
    };

    if stock.quantity.is_zero() {
        warn!(product_id, requested = %qty, "Stock bottomed out at zero");
    } else {
        debug!(product_id, reduced = %qty, quantity = %stock.quantity, "Stock reduced");
    }

    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use crate::test_support::{file_database, seed_product};

    fn qty(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_reduce_clamps_at_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "EGG", 15, 3).await;

        let stock = db
            .stock_ledger()
            .reduce_stock(&product.id, qty("5"))
            .await
            .unwrap();

        assert_eq!(stock.quantity, Quantity::zero());
        // seeded (1) + reduce (1)
        assert_eq!(stock.version, 2);
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_oversell() {
        let db = Database::new(DbConfig::in_memory().oversell(OversellPolicy::Reject))
            .await
            .unwrap();
        let product = seed_product(&db, "EGG", 15, 3).await;
        let ledger = db.stock_ledger();

        let err = ledger.reduce_stock(&product.id, qty("5")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(ledger.get_stock(&product.id).await.unwrap().quantity, qty("3"));

        let stock = ledger.reduce_stock(&product.id, qty("3")).await.unwrap();
        assert_eq!(stock.quantity, Quantity::zero());
    }

    #[tokio::test]
    async fn test_fractional_quantities_are_exact() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "SUGAR", 130, 0).await;
        let ledger = db.stock_ledger();

        ledger.add_stock(&product.id, qty("2.5")).await.unwrap();
        ledger.add_stock(&product.id, qty("0.125")).await.unwrap();
        let stock = ledger.reduce_stock(&product.id, qty("1.3")).await.unwrap();

        assert_eq!(stock.quantity, qty("1.325"));
    }

    #[tokio::test]
    async fn test_missing_stock_row_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.stock_ledger();

        let err = ledger.add_stock("999", qty("1")).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        let err = ledger.reduce_stock("999", qty("1")).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        let err = ledger.get_stock("999").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_adjust_sets_absolute_level() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "MILK", 60, 10).await;
        let ledger = db.stock_ledger();

        let stock = ledger
            .adjust_stock(&StockAdjustmentRequest {
                product_id: product.id.clone(),
                new_quantity: qty("4"),
            })
            .await
            .unwrap();
        assert_eq!(stock.quantity, qty("4"));

        let err = ledger
            .adjust_stock(&StockAdjustmentRequest {
                product_id: product.id.clone(),
                new_quantity: qty("-1"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(ledger.get_stock(&product.id).await.unwrap().quantity, qty("4"));
    }

    #[tokio::test]
    async fn test_non_positive_quantities_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "MILK", 60, 10).await;
        let ledger = db.stock_ledger();

        assert!(ledger.add_stock(&product.id, qty("0")).await.is_err());
        assert!(ledger.reduce_stock(&product.id, qty("-2")).await.is_err());
        assert!(ledger.add_stock(&product.id, qty("0.0001")).await.is_err());
    }

    #[tokio::test]
    async fn test_stocks_for_products_skips_unknown_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = seed_product(&db, "A", 1, 7).await;

        let stocks = db
            .stock_ledger()
            .get_stocks_for_products(&[a.id.clone(), "999".to_string()])
            .await
            .unwrap();

        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[&a.id].quantity, qty("7"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reductions_do_not_lose_updates() {
        let (db, path) = file_database().await;
        let product = seed_product(&db, "SODA", 50, 100).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = db.stock_ledger();
            let id = product.id.clone();
            handles.push(tokio::spawn(async move {
                ledger.reduce_stock(&id, qty("1")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stock = db.stock_ledger().get_stock(&product.id).await.unwrap();
        assert_eq!(stock.quantity, qty("80"));
        assert_eq!(stock.version, 21);

        db.close().await;
        crate::test_support::remove_database(&path);
    }
}
