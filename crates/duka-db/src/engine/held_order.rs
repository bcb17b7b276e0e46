//! # Held Order Store
//!
//! Per-cashier parked carts: hold, list, replace, discard, and resume into
//! a sale.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(id) ──► missing ───────────────────────► NotFound (404)          │
//! │     │                                                                   │
//! │     └──► order.user_id != principal.user_id ──► Forbidden (403)         │
//! │     │                                                                   │
//! │     └──► owner: mutate with  WHERE id = ? AND user_id = ?               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resume
//! The caller resupplies the full cart. Sale creation and deletion of the
//! held order share one transaction: either a sale exists and the held order
//! is gone, or nothing changed.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::held_order as held_sql;
use duka_core::checkout::assemble_held_items;
use duka_core::dto::{
    CreateSaleRequest, HeldOrderResponse, HoldOrderItemRequest, HoldOrderRequest, SaleResponse,
    UpdateHeldOrderRequest,
};
use duka_core::mapping::held_order_response;
use duka_core::reference::{generate_reference, RefKind};
use duka_core::validation::{validate_hold_order, validate_update_held_order};
use duka_core::{CoreError, HeldOrder, HeldOrderItem, Principal};

#[derive(Debug, Clone)]
pub struct HeldOrderStore {
    db: Database,
}

impl HeldOrderStore {
    pub fn new(db: Database) -> Self {
        HeldOrderStore { db }
    }

    /// Parks a cart for `principal`, snapshotting current catalog prices.
    pub async fn hold_order(
        &self,
        principal: &Principal,
        request: &HoldOrderRequest,
    ) -> DbResult<HeldOrderResponse> {
        validate_hold_order(request)?;

        self.db
            .customers()
            .get_by_id(&request.customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", &request.customer_id))?;

        let now = Utc::now();
        let order = HeldOrder {
            id: Uuid::new_v4().to_string(),
            reference: generate_reference(RefKind::HeldOrder, now),
            user_id: principal.user_id.clone(),
            customer_id: request.customer_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let items = self.snapshot_items(&order.id, &request.items).await?;

        let mut tx = self.db.pool().begin().await?;
        held_sql::insert(&mut *tx, &order, &items).await?;
        tx.commit().await?;

        info!(
            held_order_id = %order.id,
            reference = %order.reference,
            cashier = %principal.username,
            lines = items.len(),
            "Order held"
        );

        Ok(held_order_response(&order, &items))
    }

    /// The caller's held orders, newest first.
    pub async fn list_held_orders(&self, principal: &Principal) -> DbResult<Vec<HeldOrderResponse>> {
        let orders = self
            .db
            .held_orders()
            .list_for_user(&principal.user_id)
            .await?;

        Ok(orders
            .iter()
            .map(|(order, items)| held_order_response(order, items))
            .collect())
    }

    /// Replaces the item list of an owned held order.
    pub async fn update_held_order(
        &self,
        principal: &Principal,
        id: &str,
        request: &UpdateHeldOrderRequest,
    ) -> DbResult<HeldOrderResponse> {
        validate_update_held_order(request)?;

        let mut order = self.owned(principal, id).await?;
        let items = self.snapshot_items(&order.id, &request.items).await?;
        let now = Utc::now();

        let mut tx = self.db.pool().begin().await?;
        if !held_sql::replace_items(&mut *tx, id, &principal.user_id, &items, now).await? {
            return Err(CoreError::not_found("HeldOrder", id).into());
        }
        tx.commit().await?;

        order.updated_at = now;
        info!(held_order_id = %id, lines = items.len(), "Held order updated");

        Ok(held_order_response(&order, &items))
    }

    /// Discards an owned held order.
    pub async fn delete_held_order(&self, principal: &Principal, id: &str) -> DbResult<()> {
        self.owned(principal, id).await?;

        let mut conn = self.db.pool().acquire().await?;
        if !held_sql::delete(&mut conn, id, &principal.user_id).await? {
            return Err(CoreError::not_found("HeldOrder", id).into());
        }

        info!(held_order_id = %id, "Held order discarded");
        Ok(())
    }

    /// Completes an owned held order as a sale built from `request`.
    pub async fn resume_held_order(
        &self,
        principal: &Principal,
        id: &str,
        request: &CreateSaleRequest,
    ) -> DbResult<SaleResponse> {
        self.owned(principal, id).await?;

        let engine = self.db.sale_engine();
        let prepared = engine.prepare(principal, request).await?;

        let mut tx = self.db.pool().begin().await?;
        engine.persist_in(&mut *tx, &prepared.draft).await?;
        if !held_sql::delete(&mut *tx, id, &principal.user_id).await? {
            // Discarded concurrently; dropping tx rolls the sale back.
            return Err(CoreError::not_found("HeldOrder", id).into());
        }
        tx.commit().await?;

        info!(
            held_order_id = %id,
            sale_id = %prepared.draft.sale.id,
            reference = %prepared.draft.sale.reference,
            "Held order resumed"
        );

        Ok(prepared.response())
    }

    /// Loads `id` and checks `principal` owns it.
    async fn owned(&self, principal: &Principal, id: &str) -> DbResult<HeldOrder> {
        let order = self
            .db
            .held_orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("HeldOrder", id))?;

        if order.user_id != principal.user_id {
            warn!(
                held_order_id = %id,
                caller = %principal.username,
                "Held order ownership check failed"
            );
            return Err(CoreError::forbidden("held order belongs to another user").into());
        }

        Ok(order)
    }

    async fn snapshot_items(
        &self,
        held_order_id: &str,
        items: &[HoldOrderItemRequest],
    ) -> DbResult<Vec<HeldOrderItem>> {
        let ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        let products = self.db.products().find_by_ids(&ids).await?;

        Ok(assemble_held_items(held_order_id, items, &products, Utc::now())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stock::OversellPolicy;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use crate::test_support::{seed_cashier, seed_customer, seed_product, stock_of};
    use duka_core::dto::{PaymentRequest, SaleItemRequest};
    use duka_core::{Money, PaymentMethod, Quantity};

    fn hold_line(product_id: &str, qty: i64) -> HoldOrderItemRequest {
        HoldOrderItemRequest {
            product_id: product_id.to_string(),
            quantity: Quantity::from(qty),
        }
    }

    fn sale_for(product_id: &str, qty: i64, price: i64) -> CreateSaleRequest {
        CreateSaleRequest {
            items: vec![SaleItemRequest {
                product_id: product_id.to_string(),
                quantity: Quantity::from(qty),
                price: Money::from(price),
                discount: Money::zero(),
            }],
            payments: vec![PaymentRequest {
                amount: Money::from(qty * price),
                method: PaymentMethod::Mpesa,
                notes: None,
            }],
            discount: Money::zero(),
            is_credit_sale: false,
            customer_id: None,
        }
    }

    fn cart(lines: &[(&str, i64, i64)]) -> CreateSaleRequest {
        CreateSaleRequest {
            items: lines
                .iter()
                .map(|&(product_id, qty, price)| SaleItemRequest {
                    product_id: product_id.to_string(),
                    quantity: Quantity::from(qty),
                    price: Money::from(price),
                    discount: Money::zero(),
                })
                .collect(),
            payments: vec![],
            discount: Money::zero(),
            is_credit_sale: false,
            customer_id: None,
        }
    }

    async fn counts(db: &Database) -> (i64, i64) {
        let held: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM held_orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (held, sales)
    }

    #[tokio::test]
    async fn test_hold_snapshots_catalog_price() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let oil = seed_product(&db, "OIL", 400, 10).await;

        let held = db
            .held_order_store()
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2), hold_line(&oil.id, 1)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        assert!(held.reference.starts_with("HELD-"));
        assert_eq!(held.customer_id, customer.id);
        assert_eq!(held.items.len(), 2);
        assert_eq!(held.items[0].price, Money::from(250));
        assert_eq!(held.items[1].price, Money::from(400));
        // holding never touches stock
        assert_eq!(stock_of(&db, &rice).await, Quantity::from(10));
    }

    #[tokio::test]
    async fn test_hold_reports_all_missing_products_and_unknown_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let store = db.held_order_store();

        let err = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line("x", 1), hold_line("y", 1)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap_err();
        match err {
            DbError::Domain(CoreError::ProductsNotFound { ids }) => {
                assert_eq!(ids, vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line("x", 1)],
                    customer_id: "nobody".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotFound { entity: "Customer", .. })
        ));
        assert_eq!(counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_list_is_per_cashier_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let amina = seed_cashier(&db, "amina").await;
        let juma = seed_cashier(&db, "juma").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let store = db.held_order_store();

        let hold = |qty| HoldOrderRequest {
            items: vec![hold_line(&rice.id, qty)],
            customer_id: customer.id.clone(),
        };
        let first = store.hold_order(&amina, &hold(1)).await.unwrap();
        let second = store.hold_order(&amina, &hold(2)).await.unwrap();
        store.hold_order(&juma, &hold(3)).await.unwrap();

        let mine = store.list_held_orders(&amina).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);
        assert_eq!(mine[0].items[0].quantity, Quantity::from(2));

        assert_eq!(store.list_held_orders(&juma).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_resnapshots_prices() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let oil = seed_product(&db, "OIL", 400, 10).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2), hold_line(&oil.id, 1)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        sqlx::query("UPDATE products SET price = '275' WHERE id = ?1")
            .bind(&rice.id)
            .execute(db.pool())
            .await
            .unwrap();

        let updated = store
            .update_held_order(
                &cashier,
                &held.id,
                &UpdateHeldOrderRequest {
                    items: vec![hold_line(&rice.id, 5)],
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].price, Money::from(275));
        assert_eq!(updated.customer_id, customer.id);
        assert_eq!(updated.created_at, held.created_at);

        let stored = db.held_orders().get_items(&held.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, Quantity::from(5));
    }

    #[tokio::test]
    async fn test_other_cashier_is_forbidden_and_nothing_changes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let owner = seed_cashier(&db, "amina").await;
        let intruder = seed_cashier(&db, "juma").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let oil = seed_product(&db, "OIL", 400, 10).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &owner,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2), hold_line(&oil.id, 1)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        let err = store.delete_held_order(&intruder, &held.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden { .. })));

        let err = store
            .update_held_order(
                &intruder,
                &held.id,
                &UpdateHeldOrderRequest {
                    items: vec![hold_line(&rice.id, 9)],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden { .. })));

        let err = store
            .resume_held_order(&intruder, &held.id, &sale_for(rice.id.as_str(), 1, 250))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden { .. })));

        assert_eq!(counts(&db).await, (1, 0));
        assert_eq!(db.held_orders().get_items(&held.id).await.unwrap().len(), 2);
        assert_eq!(stock_of(&db, &rice).await, Quantity::from(10));
    }

    #[tokio::test]
    async fn test_owner_can_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        store.delete_held_order(&cashier, &held.id).await.unwrap();
        assert_eq!(counts(&db).await, (0, 0));
        assert!(db.held_orders().get_items(&held.id).await.unwrap().is_empty());

        let err = store.delete_held_order(&cashier, &held.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotFound { entity: "HeldOrder", .. })
        ));
    }

    #[tokio::test]
    async fn test_resume_creates_one_sale_and_removes_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        // the resupplied cart wins over the held lines
        let sale = store
            .resume_held_order(&cashier, &held.id, &sale_for(rice.id.as_str(), 3, 240))
            .await
            .unwrap();

        assert_eq!(sale.grand_total, Money::from(720));
        assert_eq!(counts(&db).await, (0, 1));
        assert_eq!(stock_of(&db, &rice).await, Quantity::from(7));
    }

    #[tokio::test]
    async fn test_failed_resume_leaves_order_intact() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        let err = store
            .resume_held_order(&cashier, &held.id, &sale_for("999", 1, 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductsNotFound { .. })
        ));

        assert_eq!(counts(&db).await, (1, 0));
        assert_eq!(stock_of(&db, &rice).await, Quantity::from(10));

        let err = store
            .resume_held_order(&cashier, "missing", &sale_for(rice.id.as_str(), 1, 250))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotFound { entity: "HeldOrder", .. })
        ));
    }

    #[tokio::test]
    async fn test_resume_rolls_back_when_stock_is_short() {
        let db = Database::new(DbConfig::in_memory().oversell(OversellPolicy::Reject))
            .await
            .unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let oil = seed_product(&db, "OIL", 400, 1).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2), hold_line(&oil.id, 3)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        // rice is reduced inside the transaction before oil comes up short
        let err = store
            .resume_held_order(
                &cashier,
                &held.id,
                &cart(&[(rice.id.as_str(), 2, 250), (oil.id.as_str(), 3, 400)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        assert_eq!(counts(&db).await, (1, 0));
        assert_eq!(db.held_orders().get_items(&held.id).await.unwrap().len(), 2);
        assert_eq!(stock_of(&db, &rice).await, Quantity::from(10));
        assert_eq!(stock_of(&db, &oil).await, Quantity::from(1));

        // the order can still be completed once the cart fits the shelf
        store
            .resume_held_order(
                &cashier,
                &held.id,
                &cart(&[(rice.id.as_str(), 2, 250), (oil.id.as_str(), 1, 400)]),
            )
            .await
            .unwrap();
        assert_eq!(counts(&db).await, (0, 1));
    }

    #[tokio::test]
    async fn test_resume_rolls_back_on_missing_stock_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = seed_cashier(&db, "amina").await;
        let customer = seed_customer(&db, "Baraka").await;
        let rice = seed_product(&db, "RICE", 250, 10).await;
        let oil = seed_product(&db, "OIL", 400, 5).await;
        let store = db.held_order_store();

        let held = store
            .hold_order(
                &cashier,
                &HoldOrderRequest {
                    items: vec![hold_line(&rice.id, 2), hold_line(&oil.id, 1)],
                    customer_id: customer.id.clone(),
                },
            )
            .await
            .unwrap();

        sqlx::query("DELETE FROM stock WHERE product_id = ?1")
            .bind(&oil.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = store
            .resume_held_order(
                &cashier,
                &held.id,
                &cart(&[(rice.id.as_str(), 2, 250), (oil.id.as_str(), 1, 400)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotFound { entity: "Stock", .. })
        ));

        assert_eq!(counts(&db).await, (1, 0));
        assert_eq!(stock_of(&db, &rice).await, Quantity::from(10));
    }
}
