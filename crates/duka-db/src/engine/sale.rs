//! # Sale Engine
//!
//! Turns a cart plus payments into a committed sale and drives the stock
//! ledger, all inside one transaction.
//!
//! ## create_sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_sale(principal, request)                   │
//! │                                                                         │
//! │  PREPARE (pool reads, nothing written yet)                             │
//! │  ├── validate_create_sale(request)            → 400                    │
//! │  ├── products.find_by_ids(all ids)            → 404 listing ALL misses │
//! │  ├── customers.get_by_id (if given)           → 404                    │
//! │  ├── users.get_by_id(principal)               → cashier display name   │
//! │  └── checkout::assemble_sale                  → SaleDraft              │
//! │                                                                         │
//! │  PERSIST (one transaction)                                             │
//! │  ├── INSERT sale, sale_items, payments                                 │
//! │  └── reduce_in(stock) per line                                         │
//! │       │                                                                 │
//! │       ├── any error ──► ROLLBACK (no sale, no stock change)            │
//! │       └── COMMIT                                                        │
//! │                                                                         │
//! │  RESPOND: mapping::sale_response(draft, cashier, customer)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pool reads never happen while the transaction is open: on a
//! single-connection pool that would wait on itself.

use chrono::Utc;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::engine::stock::reduce_in;
use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::sale as sale_sql;
use duka_core::checkout::{assemble_sale, ensure_products_exist, SaleDraft};
use duka_core::dto::{CreateSaleRequest, SaleFilter, SalePage, SaleResponse};
use duka_core::mapping::sale_response;
use duka_core::validation::validate_create_sale;
use duka_core::{CoreError, Customer, Principal, Sale, User};

/// A sale resolved against the catalog, ready to be written.
#[derive(Debug, Clone)]
pub struct PreparedSale {
    pub draft: SaleDraft,
    pub cashier: User,
    pub customer: Option<Customer>,
}

impl PreparedSale {
    pub fn response(&self) -> SaleResponse {
        sale_response(
            &self.draft.sale,
            &self.draft.items,
            &self.draft.payments,
            &self.cashier,
            self.customer.as_ref(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct SaleEngine {
    db: Database,
}

impl SaleEngine {
    pub fn new(db: Database) -> Self {
        SaleEngine { db }
    }

    /// Creates a sale for `principal`.
    pub async fn create_sale(
        &self,
        principal: &Principal,
        request: &CreateSaleRequest,
    ) -> DbResult<SaleResponse> {
        let prepared = self.prepare(principal, request).await?;

        let mut tx = self.db.pool().begin().await?;
        self.persist_in(&mut *tx, &prepared.draft).await?;
        tx.commit().await?;

        let sale = &prepared.draft.sale;
        info!(
            sale_id = %sale.id,
            reference = %sale.reference,
            cashier = %principal.username,
            grand_total = %sale.grand_total,
            paid = %sale.paid_amount,
            status = ?sale.payment_status,
            lines = prepared.draft.items.len(),
            "Sale completed"
        );

        Ok(prepared.response())
    }

    /// Validates `request` and resolves everything it references.
    ///
    /// Reads only; safe to call before opening a transaction.
    pub async fn prepare(
        &self,
        principal: &Principal,
        request: &CreateSaleRequest,
    ) -> DbResult<PreparedSale> {
        validate_create_sale(request)?;

        let ids: Vec<String> = request.items.iter().map(|i| i.product_id.clone()).collect();
        let products = self.db.products().find_by_ids(&ids).await?;
        ensure_products_exist(ids.iter().map(String::as_str), &products)?;

        let customer = match &request.customer_id {
            Some(id) => Some(
                self.db
                    .customers()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("Customer", id))?,
            ),
            None => None,
        };

        let cashier = self
            .db
            .users()
            .get_by_id(&principal.user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", &principal.user_id))?;

        let draft = assemble_sale(request, principal, &products, Utc::now())?;
        debug!(reference = %draft.sale.reference, "Sale prepared");

        Ok(PreparedSale {
            draft,
            cashier,
            customer,
        })
    }

    /// Writes a prepared sale and reduces stock for each line on `conn`.
    pub async fn persist_in(&self, conn: &mut SqliteConnection, draft: &SaleDraft) -> DbResult<()> {
        sale_sql::insert_draft(&mut *conn, draft).await?;

        let policy = self.db.oversell_policy();
        for item in &draft.items {
            reduce_in(
                &mut *conn,
                &item.product_id,
                item.quantity,
                policy,
                draft.sale.created_at,
            )
            .await?;
        }

        Ok(())
    }

    /// Re-reads a committed sale.
    pub async fn get_sale(&self, id: &str) -> DbResult<SaleResponse> {
        let sale = self
            .db
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", id))?;

        let mut cashiers = HashMap::new();
        self.hydrate(sale, &mut cashiers).await
    }

    /// One page of sales, newest first.
    pub async fn list_sales(&self, filter: &SaleFilter) -> DbResult<SalePage> {
        let (sales, total) = self.db.sales().list(filter).await?;

        let mut cashiers = HashMap::new();
        let mut items = Vec::with_capacity(sales.len());
        for sale in sales {
            items.push(self.hydrate(sale, &mut cashiers).await?);
        }

        Ok(SalePage {
            items,
            page: filter.page(),
            size: filter.size(),
            total,
        })
    }

    async fn hydrate(
        &self,
        sale: Sale,
        cashiers: &mut HashMap<String, User>,
    ) -> DbResult<SaleResponse> {
        let repo = self.db.sales();
        let items = repo.get_items(&sale.id).await?;
        let payments = repo.get_payments(&sale.id).await?;

        if !cashiers.contains_key(&sale.user_id) {
            let user = self
                .db
                .users()
                .get_by_id(&sale.user_id)
                .await?
                .ok_or_else(|| CoreError::not_found("User", &sale.user_id))?;
            cashiers.insert(sale.user_id.clone(), user);
        }
        let cashier = cashiers
            .get(&sale.user_id)
            .ok_or_else(|| CoreError::not_found("User", &sale.user_id))?;

        let customer = match &sale.customer_id {
            Some(id) => self.db.customers().get_by_id(id).await?,
            None => None,
        };

        Ok(sale_response(
            &sale,
            &items,
            &payments,
            cashier,
            customer.as_ref(),
        ))
    }
}
