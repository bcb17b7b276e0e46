//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Batch lookup by id (one query per cart)
//! - Insert, which also opens the product's stock row
//! - Lookup by unique code

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use duka_core::{Money, PopularityScore, Product, Quantity, TaxMethod};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Resolve a whole cart in one round trip
/// let found = repo.find_by_ids(&["p-1".into(), "p-2".into()]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its unique business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Fetches every product whose id is in `ids`, keyed by id.
    ///
    /// Unknown ids are simply absent from the map; duplicates are fine.
    pub async fn find_by_ids(&self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!(count = ids.len(), "Batch product lookup");

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM products WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let products: Vec<Product> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Inserts a product together with its stock row (quantity 0).
    ///
    /// Both rows are written in one transaction: a product never exists
    /// without a ledger entry.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, code = %product.code, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, barcode,
                cost, price, is_variable_price,
                sale_unit_id, purchase_unit_id, stock_alert, category_id,
                tax_method, is_active, popularity_score,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.cost)
        .bind(product.price)
        .bind(product.is_variable_price)
        .bind(&product.sale_unit_id)
        .bind(&product.purchase_unit_id)
        .bind(product.stock_alert)
        .bind(&product.category_id)
        .bind(product.tax_method)
        .bind(product.is_active)
        .bind(product.popularity_score)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO stock (product_id, quantity, version, updated_at) VALUES (?1, 0, 0, ?2)",
        )
        .bind(&product.id)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Counts active products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Builder-style constructor for a new catalog product.
///
/// ## Usage
/// ```rust,ignore
/// let product = new_product("SUG-1KG", "Sugar 1kg", Money::from(130));
/// db.products().insert(&product).await?;
/// ```
pub fn new_product(code: &str, name: &str, price: Money) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        name: name.to_string(),
        barcode: None,
        cost: Money::zero(),
        price,
        is_variable_price: false,
        sale_unit_id: None,
        purchase_unit_id: None,
        stock_alert: Quantity::zero(),
        category_id: None,
        tax_method: TaxMethod::default(),
        is_active: true,
        popularity_score: PopularityScore::zero(),
        created_at: now,
        updated_at: now,
    }
}
