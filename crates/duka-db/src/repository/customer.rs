//! # Customer Repository
//!
//! Customers are maintained elsewhere; the core only resolves them by id.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use duka_core::Customer;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a customer (seeding and tests).
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, name, phone_number, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone_number)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
