//! # User Repository
//!
//! Cashier lookups. Accounts, roles and PINs are managed by the identity
//! service; the core only needs the display name for receipts.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use duka_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Inserts a user (seeding and tests).
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
