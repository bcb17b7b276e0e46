//! # Catalog Repository
//!
//! Categories and product units: read-mostly reference data.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use duka_core::{Category, ProductUnit};

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    pub async fn insert_category(&self, category: &Category) -> DbResult<()> {
        debug!(code = %category.code, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, code) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.code)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    pub async fn insert_unit(&self, unit: &ProductUnit) -> DbResult<()> {
        debug!(name = %unit.name, "Inserting product unit");

        sqlx::query("INSERT INTO product_units (id, name, short_name) VALUES (?1, ?2, ?3)")
            .bind(&unit.id)
            .bind(&unit.name)
            .bind(&unit.short_name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_unit(&self, id: &str) -> DbResult<Option<ProductUnit>> {
        let unit = sqlx::query_as::<_, ProductUnit>("SELECT * FROM product_units WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use duka_core::{Category, ProductUnit};

    #[tokio::test]
    async fn test_category_code_is_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = Category {
            id: "c-1".to_string(),
            name: "Beverages".to_string(),
            code: "BEV".to_string(),
        };
        db.catalog().insert_category(&category).await.unwrap();

        let duplicate = Category {
            id: "c-2".to_string(),
            ..category.clone()
        };
        let err = db.catalog().insert_category(&duplicate).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let loaded = db.catalog().get_category("c-1").await.unwrap().unwrap();
        assert_eq!(loaded.code, "BEV");
    }

    #[tokio::test]
    async fn test_unit_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let unit = ProductUnit {
            id: "u-kg".to_string(),
            name: "Kilogram".to_string(),
            short_name: "kg".to_string(),
        };
        db.catalog().insert_unit(&unit).await.unwrap();

        let loaded = db.catalog().get_unit("u-kg").await.unwrap().unwrap();
        assert_eq!(loaded.short_name, "kg");
    }
}
