//! Fixtures shared by the engine tests.

use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use crate::repository::product::new_product;
use duka_core::{Customer, Money, Principal, Product, Quantity, User};

/// Inserts a product priced at `price` with `stock` units on hand.
pub(crate) async fn seed_product(db: &Database, code: &str, price: i64, stock: i64) -> Product {
    let product = new_product(code, &format!("Product {code}"), Money::from(price));
    db.products().insert(&product).await.unwrap();

    if stock > 0 {
        db.stock_ledger()
            .add_stock(&product.id, Quantity::from(stock))
            .await
            .unwrap();
    }

    product
}

/// Inserts a user and returns the matching principal.
pub(crate) async fn seed_cashier(db: &Database, username: &str) -> Principal {
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        first_name: username.to_string(),
        last_name: "Tester".to_string(),
        created_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap();

    Principal {
        user_id: user.id,
        username: user.username,
        permissions: Vec::new(),
    }
}

pub(crate) async fn seed_customer(db: &Database, name: &str) -> Customer {
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        phone_number: Some("0700000000".to_string()),
        created_at: Utc::now(),
    };
    db.customers().insert(&customer).await.unwrap();
    customer
}

pub(crate) async fn stock_of(db: &Database, product: &Product) -> Quantity {
    db.stock_ledger()
        .get_stock(&product.id)
        .await
        .unwrap()
        .quantity
}

/// A fresh on-disk database, for tests that need several connections.
pub(crate) async fn file_database() -> (Database, PathBuf) {
    let path = std::env::temp_dir().join(format!("duka-test-{}.db", Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(5))
        .await
        .unwrap();
    (db, path)
}

pub(crate) fn remove_database(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(file));
    }
}
