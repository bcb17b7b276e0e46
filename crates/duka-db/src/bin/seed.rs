//! # Seed Data Generator
//!
//! Populates a development database with a small shop: units, categories,
//! products with opening stock, cashiers and customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./duka_dev.db
//! cargo run -p duka-db --bin seed
//!
//! # Specify database path
//! cargo run -p duka-db --bin seed -- --db ./data/duka.db
//! ```
//!
//! Products get a code of `{CATEGORY}-{INDEX:03}`. Goods sold by weight are
//! stocked in fractional kilograms.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use duka_core::{Category, Customer, Money, ProductUnit, Quantity, User};
use duka_db::repository::product::new_product;
use duka_db::{Database, DbConfig};

/// (category code, category name, products as (name, price, opening stock, by weight))
const CATALOG: &[(&str, &str, &[(&str, i64, &str, bool)])] = &[
    (
        "BEV",
        "Beverages",
        &[
            ("Soda 500ml", 60, "48", false),
            ("Mineral Water 1L", 80, "36", false),
            ("Mango Juice 1L", 180, "12", false),
            ("Tea Leaves 250g", 120, "20", false),
        ],
    ),
    (
        "GRO",
        "Groceries",
        &[
            ("Maize Flour 2kg", 210, "30", false),
            ("Rice", 250, "40.5", true),
            ("Sugar", 130, "25", true),
            ("Cooking Oil 1L", 400, "18", false),
            ("Salt 500g", 40, "50", false),
        ],
    ),
    (
        "DRY",
        "Dairy",
        &[
            ("Fresh Milk 500ml", 60, "40", false),
            ("Yoghurt 250ml", 90, "15", false),
            ("Butter 250g", 350, "6", false),
        ],
    ),
    (
        "HSE",
        "Household",
        &[
            ("Bar Soap", 110, "24", false),
            ("Matchbox", 10, "100", false),
            ("Candles (6)", 150, "0", false),
        ],
    ),
];

const CASHIERS: &[(&str, &str, &str)] = &[("amina", "Amina", "Otieno"), ("juma", "Juma", "Mwangi")];

const CUSTOMERS: &[(&str, Option<&str>)] = &[
    ("Walk-in Customer", None),
    ("Baraka Hardware", Some("0712345678")),
    ("Wanjiku Njeri", Some("0723456789")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./duka_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Duka POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./duka_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Duka POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Units
    let piece = ProductUnit {
        id: Uuid::new_v4().to_string(),
        name: "Piece".to_string(),
        short_name: "pc".to_string(),
    };
    let kilogram = ProductUnit {
        id: Uuid::new_v4().to_string(),
        name: "Kilogram".to_string(),
        short_name: "kg".to_string(),
    };
    db.catalog().insert_unit(&piece).await?;
    db.catalog().insert_unit(&kilogram).await?;
    println!("✓ Units: {}, {}", piece.name, kilogram.name);

    // Categories and products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (code, name, products) in CATALOG {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            code: code.to_string(),
        };
        db.catalog().insert_category(&category).await?;

        for (index, (product_name, price, opening, by_weight)) in products.iter().enumerate() {
            let mut product = new_product(
                &format!("{}-{:03}", code, index + 1),
                product_name,
                Money::from(*price),
            );
            product.cost = Money::from(price * 7 / 10);
            product.category_id = Some(category.id.clone());
            product.is_variable_price = *by_weight;
            product.stock_alert = Quantity::from(5);
            let unit = if *by_weight { &kilogram } else { &piece };
            product.sale_unit_id = Some(unit.id.clone());
            product.purchase_unit_id = Some(unit.id.clone());

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.code, e);
                continue;
            }

            let opening: Quantity = opening.parse()?;
            if opening.is_positive() {
                db.stock_ledger().add_stock(&product.id, opening).await?;
            }

            generated += 1;
        }
    }
    println!("✓ Generated {} products", generated);

    // Cashiers
    println!();
    println!("Cashiers (use the id as the token subject):");
    for (username, first_name, last_name) in CASHIERS {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: Utc::now(),
        };
        db.users().insert(&user).await?;
        println!("  {:<8} {}", user.username, user.id);
    }

    // Customers
    println!();
    println!("Customers:");
    for (name, phone) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone_number: phone.map(str::to_string),
            created_at: Utc::now(),
        };
        db.customers().insert(&customer).await?;
        println!("  {:<18} {}", customer.name, customer.id);
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
