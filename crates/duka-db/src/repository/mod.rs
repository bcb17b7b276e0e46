//! # Repository Module
//!
//! Database repository implementations for Duka POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Engine / handler                                                      │
//! │       │                                                                 │
//! │       ├── reads:  db.products().find_by_ids(&ids)      (pool)          │
//! │       │                                                                 │
//! │       └── writes: stock::reduce_clamped(&mut *tx, …)   (transaction)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Reads are methods on a repository holding the pool. Writes that must  │
//! │  share a transaction are free functions over a SqliteConnection.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products (+ stock row on insert)
//! - [`StockRepository`](stock::StockRepository) - Stock reads and atomic writes
//! - [`SaleRepository`](sale::SaleRepository) - Sales, items, payments
//! - [`HeldOrderRepository`](held_order::HeldOrderRepository) - Parked carts
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Supplier receipts
//! - [`CustomerRepository`](customer::CustomerRepository), [`UserRepository`](user::UserRepository),
//!   [`CatalogRepository`](catalog::CatalogRepository) - Reference data

pub mod catalog;
pub mod customer;
pub mod held_order;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod stock;
pub mod user;
