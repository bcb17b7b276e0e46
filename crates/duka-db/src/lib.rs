//! # duka-db: Database Layer for Duka POS
//!
//! SQLite storage, repositories and the transactional engines of the POS
//! backend, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /sales)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     duka-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Engines    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine/)    │───►│ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SaleEngine    │    │ ProductRepo   │    │ 001_initial  │  │   │
//! │  │   │ HeldOrderStore│    │ SaleRepo      │    │              │  │   │
//! │  │   │ PurchaseEngine│    │ StockRepo     │    │              │  │   │
//! │  │   │ StockLedger   │    │ ...           │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                      Database (pool.rs)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)   ./duka.db                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Row-level reads and connection-scoped writes
//! - [`engine`] - Sale, held order, purchase and stock flows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duka_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("duka.db")).await?;
//!
//! let sale = db.sale_engine().create_sale(&principal, &request).await?;
//! let stock = db.stock_ledger().get_stock(&product_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use engine::held_order::HeldOrderStore;
pub use engine::purchase::PurchaseEngine;
pub use engine::sale::{PreparedSale, SaleEngine};
pub use engine::stock::{OversellPolicy, StockLedger};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
