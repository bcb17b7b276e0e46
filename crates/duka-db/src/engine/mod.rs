//! # Engines
//!
//! The transactional flows of the POS backend. Each engine is a cheap clone
//! over [`Database`](crate::Database) and owns its transaction boundaries.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleEngine        cart + payments ──► sale      reduces stock         │
//! │  HeldOrderStore    parked carts, resume ──► SaleEngine                 │
//! │  PurchaseEngine    supplier receipt  ──► purchase increases stock      │
//! │  StockLedger       the only writer of stock.quantity                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod held_order;
pub mod purchase;
pub mod sale;
pub mod stock;
