//! # duka-core: Pure Business Logic for Duka POS
//!
//! Everything the POS backend decides without touching a database: money and
//! quantity arithmetic, request validation, sale totals and payment status,
//! business references, and the projection of stored rows into responses.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    duka-api (axum)                              │   │
//! │  │   /sales  /held-orders  /purchases  /stock   (JWT principal)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    duka-db (engines + repositories)             │   │
//! │  │   SaleEngine  HeldOrderStore  PurchaseEngine  StockLedger       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ pure calls                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ duka-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  totals   │  │   rules   │  │   │
//! │  │   │   Sale    │  │ Quantity  │  │  drafts   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Persisted entities (Product, Stock, Sale, HeldOrder, Purchase)
//! - [`money`] / [`quantity`] - Exact decimal value types
//! - [`dto`] - Request/response shapes of the REST surface
//! - [`checkout`] - Totals, payment status, entity assembly
//! - [`mapping`] - Entity → response projections
//! - [`reference`] - `SALE-…` / `HELD-…` / `PUR-…` business keys
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::{Money, Quantity};
//!
//! let price: Money = "100".parse().unwrap();
//! let qty: Quantity = "2".parse().unwrap();
//! assert_eq!(price * qty, Money::from(200));
//! ```

pub mod checkout;
pub mod dto;
pub mod error;
pub mod mapping;
pub mod money;
pub mod quantity;
pub mod reference;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

/// Maximum number of lines in a single cart, held order or purchase.
pub const MAX_CART_ITEMS: usize = 100;
