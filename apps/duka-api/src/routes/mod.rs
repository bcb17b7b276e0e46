//! HTTP handlers, one module per resource.
//!
//! Handlers check the permission first, then parse the body, then call a
//! single engine operation. Engines own validation and transactions.

pub mod health;
pub mod held_orders;
pub mod purchases;
pub mod sales;
pub mod stock;
