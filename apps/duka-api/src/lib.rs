//! # Duka API
//!
//! REST surface of the POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Duka API Server                              │
//! │                                                                         │
//! │  TraceLayer ──► render_errors ──► authenticate ──► handler              │
//! │  (span per       (stamps path     (Bearer JWT →     │                   │
//! │   request)        on errors)       Principal)       ▼                   │
//! │                                                  duka-db engines        │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /sales        │  │  /held-orders  │  │  /purchases  /stock        ││
//! │  │ • create       │  │ • hold, list   │  │ • receive, list            ││
//! │  │ • list, get    │  │ • update       │  │ • adjust, query levels     ││
//! │  │                │  │ • delete       │  │                            ││
//! │  │                │  │ • resume       │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. Every key can be set from the environment, e.g.
//! - `DUKA__SERVER__PORT` - HTTP port (default: 8080)
//! - `DUKA__DATABASE__PATH` - SQLite file (default: ./duka.db)
//! - `DUKA__AUTH__JWT_SECRET` - Secret for JWT validation
//! - `DUKA__STOCK__OVERSELL` - `clamp` (default) or `reject`

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use duka_db::Database;

pub use auth::JwtManager;
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        AppState {
            db,
            jwt: Arc::new(jwt),
        }
    }
}

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/sales",
            post(routes::sales::create_sale).get(routes::sales::list_sales),
        )
        .route("/sales/{id}", get(routes::sales::get_sale))
        .route(
            "/held-orders",
            post(routes::held_orders::hold_order).get(routes::held_orders::list_held_orders),
        )
        .route(
            "/held-orders/{id}",
            put(routes::held_orders::update_held_order)
                .delete(routes::held_orders::delete_held_order),
        )
        .route(
            "/held-orders/{id}/resume",
            post(routes::held_orders::resume_held_order),
        )
        .route(
            "/purchases",
            post(routes::purchases::create_purchase).get(routes::purchases::list_purchases),
        )
        .route("/purchases/{id}", get(routes::purchases::get_purchase))
        .route("/stock", get(routes::stock::get_stocks))
        .route("/stock/adjust", post(routes::stock::adjust_stock))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(protected)
        .layer(middleware::from_fn(error::render_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
