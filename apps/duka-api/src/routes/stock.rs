//! `/stock`

use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use duka_core::dto::{StockAdjustmentRequest, StockResponse};
use duka_core::validation::validate_product_ids;
use duka_core::{CoreError, Principal};

use crate::auth::{permissions, require_permission};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuery {
    /// Comma-separated product ids.
    #[serde(default)]
    pub product_ids: String,
}

impl StockQuery {
    fn ids(&self) -> Vec<String> {
        self.product_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// `POST /stock/adjust`. Responds 200 with an empty body.
pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<StockAdjustmentRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    require_permission(&principal, permissions::STOCK_ADJUST)?;
    let Json(request) = payload?;

    state.db.stock_ledger().adjust_stock(&request).await?;

    Ok(StatusCode::OK)
}

/// `GET /stock?productIds=a,b`. Unknown ids are left out of the map.
pub async fn get_stocks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<StockQuery>, QueryRejection>,
) -> ApiResult<Json<HashMap<String, StockResponse>>> {
    require_permission(&principal, permissions::STOCK_READ)?;
    let Query(query) = query?;

    let ids = query.ids();
    validate_product_ids(&ids).map_err(CoreError::from)?;

    let stocks = state.db.stock_ledger().get_stocks_for_products(&ids).await?;

    Ok(Json(
        stocks
            .iter()
            .map(|(id, stock)| (id.clone(), StockResponse::from(stock)))
            .collect(),
    ))
}
