//! `/sales`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use duka_core::dto::{CreateSaleRequest, SaleFilter, SalePage, SaleResponse};
use duka_core::Principal;

use crate::auth::{permissions, require_permission};
use crate::error::ApiResult;
use crate::AppState;

/// `POST /sales`
pub async fn create_sale(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateSaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleResponse>)> {
    require_permission(&principal, permissions::SALES_CREATE)?;
    let Json(request) = payload?;

    let sale = state
        .db
        .sale_engine()
        .create_sale(&principal, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /sales?startDate&endDate&query&page&size`
pub async fn list_sales(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    filter: Result<Query<SaleFilter>, QueryRejection>,
) -> ApiResult<Json<SalePage>> {
    require_permission(&principal, permissions::SALES_READ)?;
    let Query(filter) = filter?;

    Ok(Json(state.db.sale_engine().list_sales(&filter).await?))
}

/// `GET /sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleResponse>> {
    require_permission(&principal, permissions::SALES_READ)?;

    Ok(Json(state.db.sale_engine().get_sale(&id).await?))
}
