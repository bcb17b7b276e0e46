//! `/held-orders`
//!
//! Any cashier with `sales:create` may park carts, but each order is only
//! visible to and mutable by the cashier who holds it.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use duka_core::dto::{
    CreateSaleRequest, HeldOrderResponse, HoldOrderRequest, SaleResponse, UpdateHeldOrderRequest,
};
use duka_core::Principal;

use crate::auth::{permissions, require_permission};
use crate::error::ApiResult;
use crate::AppState;

/// `POST /held-orders`
pub async fn hold_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<HoldOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<HeldOrderResponse>)> {
    require_permission(&principal, permissions::SALES_CREATE)?;
    let Json(request) = payload?;

    let held = state
        .db
        .held_order_store()
        .hold_order(&principal, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(held)))
}

/// `GET /held-orders`
pub async fn list_held_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<HeldOrderResponse>>> {
    require_permission(&principal, permissions::SALES_CREATE)?;

    Ok(Json(
        state.db.held_order_store().list_held_orders(&principal).await?,
    ))
}

/// `PUT /held-orders/{id}`
pub async fn update_held_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateHeldOrderRequest>, JsonRejection>,
) -> ApiResult<Json<HeldOrderResponse>> {
    require_permission(&principal, permissions::SALES_CREATE)?;
    let Json(request) = payload?;

    let held = state
        .db
        .held_order_store()
        .update_held_order(&principal, &id, &request)
        .await?;

    Ok(Json(held))
}

/// `DELETE /held-orders/{id}`
pub async fn delete_held_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_permission(&principal, permissions::SALES_CREATE)?;

    state
        .db
        .held_order_store()
        .delete_held_order(&principal, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /held-orders/{id}/resume`
pub async fn resume_held_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<CreateSaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleResponse>)> {
    require_permission(&principal, permissions::SALES_CREATE)?;
    let Json(request) = payload?;

    let sale = state
        .db
        .held_order_store()
        .resume_held_order(&principal, &id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}
