//! `/purchases`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use duka_core::dto::{PurchaseRequest, PurchaseResponse};
use duka_core::Principal;

use crate::auth::{permissions, require_permission};
use crate::error::ApiResult;
use crate::AppState;

/// `POST /purchases`
pub async fn create_purchase(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PurchaseResponse>)> {
    require_permission(&principal, permissions::PURCHASES_CREATE)?;
    let Json(request) = payload?;

    let purchase = state.db.purchase_engine().create_purchase(&request).await?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

/// `GET /purchases`
pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<PurchaseResponse>>> {
    require_permission(&principal, permissions::PURCHASES_READ)?;

    Ok(Json(state.db.purchase_engine().list_purchases().await?))
}

/// `GET /purchases/{id}`
pub async fn get_purchase(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseResponse>> {
    require_permission(&principal, permissions::PURCHASES_READ)?;

    Ok(Json(state.db.purchase_engine().get_purchase(&id).await?))
}
