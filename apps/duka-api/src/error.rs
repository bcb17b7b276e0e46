//! # API Error Types
//!
//! Every failure leaves the server as the same JSON body:
//!
//! ```text
//! {
//!   "timestamp": "2026-10-14T09:12:44.105Z",
//!   "status":    404,
//!   "error":     "Not Found",
//!   "message":   "Products not found with IDs: [999, 1000]",
//!   "path":      "/sales"
//! }
//! ```
//!
//! ## Status Mapping
//! ```text
//! ┌────────────────────────────────────────────┬──────────────────────────┐
//! │ ProductsNotFound, NotFound                 │ 404                      │
//! │ Forbidden, missing permission              │ 403                      │
//! │ missing / invalid bearer token             │ 401                      │
//! │ UniqueViolation, InsufficientStock         │ 409                      │
//! │ Validation, ForeignKey, malformed body     │ 400                      │
//! │ anything else                              │ 500 (detail logged only) │
//! └────────────────────────────────────────────┴──────────────────────────┘
//! ```
//!
//! `IntoResponse` cannot see the request, so [`render_errors`] fills in
//! `path` on the way out.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use duka_core::CoreError;
use duka_db::DbError;
use serde::{Deserialize, Serialize};
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Anything raised below the HTTP layer.
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Missing permission: {0}")]
    MissingPermission(&'static str),

    /// Body or query string could not be parsed.
    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        ApiError::Db(DbError::Domain(error))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Db(DbError::Domain(core)) => match core {
                CoreError::ProductsNotFound { .. } | CoreError::NotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                CoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
                CoreError::InsufficientStock { .. } => StatusCode::CONFLICT,
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            },
            ApiError::Db(DbError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Db(DbError::UniqueViolation { .. }) => StatusCode::CONFLICT,
            ApiError::Db(DbError::ForeignKeyViolation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::MissingPermission(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            ApiError::Db(DbError::UniqueViolation { value, .. }) => {
                format!("{value} already exists")
            }
            err if err.status().is_server_error() => "An unexpected error occurred".to_string(),
            err => err.to_string(),
        }
    }
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorBody {
    fn new(status: StatusCode, message: String, path: String) -> Self {
        ErrorBody {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            path,
        }
    }
}

/// Carried on error responses until [`render_errors`] stamps the path.
#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, detail = ?self, "Unhandled error");
        }

        let message = self.public_message();
        let mut response = (
            status,
            Json(ErrorBody::new(status, message.clone(), String::new())),
        )
            .into_response();
        response
            .extensions_mut()
            .insert(Failure { status, message });
        response
    }
}

/// Middleware that re-renders [`ApiError`] responses with the request path.
pub async fn render_errors(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<Failure>() {
        Some(failure) => (
            failure.status,
            Json(ErrorBody::new(failure.status, failure.message, path)),
        )
            .into_response(),
        None => response,
    }
}
