//! JWT authentication module.
//!
//! Turns `Authorization: Bearer <jwt>` into the [`Principal`] every engine
//! call receives, and gates routes on the principal's permission set.
//!
//! ```text
//! request ──► authenticate ──► Extension<Principal> ──► handler
//!                 │                                        │
//!                 └── 401 on missing / invalid token       └── require_permission → 403
//! ```

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use duka_core::Principal;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Permission names carried in the token.
pub mod permissions {
    pub const SALES_CREATE: &str = "sales:create";
    pub const SALES_READ: &str = "sales:read";
    pub const PURCHASES_CREATE: &str = "purchases:create";
    pub const PURCHASES_READ: &str = "purchases:read";
    pub const STOCK_ADJUST: &str = "stock:adjust";
    pub const STOCK_READ: &str = "stock:read";
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    pub permissions: Vec<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.sub,
            username: claims.username,
            permissions: claims.permissions,
        }
    }
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issues a token for `principal`.
    pub fn issue(&self, principal: &Principal) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.user_id.clone(),
            username: principal.username.clone(),
            permissions: principal.permissions.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.lifetime_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> ApiResult<Claims> {
        let token_data: TokenData<Claims> = decode(token, &self.decoding, &Validation::default())
            .map_err(|e| ApiError::Unauthenticated(format!("invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from the headers.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that authenticates the request and stores its [`Principal`].
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthenticated("missing bearer token".to_string()))?;

    let principal: Principal = state.jwt.validate(token)?.into();
    debug!(user = %principal.username, "Authenticated");

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Fails with 403 unless `principal` holds `permission`.
pub fn require_permission(principal: &Principal, permission: &'static str) -> ApiResult<()> {
    if principal.has_permission(permission) {
        return Ok(());
    }

    warn!(user = %principal.username, permission, "Permission denied");
    Err(ApiError::MissingPermission(permission))
}
