//! JWT-based authentication extractor for Axum handlers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use minutes_core::roles::Role;

use crate::auth::jwt::{Claims, TokenError};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// A missing header or empty token rejects with 401; a token that fails
/// verification (bad signature, malformed, expired) rejects with 403.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(username = %user.username, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Directory username (from `claims.sub`).
    pub username: String,
    pub role: Role,
    /// The full verified claims, for name fields and `jti`.
    pub claims: Claims,
}

impl AuthUser {
    fn from_claims(claims: Claims) -> Self {
        Self {
            username: claims.sub.clone(),
            role: claims.role,
            claims,
        }
    }
}

/// The token part of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<&str, TokenError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(TokenError::Missing)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token).inspect_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
        })?;
        Ok(AuthUser::from_claims(claims))
    }
}

/// The caller, if a valid token was supplied; never rejects.
///
/// Used by logout, which succeeds regardless of the token's state.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts)
            .and_then(|token| state.tokens.verify(token))
            .ok()
            .map(AuthUser::from_claims);
        Ok(MaybeAuthUser(user))
    }
}
