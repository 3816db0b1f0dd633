//! Handlers for the `/auth` resource (login, logout, verify).

use axum::extract::State;
use axum::Json;
use minutes_core::audit::actions;
use minutes_core::error::CoreError;
use minutes_core::messages;
use minutes_core::roles::{Role, RoleAssignment};
use minutes_core::validation::validate_required;
use minutes_db::repositories::UserRoleRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::AuditEvent;
use crate::auth::Identity;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, RequestOrigin};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, length(min = 1))]
    pub username: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// Public identity returned by login and verify.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub username: String,
    pub prefix: String,
    pub fname: String,
    pub lname: String,
    pub fullname: String,
    pub role: Role,
}

impl From<&Identity> for UserInfo {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            prefix: identity.prefix.clone(),
            fname: identity.fname.clone(),
            lname: identity.lname.clone(),
            fullname: identity.display_name(),
            role: identity.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
struct LoginDetail {
    role: Role,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Check the credentials against the personnel directory, resolve the local
/// role and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_required(&input)?;
    let username = input.username.as_deref().unwrap_or_default();
    let password = input.password.as_deref().unwrap_or_default();

    // 1. Credentials are owned by the directory.
    let personnel = state
        .directory
        .authenticate(username, password)
        .await?
        .ok_or_else(|| {
            tracing::info!(username, "Login rejected: bad credentials");
            AppError::Core(CoreError::Unauthorized(messages::BAD_CREDENTIALS.into()))
        })?;

    // 2. Role and activation are local; no row means baseline and active.
    let assignment = match UserRoleRepo::find_by_username(&state.pool, &personnel.username).await? {
        Some(row) => {
            if row.role.parse::<Role>().is_err() {
                tracing::warn!(
                    username = %row.username,
                    stored_role = %row.role,
                    "Unknown stored role, using baseline"
                );
            }
            row.assignment()
        }
        None => RoleAssignment::default(),
    };

    if !assignment.active {
        tracing::info!(username, "Login rejected: account suspended");
        return Err(AppError::Core(CoreError::Forbidden(
            messages::ACCOUNT_SUSPENDED.into(),
        )));
    }

    // 3. Issue the token.
    let identity = Identity {
        username: personnel.username,
        prefix: personnel.prefix.unwrap_or_default(),
        fname: personnel.fname.unwrap_or_default(),
        lname: personnel.lname.unwrap_or_default(),
        role: assignment.role,
    };
    let token = state.tokens.issue(&identity)?;

    state
        .audit
        .record(
            &identity.username,
            AuditEvent::new(actions::LOGIN).detail(LoginDetail {
                role: identity.role,
            }),
            &origin,
        )
        .await;

    tracing::info!(username = %identity.username, role = %identity.role, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: messages::LOGIN_OK,
        token,
        user: UserInfo::from(&identity),
    }))
}

/// POST /api/auth/logout
///
/// Always succeeds. Tokens are stateless, so this only records the logout
/// when a valid token accompanies the request.
pub async fn logout(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    origin: RequestOrigin,
) -> Json<MessageResponse> {
    if let Some(user) = user {
        state
            .audit
            .record(&user.username, AuditEvent::new(actions::LOGOUT), &origin)
            .await;
    }
    Json(MessageResponse::new(messages::LOGOUT_OK))
}

/// GET /api/auth/verify
///
/// Return the identity carried by the caller's token.
pub async fn verify(user: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        user: UserInfo::from(&user.claims.identity()),
    })
}
