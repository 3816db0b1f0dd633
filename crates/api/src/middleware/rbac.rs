//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! satisfy the route's [`AccessRule`]. Rules that depend on a loaded resource
//! (owner-or-role) are checked in the handler with [`ensure_access`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use minutes_core::error::CoreError;
use minutes_core::messages;
use minutes_core::roles::{AccessRule, Role, AGENDA_EDITORS};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Reject with 403 and `message` unless `rule` permits `user`.
pub fn ensure_access(
    user: &AuthUser,
    rule: AccessRule<'_>,
    message: &'static str,
) -> Result<(), AppError> {
    if rule.permits(&user.username, user.role) {
        Ok(())
    } else {
        tracing::info!(
            username = %user.username,
            role = %user.role,
            ?rule,
            "Access denied"
        );
        Err(AppError::Core(CoreError::Forbidden(message.into())))
    }
}

/// Requires the `secretary` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn secretary_only(RequireSecretary(user): RequireSecretary) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireSecretary(pub AuthUser);

impl FromRequestParts<AppState> for RequireSecretary {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_access(
            &user,
            AccessRule::Exact(Role::Secretary),
            messages::SECRETARY_ONLY,
        )?;
        Ok(RequireSecretary(user))
    }
}

/// Requires `secretary` or `manager`, the roles that maintain agenda items.
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_access(
            &user,
            AccessRule::AnyOf(AGENDA_EDITORS),
            messages::SECRETARY_OR_MANAGER_ONLY,
        )?;
        Ok(RequireEditor(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::auth::jwt::Claims;

    fn user(username: &str, role: Role) -> AuthUser {
        AuthUser {
            username: username.into(),
            role,
            claims: Claims {
                sub: username.into(),
                prefix: String::new(),
                fname: String::new(),
                lname: String::new(),
                role,
                iat: 0,
                exp: 0,
                jti: String::new(),
            },
        }
    }

    #[test]
    fn uploader_may_delete_own_file() {
        let manager = user("bob", Role::Manager);
        let rule = AccessRule::OwnerOr {
            owner: Some("bob"),
            role: Role::Secretary,
        };
        assert!(ensure_access(&manager, rule, messages::NOT_RESOURCE_OWNER).is_ok());
    }

    #[test]
    fn other_manager_is_forbidden() {
        let manager = user("carol", Role::Manager);
        let rule = AccessRule::OwnerOr {
            owner: Some("bob"),
            role: Role::Secretary,
        };
        assert_matches!(
            ensure_access(&manager, rule, messages::NOT_RESOURCE_OWNER),
            Err(AppError::Core(CoreError::Forbidden(msg))) if msg == messages::NOT_RESOURCE_OWNER
        );
    }

    #[test]
    fn secretary_passes_owner_rule() {
        let secretary = user("sec", Role::Secretary);
        let rule = AccessRule::OwnerOr {
            owner: Some("bob"),
            role: Role::Secretary,
        };
        assert!(ensure_access(&secretary, rule, messages::NOT_RESOURCE_OWNER).is_ok());
    }
}
