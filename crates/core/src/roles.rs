//! Role model and access rules.
//!
//! Role names must match the `CHECK` constraint on `users.role` in
//! `20250101000001_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SECRETARY: &str = "secretary";

/// Application role attached to every authenticated identity.
///
/// `User` is the baseline granted to anyone who authenticates against the
/// personnel directory, `Manager` may maintain agenda items, and `Secretary`
/// administers meetings and the management console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Manager,
    Secretary,
}

impl Role {
    /// Role granted when no local assignment exists.
    pub const BASELINE: Role = Role::User;

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Manager => ROLE_MANAGER,
            Role::Secretary => ROLE_SECRETARY,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_SECRETARY => Ok(Role::Secretary),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role assignment
// ---------------------------------------------------------------------------

/// Effective role and activation state for a username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: Role,
    pub active: bool,
}

impl Default for RoleAssignment {
    fn default() -> Self {
        Self {
            role: Role::BASELINE,
            active: true,
        }
    }
}

/// Turn an optional `(role, is_active)` row into an effective assignment.
///
/// A missing row yields the baseline role, active. An unrecognised role name
/// falls back to the baseline role but keeps the stored activation flag.
pub fn resolve_assignment(row: Option<(&str, bool)>) -> RoleAssignment {
    match row {
        None => RoleAssignment::default(),
        Some((role, active)) => RoleAssignment {
            role: role.parse().unwrap_or(Role::BASELINE),
            active,
        },
    }
}

// ---------------------------------------------------------------------------
// Access rules
// ---------------------------------------------------------------------------

/// Roles allowed to maintain agenda items.
pub const AGENDA_EDITORS: &[Role] = &[Role::Secretary, Role::Manager];

/// A role predicate declared by a route or evaluated against a loaded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule<'a> {
    /// The caller's role must equal this role.
    Exact(Role),
    /// The caller's role must be one of these roles.
    AnyOf(&'a [Role]),
    /// The caller must be the recorded owner, or hold `role`.
    OwnerOr { owner: Option<&'a str>, role: Role },
}

impl AccessRule<'_> {
    pub fn permits(&self, username: &str, role: Role) -> bool {
        match *self {
            AccessRule::Exact(required) => role == required,
            AccessRule::AnyOf(allowed) => allowed.contains(&role),
            AccessRule::OwnerOr {
                owner,
                role: privileged,
            } => role == privileged || owner.is_some_and(|o| o == username),
        }
    }
}
