//! Caller identity
//!
//! Authentication happens outside this crate; every lifecycle call receives the
//! resulting [`AuthContext`].

use super::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// System role of a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Regular reader
    User,
    /// May publish books
    Author,
    /// Catalog administrator
    Admin,
    /// Top elevated role; bypasses ownership checks
    SuperAdmin,
}

impl Role {
    /// Whether this is the top elevated role
    pub fn is_top_elevated(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Author => "author",
            Role::Admin => "admin",
            Role::SuperAdmin => "superAdmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "author" => Ok(Role::Author),
            "admin" => Ok(Role::Admin),
            "superAdmin" | "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Authenticated caller attached to every lifecycle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Caller identity
    pub caller_id: UserId,
    /// Caller role
    pub role: Role,
}

impl AuthContext {
    /// Create a new auth context
    pub fn new(caller_id: UserId, role: Role) -> Self {
        Self { caller_id, role }
    }

    /// Whether the caller's role is among the given roles
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Ownership rule shared by update and delete: the top elevated role or the
    /// original creator
    pub fn may_modify(&self, created_by: &UserId) -> bool {
        self.role.is_top_elevated() || &self.caller_id == created_by
    }
}
