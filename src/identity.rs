//! User identity and role tags.
//!
//! DESIGN
//! ======
//! Roles are plain string tags compared by exact equality. Known tags get
//! named variants for readability, anything else round-trips through
//! `Role::Other` so a backend introducing a new role never breaks session
//! restore. Identities keep unknown fields in `extra` for the same reason.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ROLE
// =============================================================================

/// Access-control tag attached to a user identity. No hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Operator,
    Client,
    SuperAdmin,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Client => "client",
            Self::SuperAdmin => "super_admin",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "admin" => Self::Admin,
            "operator" => Self::Operator,
            "client" => Self::Client,
            "super_admin" => Self::SuperAdmin,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// USER ID
// =============================================================================

/// Backends hand out integer ids or UUID strings depending on the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

// =============================================================================
// USER IDENTITY
// =============================================================================

/// The identity half of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    /// Relay login records may omit it; restored as empty.
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "displayName", alias = "display_name", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Fields the console does not interpret (email, timestamps, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserIdentity {
    #[must_use]
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            full_name: None,
            role,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Name shown to operators: full name when known, else the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.role.as_ref() == Some(role)
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
