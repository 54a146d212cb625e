//! Login endpoints and login-response parsing.
//!
//! The admin service answers `{access_token, token_type, admin: {...}}`,
//! the relay answers a flat `{token, admin_id, username, full_name}`, and the
//! client portal nests under `client`. `parse_login_grant` accepts all three.

use serde_json::{Map, Value, json};

use super::{ApiClient, ApiError, RequestOptions};
use crate::identity::{Role, UserId, UserIdentity};

const ID_KEYS: [&str; 3] = ["admin_id", "client_id", "id"];
const USERNAME_KEYS: [&str; 2] = ["username", "client_username"];
const NESTED_KEYS: [&str; 3] = ["admin", "client", "user"];
const TOKEN_KEYS: [&str; 2] = ["token", "access_token"];

/// Identity and token extracted from a login response.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    /// `None` when the backend accepted the credentials but issued no token.
    pub token: Option<String>,
    pub user: UserIdentity,
}

/// How the role of the returned identity is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleRule {
    /// Use the response's role, else this default.
    Default(RoleDefault),
    /// Ignore the response and always use admin.
    ForceAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleDefault {
    Admin,
    Client,
}

impl ApiClient {
    /// `POST /admin/login`.
    ///
    /// # Errors
    ///
    /// Returns the request error, or [`ApiError::Decode`] if the response
    /// carries no usable identity.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let body = json!({ "username": username, "password": password });
        let resp = self.request("/admin/login", RequestOptions::post(body)).await?;
        parse_login_grant(&resp.into_value(), RoleRule::Default(RoleDefault::Admin))
    }

    /// `POST /api/admin/auth/login` on the edge relay. Relay admins are
    /// always `admin`, whatever the response says.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::admin_login`].
    pub async fn edge_relay_login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let body = json!({ "username": username, "password": password });
        let resp = self
            .request("/api/admin/auth/login", RequestOptions::post(body))
            .await?;
        parse_login_grant(&resp.into_value(), RoleRule::ForceAdmin)
    }

    /// `POST /api/client-management/auth/login`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::admin_login`].
    pub async fn client_login(&self, client_username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let body = json!({ "client_username": client_username, "password": password });
        let resp = self
            .request("/api/client-management/auth/login", RequestOptions::post(body))
            .await?;
        parse_login_grant(&resp.into_value(), RoleRule::Default(RoleDefault::Client))
    }

    /// `GET /api/admin/auth/me`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn admin_profile(&self) -> Result<Value, ApiError> {
        self.get("/api/admin/auth/me").await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_login_grant(body: &Value, rule: RoleRule) -> Result<LoginGrant, ApiError> {
    let Value::Object(root) = body else {
        return Err(ApiError::Decode("login response is not a JSON object".to_owned()));
    };

    let token = TOKEN_KEYS
        .iter()
        .find_map(|k| root.get(*k).and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned);

    let source = NESTED_KEYS
        .iter()
        .find_map(|k| root.get(*k).and_then(Value::as_object))
        .unwrap_or(root);

    let mut user = identity_from_object(source)?;
    user.role = match rule {
        RoleRule::ForceAdmin => Some(Role::Admin),
        RoleRule::Default(default) => user.role.or(Some(match default {
            RoleDefault::Admin => Role::Admin,
            RoleDefault::Client => Role::Client,
        })),
    };

    Ok(LoginGrant { token, user })
}

/// Build an identity from a backend user object (`admin_id`/`client_id`/`id`).
pub(crate) fn identity_from_object(source: &Map<String, Value>) -> Result<UserIdentity, ApiError> {
    let mut fields = source.clone();

    let id = ID_KEYS
        .iter()
        .find_map(|k| fields.get(*k).cloned())
        .ok_or_else(|| ApiError::Decode("user object has no id".to_owned()))?;
    let id = match id {
        Value::Number(n) => n
            .as_i64()
            .map(UserId::Int)
            .ok_or_else(|| ApiError::Decode(format!("user id {n} is not an integer")))?,
        Value::String(s) => UserId::Text(s),
        other => return Err(ApiError::Decode(format!("unsupported user id {other}"))),
    };

    let username = USERNAME_KEYS
        .iter()
        .find_map(|k| fields.get(*k).and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .ok_or_else(|| ApiError::Decode("user object has no username".to_owned()))?;

    let full_name = fields
        .get("full_name")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let role = fields
        .get("role")
        .and_then(Value::as_str)
        .map(Role::from);

    for key in ID_KEYS
        .iter()
        .chain(USERNAME_KEYS.iter())
        .chain(TOKEN_KEYS.iter())
        .chain(["full_name", "role", "token_type"].iter())
    {
        fields.remove(*key);
    }
    for key in NESTED_KEYS {
        fields.remove(key);
    }

    Ok(UserIdentity { id, username, full_name, role, extra: fields })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
