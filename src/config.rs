//! Admin client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::guard::WrongRoleRedirect;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9004";
pub const DEFAULT_STATE_DIR: &str = ".edgeadmin";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// Transport timeouts. `request_secs: None` leaves in-flight requests unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect_secs: u64,
    pub request_secs: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS, request_secs: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub base_url: String,
    pub state_dir: PathBuf,
    pub timeouts: Timeouts,
    /// Overrides the per-table wrong-role redirect when set.
    pub wrong_role_redirect: Option<WrongRoleRedirect>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            timeouts: Timeouts::default(),
            wrong_role_redirect: None,
        }
    }
}

impl AdminConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `EDGEADMIN_BASE_URL`: default `http://localhost:9004`
    /// - `EDGEADMIN_STATE_DIR`: default `.edgeadmin`
    /// - `EDGEADMIN_CONNECT_TIMEOUT_SECS`: default 10
    /// - `EDGEADMIN_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `EDGEADMIN_WRONG_ROLE_REDIRECT`: `login` or `unauthorized`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or enumerated value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("EDGEADMIN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        );
        let state_dir = std::env::var("EDGEADMIN_STATE_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let timeouts = Timeouts {
            connect_secs: env_parse_u64("EDGEADMIN_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_secs: env_parse_u64("EDGEADMIN_REQUEST_TIMEOUT_SECS")?,
        };
        let wrong_role_redirect = std::env::var("EDGEADMIN_WRONG_ROLE_REDIRECT")
            .ok()
            .map(|raw| parse_wrong_role_redirect(&raw))
            .transpose()?;

        Ok(Self { base_url, state_dir, timeouts, wrong_role_redirect })
    }
}

/// Trim trailing slashes so `base_url + "/api/..."` never doubles up.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::Parse(format!("{key} must be a non-negative integer, got '{raw}'")))
}

/// Parse a wrong-role redirect policy name.
///
/// # Errors
///
/// Returns an error for anything other than `login` or `unauthorized`.
pub fn parse_wrong_role_redirect(raw: &str) -> Result<WrongRoleRedirect, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "login" => Ok(WrongRoleRedirect::Login),
        "unauthorized" => Ok(WrongRoleRedirect::Unauthorized),
        other => Err(ConfigError::Parse(format!(
            "unknown wrong-role redirect '{other}' (expected 'login' or 'unauthorized')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
