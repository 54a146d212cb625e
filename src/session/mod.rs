//! Auth/session state shared by the console's entry points.
//!
//! DESIGN
//! ======
//! `SessionContext` is built once by the entry point and shared by `Arc`.
//! It holds the current identity; the bearer token stays owned by
//! [`ApiClient`], so "authenticated" means both halves are present.
//!
//! CONSISTENCY
//! ===========
//! Every mutation holds the identity write lock across its storage writes,
//! so concurrent `login`/`logout` serialize and storage always matches the
//! in-memory identity once the lock is released.

pub mod migrate;

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use crate::api::auth::{LoginGrant, identity_from_object};
use crate::api::{ApiClient, ApiError, TOKEN_KEY};
use crate::identity::{Role, UserIdentity};
use crate::storage::{SessionStorage, StorageError};

use migrate::MigrationOutcome;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The backend accepted the credentials but returned no token.
    #[error("No token received")]
    MissingToken,
}

/// What `initialize_auth` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A valid record was loaded.
    Restored,
    /// Nothing persisted; state is logged out.
    Empty,
    /// A persisted record was unreadable; every session key was cleared.
    Reset,
}

// =============================================================================
// CONTEXT
// =============================================================================

pub struct SessionContext {
    api: Arc<ApiClient>,
    storage: Arc<dyn SessionStorage>,
    user: RwLock<Option<UserIdentity>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("api", &self.api)
            .field("user", &self.user())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// A logged-out context. Call [`SessionContext::initialize_auth`] to
    /// pick up a persisted session.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { api, storage, user: RwLock::new(None) }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    fn write_user(&self) -> RwLockWriteGuard<'_, Option<UserIdentity>> {
        self.user.write().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // mutations
    // -------------------------------------------------------------------------

    /// Adopt `user` and persist it. A non-empty `token` is handed to the
    /// API client; otherwise the client's current token is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails. The in-memory identity is
    /// updated regardless.
    pub fn login(&self, user: UserIdentity, token: Option<&str>) -> Result<(), StorageError> {
        let mut slot = self.write_user();
        tracing::info!(username = %user.username, role = ?user.role, "session login");
        let persisted = migrate::write_record(self.storage.as_ref(), &user);
        *slot = Some(user);
        persisted?;
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.api.set_token(token)?;
        }
        Ok(())
    }

    /// Forget the identity, every persisted session key and the token.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure; every removal is still attempted.
    pub fn logout(&self) -> Result<(), StorageError> {
        let mut slot = self.write_user();
        if let Some(user) = slot.take() {
            tracing::info!(username = %user.username, "session logout");
        }
        self.clear_persisted()
    }

    fn clear_persisted(&self) -> Result<(), StorageError> {
        let records = migrate::remove_all(self.storage.as_ref());
        let token = self.api.clear_token();
        records.and(token)
    }

    /// Restore the session from storage, upgrading legacy records first.
    ///
    /// A record that does not decode is never surfaced as an error: all
    /// session keys and the token are cleared and the outcome is
    /// [`RestoreOutcome::Reset`]. Calling this again yields the same state.
    ///
    /// # Errors
    ///
    /// Returns an error only if storage itself fails.
    pub fn initialize_auth(&self) -> Result<RestoreOutcome, StorageError> {
        let mut slot = self.write_user();
        match migrate::migrate(self.storage.as_ref())? {
            MigrationOutcome::Current(user) | MigrationOutcome::Migrated { user, .. } => {
                if let Some(token) = self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) {
                    self.api.set_token(&token)?;
                }
                tracing::debug!(username = %user.username, "session restored");
                *slot = Some(user);
                Ok(RestoreOutcome::Restored)
            }
            MigrationOutcome::Nothing => {
                *slot = None;
                Ok(RestoreOutcome::Empty)
            }
            MigrationOutcome::Corrupt => {
                tracing::warn!("persisted session unreadable; clearing");
                *slot = None;
                self.clear_persisted()?;
                Ok(RestoreOutcome::Reset)
            }
        }
    }

    // -------------------------------------------------------------------------
    // queries
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn user(&self) -> Option<UserIdentity> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A user is loaded and the API client holds a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let has_user = self
            .user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        has_user && self.api.is_authenticated()
    }

    /// Exact match on the current user's role. False when logged out.
    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|u| u.has_role(role))
    }

    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|u| u.role.as_ref())
            .is_some_and(|role| roles.contains(role))
    }

    // -------------------------------------------------------------------------
    // backend logins
    // -------------------------------------------------------------------------

    fn adopt(&self, grant: LoginGrant) -> Result<UserIdentity, SessionError> {
        let Some(token) = grant.token else {
            tracing::warn!(username = %grant.user.username, "login response carried no token");
            return Err(SessionError::MissingToken);
        };
        self.login(grant.user.clone(), Some(&token))?;
        Ok(grant.user)
    }

    /// Log in against the admin service.
    ///
    /// # Errors
    ///
    /// Returns the API error, [`SessionError::MissingToken`], or a storage
    /// failure. The session is untouched on error.
    pub async fn login_with_credentials(&self, username: &str, password: &str) -> Result<UserIdentity, SessionError> {
        let grant = self.api.admin_login(username, password).await?;
        self.adopt(grant)
    }

    /// Log in against the edge relay; the identity is always `admin`.
    ///
    /// # Errors
    ///
    /// See [`SessionContext::login_with_credentials`].
    pub async fn login_with_edge_relay(&self, username: &str, password: &str) -> Result<UserIdentity, SessionError> {
        let grant = self.api.edge_relay_login(username, password).await?;
        self.adopt(grant)
    }

    /// Log in to the client portal; the identity defaults to `client`.
    ///
    /// # Errors
    ///
    /// See [`SessionContext::login_with_credentials`].
    pub async fn client_login(&self, client_username: &str, password: &str) -> Result<UserIdentity, SessionError> {
        let grant = self.api.client_login(client_username, password).await?;
        self.adopt(grant)
    }

    /// Re-fetch the profile and replace the stored identity. The known role
    /// is kept when the profile does not carry one.
    ///
    /// # Errors
    ///
    /// Returns the API error, a decode failure, or a storage failure. The
    /// session is untouched on error.
    pub async fn refresh_profile(&self) -> Result<UserIdentity, SessionError> {
        let profile = self.api.admin_profile().await?;
        let object = profile
            .as_object()
            .ok_or_else(|| ApiError::Decode("profile is not a JSON object".to_owned()))?;
        let mut user = identity_from_object(object)?;

        let mut slot = self.write_user();
        if user.role.is_none() {
            user.role = slot.as_ref().and_then(|u| u.role.clone());
        }
        migrate::write_record(self.storage.as_ref(), &user)?;
        *slot = Some(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
