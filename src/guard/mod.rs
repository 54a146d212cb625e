//! Navigation guard deciding whether a route may be entered.
//!
//! DESIGN
//! ======
//! The guard owns no state of its own: every decision reads the shared
//! [`SessionContext`], so a login or logout is visible to the very next
//! check. Decisions are pure functions of (session, target, meta, policy).
//!
//! ORDER
//! =====
//! 1. auth required and not authenticated -> login page
//! 2. authenticated, roles listed, role not among them -> wrong-role page
//! 3. target is the login page and the policy bounces signed-in users -> home
//! 4. otherwise proceed

pub mod routes;

use std::sync::Arc;

use crate::identity::Role;
use crate::session::SessionContext;

pub use routes::{Route, RouteTable};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const HOME_PATH: &str = "/";

// =============================================================================
// TYPES
// =============================================================================

/// Where a signed-in user lacking the route's role is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrongRoleRedirect {
    Login,
    Unauthorized,
}

/// Per-route access metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Allowed roles. Empty means any authenticated user.
    pub roles: Vec<Role>,
}

impl RouteMeta {
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(roles: impl IntoIterator<Item = Role>) -> Self {
        Self { requires_auth: true, roles: roles.into_iter().collect() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

impl Navigation {
    fn to(path: &str) -> Self {
        Self::Redirect(path.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub login_path: String,
    pub unauthorized_path: String,
    pub home_path: String,
    pub wrong_role: WrongRoleRedirect,
    /// Send authenticated users away from the login page.
    pub redirect_authenticated_from_login: bool,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH.to_owned(),
            unauthorized_path: UNAUTHORIZED_PATH.to_owned(),
            home_path: HOME_PATH.to_owned(),
            wrong_role: WrongRoleRedirect::Unauthorized,
            redirect_authenticated_from_login: false,
        }
    }
}

impl GuardPolicy {
    fn wrong_role_path(&self) -> &str {
        match self.wrong_role {
            WrongRoleRedirect::Login => &self.login_path,
            WrongRoleRedirect::Unauthorized => &self.unauthorized_path,
        }
    }
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<SessionContext>,
    policy: GuardPolicy,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Arc<SessionContext>, policy: GuardPolicy) -> Self {
        Self { session, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    #[must_use]
    pub fn check(&self, path: &str, meta: &RouteMeta) -> Navigation {
        let authenticated = self.session.is_authenticated();

        if meta.requires_auth && !authenticated {
            tracing::debug!(path, "guard: not authenticated");
            return Navigation::to(&self.policy.login_path);
        }

        if authenticated && !meta.roles.is_empty() && !self.session.has_any_role(&meta.roles) {
            tracing::debug!(path, allowed = ?meta.roles, "guard: role not allowed");
            return Navigation::to(self.policy.wrong_role_path());
        }

        if authenticated && self.policy.redirect_authenticated_from_login && path == self.policy.login_path {
            return Navigation::to(&self.policy.home_path);
        }

        Navigation::Proceed
    }

    /// Only authenticated users pass.
    #[must_use]
    pub fn require_auth(&self) -> Navigation {
        if self.session.is_authenticated() {
            Navigation::Proceed
        } else {
            Navigation::to(&self.policy.login_path)
        }
    }

    /// Only anonymous users pass; signed-in users go home.
    #[must_use]
    pub fn require_guest(&self) -> Navigation {
        if self.session.is_authenticated() {
            Navigation::to(&self.policy.home_path)
        } else {
            Navigation::Proceed
        }
    }

    /// Authenticated users holding exactly `role` pass. Others are sent to
    /// the unauthorized page whatever the policy's wrong-role setting.
    #[must_use]
    pub fn require_role(&self, role: &Role) -> Navigation {
        if !self.session.is_authenticated() {
            Navigation::to(&self.policy.login_path)
        } else if !self.session.has_role(role) {
            Navigation::to(&self.policy.unauthorized_path)
        } else {
            Navigation::Proceed
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
