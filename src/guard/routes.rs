//! Route tables for the admin console and the client portal.

use std::sync::Arc;

use super::{GuardPolicy, Navigation, RouteGuard, RouteMeta, WrongRoleRedirect};
use crate::identity::Role;
use crate::session::SessionContext;

/// Upper bound on chained redirects before resolution gives up.
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("redirect loop while resolving '{0}'")]
    RedirectLoop(String),
}

/// One table entry. A route either renders (`redirect: None`) or forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: Option<String>,
    pub meta: RouteMeta,
    pub redirect: Option<String>,
}

impl Route {
    #[must_use]
    pub fn view(path: &str, name: &str, meta: RouteMeta) -> Self {
        Self { path: path.to_owned(), name: Some(name.to_owned()), meta, redirect: None }
    }

    #[must_use]
    pub fn redirect(path: &str, to: &str) -> Self {
        Self { path: path.to_owned(), name: None, meta: RouteMeta::public(), redirect: Some(to.to_owned()) }
    }
}

/// A route reached after following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub path: String,
    pub route: &'a Route,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    /// Catch-all target for unmatched paths.
    fallback: Option<String>,
    policy: GuardPolicy,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>, fallback: Option<&str>, policy: GuardPolicy) -> Self {
        Self { routes, fallback: fallback.map(ToOwned::to_owned), policy }
    }

    /// The admin console: every page is admin-only, a wrong role goes back
    /// to login, and signed-in users are bounced off the login page.
    #[must_use]
    pub fn admin_routes() -> Self {
        let admin = || RouteMeta::authenticated([Role::Admin]);
        let routes = vec![
            Route::view("/", "AdminDashboard", admin()),
            Route::view("/login", "Login", RouteMeta::public()),
            Route::redirect("/dashboard", "/"),
            Route::view("/devices", "Devices", admin()),
            Route::view("/servers", "Servers", admin()),
            Route::view("/client", "Client", admin()),
            Route::view("/analytics", "Analytics", admin()),
            Route::view("/settings", "Settings", admin()),
        ];
        let policy = GuardPolicy {
            wrong_role: WrongRoleRedirect::Login,
            redirect_authenticated_from_login: true,
            ..GuardPolicy::default()
        };
        Self::new(routes, Some("/"), policy)
    }

    /// The client portal: staff pages, a client dashboard, and an
    /// unauthorized page for wrong roles.
    #[must_use]
    pub fn client_portal_routes() -> Self {
        let staff = || RouteMeta::authenticated([Role::Admin, Role::Operator, Role::SuperAdmin]);
        let routes = vec![
            Route::view("/login", "Login", RouteMeta::public()),
            Route::view("/", "Dashboard", staff()),
            Route::view("/devices", "Devices", staff()),
            Route::view("/analytics", "Analytics", staff()),
            Route::view("/client", "Client", RouteMeta::authenticated([Role::Admin, Role::SuperAdmin])),
            Route::view("/settings", "Settings", staff()),
            Route::view("/client-dashboard", "ClientDashboard", RouteMeta::authenticated([Role::Client])),
            Route::view("/unauthorized", "Unauthorized", RouteMeta::public()),
        ];
        let policy = GuardPolicy { wrong_role: WrongRoleRedirect::Unauthorized, ..GuardPolicy::default() };
        Self::new(routes, Some("/login"), policy)
    }

    /// Replace the table's wrong-role behavior when an override is given.
    #[must_use]
    pub fn with_wrong_role(mut self, wrong_role: Option<WrongRoleRedirect>) -> Self {
        if let Some(wrong_role) = wrong_role {
            self.policy.wrong_role = wrong_role;
        }
        self
    }

    #[must_use]
    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// A guard enforcing this table's policy.
    #[must_use]
    pub fn guard(&self, session: Arc<SessionContext>) -> RouteGuard {
        RouteGuard::new(session, self.policy.clone())
    }

    fn lookup(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    /// Match `path`, following redirect entries and the catch-all.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] when nothing matches and there is no
    /// catch-all, or [`RouteError::RedirectLoop`] when redirects do not settle.
    pub fn resolve(&self, path: &str) -> Result<Resolved<'_>, RouteError> {
        let mut current = normalize_path(path);
        for _ in 0..=MAX_REDIRECTS {
            let route = match self.lookup(&current) {
                Some(route) => route,
                None => {
                    let fallback = self
                        .fallback
                        .as_deref()
                        .ok_or_else(|| RouteError::NotFound(current.clone()))?;
                    current = normalize_path(fallback);
                    continue;
                }
            };
            match &route.redirect {
                Some(to) => current = normalize_path(to),
                None => return Ok(Resolved { path: current, route }),
            }
        }
        Err(RouteError::RedirectLoop(path.to_owned()))
    }

    /// Resolve `path` and run `guard` until navigation settles. `Proceed`
    /// means `path` itself renders; `Redirect` names the final location.
    ///
    /// A guard redirect back to a path already visited in this navigation
    /// settles on the first public route of that cycle, or redirects to the
    /// guard's target when the cycle has none; a route whose check redirected
    /// never proceeds. A signed-in user with the wrong role bounced between
    /// login and home lands on login.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::resolve`].
    pub fn navigate(&self, guard: &RouteGuard, path: &str) -> Result<Navigation, RouteError> {
        let requested = normalize_path(path);
        let settle = |landing: String| {
            if landing == requested {
                Navigation::Proceed
            } else {
                Navigation::Redirect(landing)
            }
        };

        let mut resolved = self.resolve(&requested)?;
        let mut visited = vec![resolved.clone()];
        loop {
            let Navigation::Redirect(to) = guard.check(&resolved.path, &resolved.route.meta) else {
                return Ok(settle(resolved.path));
            };
            tracing::debug!(from = %resolved.path, %to, "navigation redirected");
            let next = self.resolve(&to)?;
            if let Some(start) = visited.iter().position(|seen| seen.path == next.path) {
                let public = visited[start..].iter().find(|seen| !seen.route.meta.requires_auth);
                return Ok(match public {
                    Some(seen) => settle(seen.path.clone()),
                    None => Navigation::Redirect(normalize_path(&to)),
                });
            }
            visited.push(next.clone());
            resolved = next;
        }
    }
}

/// Drop query and fragment, ensure a leading slash, trim trailing slashes.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
