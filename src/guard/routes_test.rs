use super::*;
use crate::guard::tests::session_as;

fn redirect(path: &str) -> Navigation {
    Navigation::Redirect(path.to_owned())
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn normalize_strips_query_and_trailing_slash() {
    assert_eq!(normalize_path("/devices/?page=2"), "/devices");
    assert_eq!(normalize_path("devices#top"), "/devices");
    assert_eq!(normalize_path("/"), "/");
    assert_eq!(normalize_path(""), "/");
}

#[test]
fn redirect_entry_is_followed() {
    let table = RouteTable::admin_routes();
    let resolved = table.resolve("/dashboard").unwrap();
    assert_eq!(resolved.path, "/");
    assert_eq!(resolved.route.name.as_deref(), Some("AdminDashboard"));
}

#[test]
fn unknown_paths_hit_the_catch_all() {
    assert_eq!(RouteTable::admin_routes().resolve("/nope/deeper").unwrap().path, "/");
    assert_eq!(RouteTable::client_portal_routes().resolve("/nope").unwrap().path, "/login");
}

#[test]
fn missing_route_without_catch_all_is_not_found() {
    let table = RouteTable::new(vec![Route::view("/", "Home", RouteMeta::public())], None, GuardPolicy::default());
    assert_eq!(table.resolve("/x").unwrap_err(), RouteError::NotFound("/x".to_owned()));
}

#[test]
fn redirect_cycle_is_reported() {
    let table = RouteTable::new(
        vec![Route::redirect("/a", "/b"), Route::redirect("/b", "/a")],
        None,
        GuardPolicy::default(),
    );
    assert!(matches!(table.resolve("/a"), Err(RouteError::RedirectLoop(_))));
}

// =============================================================================
// navigate: admin console
// =============================================================================

#[test]
fn admin_console_sends_anonymous_users_to_login() {
    let table = RouteTable::admin_routes();
    let guard = table.guard(session_as(None));
    assert_eq!(table.navigate(&guard, "/devices").unwrap(), redirect("/login"));
    assert_eq!(table.navigate(&guard, "/login").unwrap(), Navigation::Proceed);
}

#[test]
fn admin_console_admits_admins() {
    let table = RouteTable::admin_routes();
    let guard = table.guard(session_as(Some(Role::Admin)));
    assert_eq!(table.navigate(&guard, "/settings").unwrap(), Navigation::Proceed);
    assert_eq!(table.navigate(&guard, "/dashboard").unwrap(), redirect("/"));
    assert_eq!(table.navigate(&guard, "/login").unwrap(), redirect("/"));
}

#[test]
fn admin_console_wrong_role_lands_on_login() {
    let table = RouteTable::admin_routes();
    let guard = table.guard(session_as(Some(Role::Operator)));
    assert_eq!(table.navigate(&guard, "/devices").unwrap(), redirect("/login"));
    assert_eq!(table.navigate(&guard, "/login").unwrap(), Navigation::Proceed);
}

#[test]
fn admin_console_wrong_role_never_reaches_dashboard() {
    let table = RouteTable::admin_routes();
    for role in [Role::Operator, Role::Client, Role::SuperAdmin] {
        let guard = table.guard(session_as(Some(role.clone())));
        for path in ["/", "/dashboard", "/nope", "/nope/deeper"] {
            assert_eq!(table.navigate(&guard, path).unwrap(), redirect("/login"), "{role} -> {path}");
        }
    }
}

#[test]
fn forbidden_cycle_without_public_route_does_not_proceed() {
    let table = RouteTable::admin_routes().with_wrong_role(Some(WrongRoleRedirect::Unauthorized));
    let guard = table.guard(session_as(Some(Role::Operator)));
    assert_eq!(table.navigate(&guard, "/").unwrap(), redirect("/unauthorized"));
    assert_eq!(table.navigate(&guard, "/devices").unwrap(), redirect("/unauthorized"));
}

#[test]
fn wrong_role_override_replaces_table_default() {
    let table = RouteTable::admin_routes().with_wrong_role(Some(WrongRoleRedirect::Unauthorized));
    assert_eq!(table.policy().wrong_role, WrongRoleRedirect::Unauthorized);

    let unchanged = RouteTable::admin_routes().with_wrong_role(None);
    assert_eq!(unchanged.policy().wrong_role, WrongRoleRedirect::Login);
}

// =============================================================================
// navigate: client portal
// =============================================================================

#[test]
fn client_portal_routes_clients_to_their_dashboard_only() {
    let table = RouteTable::client_portal_routes();
    let guard = table.guard(session_as(Some(Role::Client)));
    assert_eq!(table.navigate(&guard, "/client-dashboard").unwrap(), Navigation::Proceed);
    assert_eq!(table.navigate(&guard, "/devices").unwrap(), redirect("/unauthorized"));
}

#[test]
fn client_portal_restricts_client_page_to_admins() {
    let table = RouteTable::client_portal_routes();
    let operator = table.guard(session_as(Some(Role::Operator)));
    assert_eq!(table.navigate(&operator, "/analytics").unwrap(), Navigation::Proceed);
    assert_eq!(table.navigate(&operator, "/client").unwrap(), redirect("/unauthorized"));

    let super_admin = table.guard(session_as(Some(Role::SuperAdmin)));
    assert_eq!(table.navigate(&super_admin, "/client").unwrap(), Navigation::Proceed);
}

#[test]
fn client_portal_unknown_path_goes_to_login() {
    let table = RouteTable::client_portal_routes();
    let guard = table.guard(session_as(None));
    assert_eq!(table.navigate(&guard, "/whatever").unwrap(), redirect("/login"));
}

#[test]
fn client_portal_wrong_role_never_reaches_staff_home() {
    let table = RouteTable::client_portal_routes();
    let guard = table.guard(session_as(Some(Role::Client)));
    assert_eq!(table.navigate(&guard, "/").unwrap(), redirect("/unauthorized"));
    assert_eq!(table.navigate(&guard, "/dashboard").unwrap(), redirect("/login"));
    assert_eq!(table.navigate(&guard, "/nope").unwrap(), redirect("/login"));

    let stranger = table.guard(session_as(Some(Role::Other("auditor".to_owned()))));
    assert_eq!(table.navigate(&stranger, "/").unwrap(), redirect("/unauthorized"));
    assert_eq!(table.navigate(&stranger, "/client-dashboard").unwrap(), redirect("/unauthorized"));
}

#[test]
fn client_portal_wrong_role_with_login_override_lands_on_login() {
    let table = RouteTable::client_portal_routes().with_wrong_role(Some(WrongRoleRedirect::Login));
    let guard = table.guard(session_as(Some(Role::Client)));
    for path in ["/", "/devices", "/client"] {
        assert_eq!(table.navigate(&guard, path).unwrap(), redirect("/login"), "{path}");
    }
}
