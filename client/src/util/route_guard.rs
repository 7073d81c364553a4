//! Navigation guard decisions.
//!
//! DESIGN
//! ======
//! `decide` is a pure function of a route's visibility and the current
//! `AuthState`. While an auth call is in flight every route is `Pending`, so
//! a half-finished login never bounces the user between pages. Protected
//! routes send anonymous users to `/login` carrying the requested path; the
//! login route sends signed-in users on to that path (or the landing route).

#[cfg(test)]
#[path = "route_guard_test.rs"]
mod route_guard_test;

use crate::state::auth::AuthState;

/// Public route holding the login/signup form.
pub const LOGIN_ROUTE: &str = "/login";
/// Where signed-in users land by default.
pub const DEFAULT_LANDING_ROUTE: &str = "/";
/// Protected account details page.
pub const PROFILE_ROUTE: &str = "/profile";
/// Query parameter carrying the post-login return path.
pub const RETURN_PARAM: &str = "next";

/// Who may see a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Anonymous-only; signed-in users are sent to the landing route.
    Public,
    /// Requires a signed-in user.
    Protected,
}

/// Static access rule for one route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutePolicy {
    pub path: &'static str,
    pub visibility: Visibility,
}

impl RoutePolicy {
    #[must_use]
    pub const fn public(path: &'static str) -> Self {
        Self { path, visibility: Visibility::Public }
    }

    #[must_use]
    pub const fn protected(path: &'static str) -> Self {
        Self { path, visibility: Visibility::Protected }
    }
}

/// Outcome of guarding one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested route.
    Allow,
    /// Auth state is still settling; show the loading placeholder.
    Pending,
    /// Navigate elsewhere, optionally remembering where the user was headed.
    Redirect { target: String, return_path: Option<String> },
}

/// Decide whether navigation to `policy.path` proceeds.
#[must_use]
pub fn decide(policy: &RoutePolicy, auth: &AuthState) -> GuardDecision {
    if auth.is_authenticating {
        return GuardDecision::Pending;
    }
    match (policy.visibility, auth.user.is_some()) {
        (Visibility::Public, false) | (Visibility::Protected, true) => GuardDecision::Allow,
        (Visibility::Public, true) => GuardDecision::Redirect {
            target: DEFAULT_LANDING_ROUTE.to_owned(),
            return_path: None,
        },
        (Visibility::Protected, false) => GuardDecision::Redirect {
            target: LOGIN_ROUTE.to_owned(),
            return_path: Some(policy.path.to_owned()),
        },
    }
}

/// `decide` for the location actually requested.
///
/// When an anonymous user is sent to login, the return path keeps the
/// requested query string instead of the bare declared path.
#[must_use]
pub fn decide_at(policy: &RoutePolicy, auth: &AuthState, requested: &str) -> GuardDecision {
    match decide(policy, auth) {
        GuardDecision::Redirect { target, return_path: Some(declared) } => {
            let same_route = normalize_path(path_of(requested)) == normalize_path(&declared);
            let return_path = if same_route { requested.to_owned() } else { declared };
            GuardDecision::Redirect { target, return_path: Some(return_path) }
        }
        other => other,
    }
}

/// Where to go after a successful login.
///
/// Only in-app absolute paths are honored; anything else, including the
/// login route itself, falls back to the landing route.
#[must_use]
pub fn post_login_target(return_path: Option<&str>) -> String {
    return_path
        .filter(|p| is_safe_return_path(p))
        .unwrap_or(DEFAULT_LANDING_ROUTE)
        .to_owned()
}

fn is_safe_return_path(path: &str) -> bool {
    // URL parsers drop tabs and newlines, so "/\t/host" would become "//host".
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(|c| c.is_control() || c.is_whitespace())
        && normalize_path(path_of(path)) != LOGIN_ROUTE
}

/// Path component of a location, without query or fragment.
fn path_of(location: &str) -> &str {
    location.split(['?', '#']).next().unwrap_or_default()
}

/// Drop a trailing slash, keeping the root as `/`.
fn normalize_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        other => other,
    }
}

/// Browser location for a redirect decision.
///
/// `return_param` is the `next` query value of the current location. It only
/// matters when a signed-in user is leaving the login route.
#[must_use]
pub fn redirect_location(decision: &GuardDecision, return_param: Option<&str>) -> Option<String> {
    let GuardDecision::Redirect { target, return_path } = decision else {
        return None;
    };
    let location = match return_path {
        Some(path) => format!("{target}?{RETURN_PARAM}={}", urlencoding::encode(path)),
        None if target == DEFAULT_LANDING_ROUTE => post_login_target(return_param),
        None => target.clone(),
    };
    Some(location)
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// The application's declared routes.
#[derive(Clone, Debug)]
pub struct RouteTable {
    policies: Vec<RoutePolicy>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(vec![
            RoutePolicy::public(LOGIN_ROUTE),
            RoutePolicy::protected(DEFAULT_LANDING_ROUTE),
            RoutePolicy::protected(PROFILE_ROUTE),
        ])
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(policies: Vec<RoutePolicy>) -> Self {
        Self { policies }
    }

    /// Exact-path lookup, ignoring a trailing slash and any query.
    #[must_use]
    pub fn policy_for(&self, path: &str) -> Option<&RoutePolicy> {
        let path = normalize_path(path_of(path));
        self.policies.iter().find(|p| p.path == path)
    }

    /// Decide for a requested location. Undeclared paths go to the landing route.
    #[must_use]
    pub fn resolve(&self, location: &str, auth: &AuthState) -> GuardDecision {
        match self.policy_for(location) {
            Some(policy) => decide_at(policy, auth, location),
            None => GuardDecision::Redirect {
                target: DEFAULT_LANDING_ROUTE.to_owned(),
                return_path: None,
            },
        }
    }
}
