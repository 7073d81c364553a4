//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every guarded route applies the same redirect behavior, driven by
//! `route_guard::decide_at` over the shared `AuthState` signal.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;
use crate::util::route_guard::{RoutePolicy, decide_at, redirect_location};

/// Replace the current location if the guard redirects.
///
/// `requested` is the current path plus query; `return_param` is the current
/// `next` query value. Returns whether `navigate` was called.
pub fn apply_route_guard<F>(
    policy: &RoutePolicy,
    auth: &AuthState,
    requested: &str,
    return_param: Option<&str>,
    navigate: &F,
) -> bool
where
    F: Fn(&str, NavigateOptions),
{
    let decision = decide_at(policy, auth, requested);
    let Some(location) = redirect_location(&decision, return_param) else {
        return false;
    };
    navigate(&location, NavigateOptions { replace: true, ..NavigateOptions::default() });
    true
}

/// Navigate away whenever the guard decides to redirect.
pub fn install_route_guard<F>(
    auth: RwSignal<AuthState>,
    policy: RoutePolicy,
    requested: Signal<String>,
    return_param: Signal<Option<String>>,
    navigate: F,
) where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        apply_route_guard(
            &policy,
            &auth.get(),
            &requested.get(),
            return_param.get().as_deref(),
            &navigate,
        );
    });
}
