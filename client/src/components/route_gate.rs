//! Route-level access gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages wrap their content in `RouteGate` with their declared path. The gate
//! renders the content, the loading placeholder, or a short redirect notice,
//! and installs the navigation effect for redirects.

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate, use_query_map};

use crate::components::loading_screen::LoadingScreen;
use crate::state::auth::AuthState;
use crate::util::auth::install_route_guard;
use crate::util::route_guard::{GuardDecision, RETURN_PARAM, RoutePolicy, RouteTable, decide};

/// Path plus query string, as handed to the guard.
fn requested_location(pathname: &str, search: &str) -> String {
    match search.trim_start_matches('?') {
        "" => pathname.to_owned(),
        query => format!("{pathname}?{query}"),
    }
}

#[component]
pub fn RouteGate(path: &'static str, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let policy = RouteTable::default()
        .policy_for(path)
        .copied()
        .unwrap_or(RoutePolicy::protected(path));

    let location = use_location();
    let requested =
        Signal::derive(move || requested_location(&location.pathname.get(), &location.search.get()));
    let query = use_query_map();
    let return_param = Signal::derive(move || query.with(|q| q.get(RETURN_PARAM)));
    install_route_guard(auth, policy, requested, return_param, use_navigate());

    let decision = Memo::new(move |_| decide(&policy, &auth.get()));

    move || match decision.get() {
        GuardDecision::Allow => children().into_any(),
        GuardDecision::Pending => view! { <LoadingScreen/> }.into_any(),
        GuardDecision::Redirect { .. } => view! {
            <div class="route-gate__redirect">
                <p>"Redirecting..."</p>
            </div>
        }
        .into_any(),
    }
}
