//! Account details page (`/profile`).

use leptos::prelude::*;

use crate::components::route_gate::RouteGate;
use crate::pages::dashboard::logout_handler;
use crate::state::auth::AuthState;
use crate::util::route_guard::{DEFAULT_LANDING_ROUTE, PROFILE_ROUTE};

#[component]
pub fn ProfilePage() -> impl IntoView {
    view! {
        <RouteGate path=PROFILE_ROUTE>
            <ProfileContent/>
        </RouteGate>
    }
}

#[component]
fn ProfileContent() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let on_logout = logout_handler(auth);

    let field = move |pick: fn(&crate::net::types::User) -> Option<String>| {
        move || auth.read().user.as_ref().and_then(pick).unwrap_or_else(|| "Not set".to_owned())
    };

    view! {
        <div class="profile-page">
            <header class="profile-page__header toolbar">
                <a class="btn" href=DEFAULT_LANDING_ROUTE>"← Home"</a>
                <span class="toolbar__spacer"></span>
                <button class="btn toolbar__logout" on:click=on_logout>"Logout"</button>
            </header>
            <section class="profile-card">
                <h1>"Profile"</h1>
                <dl>
                    <dt>"User ID"</dt>
                    <dd>{field(|u| Some(u.id.clone()))}</dd>
                    <dt>"Username"</dt>
                    <dd>{field(|u| u.username.clone().filter(|n| !n.is_empty()))}</dd>
                    <dt>"Email"</dt>
                    <dd>{field(|u| u.primary_email().map(|e| e.address.clone()))}</dd>
                    <dt>"Email verified"</dt>
                    <dd>{field(|u| u.primary_email().map(|e| if e.verified { "Yes" } else { "No" }.to_owned()))}</dd>
                    <dt>"Member since"</dt>
                    <dd>{field(|u| u.created_date().map(str::to_owned))}</dd>
                </dl>
            </section>
        </div>
    }
}
