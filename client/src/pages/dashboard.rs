//! Authenticated landing page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Default landing route (`/`). Greets the signed-in user, shows account
//! status, and offers logout. Access is enforced by `RouteGate`.

use leptos::prelude::*;

use crate::components::route_gate::RouteGate;
use crate::state::auth::AuthState;
use crate::state::notifications::NotificationStore;
use crate::util::route_guard::{DEFAULT_LANDING_ROUTE, PROFILE_ROUTE};

/// Static feature highlights shown on the landing page.
const FEATURES: [(&str, &str); 3] = [
    ("Secure Authentication", "Passwords are hashed with Argon2 and sessions live in HttpOnly cookies."),
    ("Protected Routes", "Pages check your session before rendering and remember where you were headed."),
    ("Live Feedback", "Every action reports its outcome through toast notifications."),
];

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <RouteGate path=DEFAULT_LANDING_ROUTE>
            <HomeContent/>
        </RouteGate>
    }
}

#[component]
fn HomeContent() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let on_logout = logout_handler(auth);

    let greeting = move || {
        auth.read()
            .user
            .as_ref()
            .map(|u| format!("Welcome, {}!", u.display_name()))
            .unwrap_or_default()
    };
    let email = move || {
        auth.read()
            .user
            .as_ref()
            .and_then(|u| u.primary_email().map(|e| e.address.clone()))
            .unwrap_or_else(|| "N/A".to_owned())
    };
    let verified = move || {
        auth.read()
            .user
            .as_ref()
            .and_then(|u| u.primary_email().map(|e| e.verified))
            .unwrap_or(false)
    };
    let created = move || {
        auth.read()
            .user
            .as_ref()
            .and_then(|u| u.created_date().map(str::to_owned))
            .unwrap_or_else(|| "N/A".to_owned())
    };

    view! {
        <div class="dashboard-page">
            <header class="dashboard-page__header toolbar">
                <span class="toolbar__title">{greeting}</span>
                <span class="toolbar__spacer"></span>
                <a class="btn toolbar__profile" href=PROFILE_ROUTE>"Profile"</a>
                <button class="btn toolbar__logout" on:click=on_logout title="Logout">
                    "Logout"
                </button>
            </header>

            <section class="dashboard-page__account">
                <h2>"Account"</h2>
                <dl>
                    <dt>"Email"</dt>
                    <dd>{email}</dd>
                    <dt>"Status"</dt>
                    <dd class:verified=verified>
                        {move || if verified() { "Verified" } else { "Unverified" }}
                    </dd>
                    <dt>"Member since"</dt>
                    <dd>{created}</dd>
                </dl>
            </section>

            <section class="dashboard-page__features">
                {FEATURES
                    .iter()
                    .map(|(title, body)| {
                        view! {
                            <div class="feature-card">
                                <h3>{*title}</h3>
                                <p>{*body}</p>
                            </div>
                        }
                    })
                    .collect_view()}
            </section>
        </div>
    }
}

/// Click handler that signs the user out.
///
/// The route gate sends the now-anonymous user to `/login`.
pub(crate) fn logout_handler(auth: RwSignal<AuthState>) -> impl Fn(leptos::ev::MouseEvent) + Clone + 'static {
    let toasts = expect_context::<NotificationStore>();
    move |_| {
        #[cfg(feature = "hydrate")]
        {
            let toasts = toasts.clone();
            leptos::task::spawn_local(async move {
                let service = crate::net::api::HttpAuthService;
                crate::state::auth::sign_out(&service, auth.get_untracked(), &toasts, |s| auth.set(s)).await;
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (&toasts, auth);
    }
}
