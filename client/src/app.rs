//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Redirect, Route, Router, Routes},
};

use crate::components::toast::ToastContainer;
use crate::pages::{dashboard::HomePage, login::LoginPage, profile::ProfilePage};
use crate::state::auth::AuthState;
use crate::state::notifications::NotificationStore;
use crate::util::route_guard::DEFAULT_LANDING_ROUTE;
use crate::util::scheduler::default_scheduler;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the auth signal and toast store, resumes the stored session in
/// the browser, and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // Every route is Pending until the stored session has been checked.
    let auth = RwSignal::new(AuthState::resuming());
    let toasts = NotificationStore::new(default_scheduler());
    provide_context(auth);
    provide_context(toasts);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        crate::state::auth::resume_session(&crate::net::api::HttpAuthService, |s| auth.set(s)).await;
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/gatekeeper.css"/>
        <Title text="Gatekeeper"/>

        <Router>
            <main>
                <Routes fallback=|| view! { <Redirect path=DEFAULT_LANDING_ROUTE/> }>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("profile") view=ProfilePage/>
                </Routes>
            </main>
        </Router>
        <ToastContainer/>
    }
}
