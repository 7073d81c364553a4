//! Full-page placeholder shown while auth state settles.

use leptos::prelude::*;

#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="loading-screen" role="status">
            <div class="loading-screen__spinner" aria-hidden="true"></div>
            <p>"Loading..."</p>
        </div>
    }
}
