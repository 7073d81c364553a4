//! Toast stack rendered over every page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the `NotificationStore` from context into a local signal through
//! `subscribe`, and unsubscribes when the container unmounts.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use leptos::prelude::*;

use crate::state::notifications::{Notification, NotificationId, NotificationKind, NotificationStore};

/// Glyph shown beside the message.
#[must_use]
pub fn toast_icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error => "✕",
        NotificationKind::Warning => "⚠",
        NotificationKind::Info => "ℹ",
    }
}

/// BEM class list for one toast.
#[must_use]
pub fn toast_class(kind: NotificationKind) -> String {
    format!("toast toast--{kind}")
}

#[component]
pub fn ToastContainer() -> impl IntoView {
    let store = expect_context::<NotificationStore>();
    let items = RwSignal::new(store.snapshot());
    let subscription = store.subscribe(move |snapshot| items.set(snapshot.to_vec()));
    on_cleanup(move || subscription.unsubscribe());

    let on_dismiss = Callback::new(move |id: NotificationId| store.dismiss(id));

    view! {
        <Show when=move || !items.read().is_empty()>
            <div class="toast-container" role="status" aria-live="polite">
                <For
                    each=move || items.get()
                    key=|toast| toast.id
                    children=move |toast| view! { <Toast toast on_dismiss/> }
                />
            </div>
        </Show>
    }
}

#[component]
fn Toast(toast: Notification, on_dismiss: Callback<NotificationId>) -> impl IntoView {
    let id = toast.id;
    view! {
        <div class=toast_class(toast.kind)>
            <span class="toast__icon" aria-hidden="true">{toast_icon(toast.kind)}</span>
            <span class="toast__message">{toast.message}</span>
            <button class="toast__close" title="Dismiss" on:click=move |_| on_dismiss.run(id)>
                "×"
            </button>
        </div>
    }
}
