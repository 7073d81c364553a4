//! # client
//!
//! Leptos + WASM frontend for the gatekeeper account app.
//!
//! This crate contains the login/signup flow, guarded pages, the toast
//! notification store, and the `AuthService` client for the server's JSON
//! API. The server crate links it with the `ssr` feature for rendering; the
//! browser bundle is built with `hydrate`.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: hydrate the server-rendered `App`.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
