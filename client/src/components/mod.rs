//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared state (`AuthState`, `NotificationStore`) from
//! Leptos context providers set up in `app::App`.

pub mod loading_screen;
pub mod route_gate;
pub mod toast;
