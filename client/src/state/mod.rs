//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `notifications`) so components depend
//! on small focused models provided through Leptos context.

pub mod auth;
pub mod notifications;
