//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page wraps its content in `RouteGate` with its declared path and
//! delegates rendering details to `components`.

pub mod dashboard;
pub mod login;
pub mod profile;
