//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware components read one `AuthState` value from
//! context. `AuthService` is the boundary to the identity provider; the
//! browser build talks to the server through `net::api::HttpAuthService`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::time::Duration;

use crate::net::types::{SignupFields, User};
use crate::state::notifications::{NotificationKind, NotificationStore};

/// Authentication state tracking the current user and in-flight auth calls.
///
/// `is_authenticating` wins over `user` wherever routing decisions are made.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticating: bool,
}

impl AuthState {
    /// State on page load, before the stored session has been resumed.
    #[must_use]
    pub fn resuming() -> Self {
        Self { user: None, is_authenticating: true }
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user), is_authenticating: false }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Same identity, marked as waiting on an auth call.
    #[must_use]
    pub fn authenticating(&self) -> Self {
        Self { user: self.user.clone(), is_authenticating: true }
    }
}

/// A rejected or failed auth call, carrying a human-readable reason.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct AuthFailure {
    pub reason: String,
}

impl AuthFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Identity provider operations used by the UI.
#[allow(async_fn_in_trait)]
pub trait AuthService {
    /// Resume the stored session, if any.
    async fn current_user(&self) -> Option<User>;

    /// # Errors
    ///
    /// Returns `AuthFailure` when the credentials are rejected or the call fails.
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthFailure>;

    /// # Errors
    ///
    /// Returns `AuthFailure` when the account cannot be created.
    async fn signup(&self, fields: &SignupFields) -> Result<User, AuthFailure>;

    /// # Errors
    ///
    /// Returns `AuthFailure` when the session could not be ended server-side.
    async fn logout(&self) -> Result<(), AuthFailure>;
}

/// Resume the stored session and publish the result.
pub async fn resume_session<A, S>(service: &A, set_state: S)
where
    A: AuthService,
    S: Fn(AuthState),
{
    let state = match service.current_user().await {
        Some(user) => AuthState::signed_in(user),
        None => AuthState::anonymous(),
    };
    set_state(state);
}

/// End the session, bracketing the call with logout toasts.
///
/// The local identity is dropped even when the server call fails, since the
/// user asked to leave.
pub async fn sign_out<A, S>(service: &A, current: AuthState, toasts: &NotificationStore, set_state: S)
where
    A: AuthService,
    S: Fn(AuthState),
{
    toasts.announce("Logging out...", NotificationKind::Info, Some(Duration::from_millis(2000)));
    set_state(current.authenticating());
    let result = service.logout().await;
    set_state(AuthState::anonymous());
    match result {
        Ok(()) => {
            toasts.announce(
                "You have been logged out successfully",
                NotificationKind::Info,
                Some(Duration::from_millis(3000)),
            );
        }
        Err(e) => {
            toasts.announce(format!("Logout failed: {e}"), NotificationKind::Error, None);
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Mutex;

    use super::*;
    use crate::net::types::UserEmail;

    /// Build a signed-in user for tests.
    pub fn sample_user(id: &str) -> User {
        User {
            id: id.to_owned(),
            username: Some("ada".to_owned()),
            emails: vec![UserEmail { address: "ada@example.com".to_owned(), verified: true }],
            created_at: Some("2026-01-02T03:04:05Z".to_owned()),
            profile: None,
        }
    }

    /// Canned-response `AuthService` that records every call.
    pub struct FakeAuthService {
        pub current: Option<User>,
        pub login_result: Result<User, AuthFailure>,
        pub signup_result: Result<User, AuthFailure>,
        pub logout_result: Result<(), AuthFailure>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeAuthService {
        pub fn accepting(user: User) -> Self {
            Self {
                current: Some(user.clone()),
                login_result: Ok(user.clone()),
                signup_result: Ok(user),
                logout_result: Ok(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn rejecting(reason: &str) -> Self {
            Self {
                current: None,
                login_result: Err(AuthFailure::new(reason)),
                signup_result: Err(AuthFailure::new(reason)),
                logout_result: Err(AuthFailure::new(reason)),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AuthService for FakeAuthService {
        async fn current_user(&self) -> Option<User> {
            self.calls.lock().unwrap().push("current_user".to_owned());
            self.current.clone()
        }

        async fn login(&self, email: &str, _password: &str) -> Result<User, AuthFailure> {
            self.calls.lock().unwrap().push(format!("login:{email}"));
            self.login_result.clone()
        }

        async fn signup(&self, fields: &SignupFields) -> Result<User, AuthFailure> {
            self.calls.lock().unwrap().push(format!("signup:{}", fields.email));
            self.signup_result.clone()
        }

        async fn logout(&self) -> Result<(), AuthFailure> {
            self.calls.lock().unwrap().push("logout".to_owned());
            self.logout_result.clone()
        }
    }
}
