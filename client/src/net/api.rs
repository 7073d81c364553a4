//! REST API helpers for communicating with the server.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): stubs reporting "not available" since these endpoints
//! are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every failure becomes an `AuthFailure` carrying the server's `error`
//! reason when one was sent, so the UI can show it verbatim.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::{SignupFields, User};
#[cfg(any(test, feature = "hydrate"))]
use super::types::ErrorBody;
use crate::state::auth::{AuthFailure, AuthService};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const SIGNUP_ENDPOINT: &str = "/api/auth/signup";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const USER_DATA_ENDPOINT: &str = "/api/users/me/data";

/// Build the failure for a non-OK response.
#[cfg(any(test, feature = "hydrate"))]
fn failure_from_status(status: u16, body: Option<ErrorBody>) -> AuthFailure {
    match body {
        Some(ErrorBody { error }) if !error.trim().is_empty() => AuthFailure::new(error),
        _ => AuthFailure::new(request_failed_message(status)),
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn request_failed_message(status: u16) -> String {
    match status {
        429 => "Too many attempts. Please wait a minute and try again.".to_owned(),
        _ => format!("request failed: {status}"),
    }
}

#[cfg(not(feature = "hydrate"))]
fn unavailable() -> AuthFailure {
    AuthFailure::new("not available on server")
}

/// `AuthService` backed by the server's JSON endpoints and session cookie.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpAuthService;

#[cfg(feature = "hydrate")]
impl HttpAuthService {
    async fn post_json<B: serde::Serialize>(url: &str, body: &B) -> Result<gloo_net::http::Response, AuthFailure> {
        let resp = gloo_net::http::Request::post(url)
            .json(body)
            .map_err(|e| AuthFailure::new(e.to_string()))?
            .send()
            .await
            .map_err(|e| AuthFailure::new(e.to_string()))?;
        Self::check(resp).await
    }

    async fn check(resp: gloo_net::http::Response) -> Result<gloo_net::http::Response, AuthFailure> {
        if resp.ok() {
            return Ok(resp);
        }
        let body = resp.json::<ErrorBody>().await.ok();
        Err(failure_from_status(resp.status(), body))
    }
}

impl AuthService for HttpAuthService {
    /// Read the signed-in user from `/api/users/me/data`.
    /// Returns `None` when anonymous, on network failure, or on the server.
    async fn current_user(&self) -> Option<User> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::get(USER_DATA_ENDPOINT).send().await.ok()?;
            if !resp.ok() {
                return None;
            }
            resp.json::<Option<User>>().await.ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthFailure> {
        #[cfg(feature = "hydrate")]
        {
            let payload = super::types::LoginRequest { email: email.to_owned(), password: password.to_owned() };
            let resp = Self::post_json(LOGIN_ENDPOINT, &payload).await?;
            resp.json::<User>().await.map_err(|e| AuthFailure::new(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password);
            Err(unavailable())
        }
    }

    async fn signup(&self, fields: &SignupFields) -> Result<User, AuthFailure> {
        #[cfg(feature = "hydrate")]
        {
            let resp = Self::post_json(SIGNUP_ENDPOINT, fields).await?;
            resp.json::<User>().await.map_err(|e| AuthFailure::new(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = fields;
            Err(unavailable())
        }
    }

    async fn logout(&self) -> Result<(), AuthFailure> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::post(LOGOUT_ENDPOINT)
                .send()
                .await
                .map_err(|e| AuthFailure::new(e.to_string()))?;
            Self::check(resp).await.map(|_| ())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(unavailable())
        }
    }
}
