//! Auth routes: signup, login, logout, current user, email verification.
//!
//! ERROR HANDLING
//! ==============
//! Failures are JSON `{ "error": reason }` bodies. Account rule violations
//! carry their human-readable reason with 403; rate limiting is 429; storage
//! failures are logged and reported as a generic 500.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRef, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use client::net::types::{ErrorBody, LoginRequest, SignupFields};
use serde::Deserialize;
use time::Duration;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::rate_limit::{RateLimitError, RateLimitedMethod};
use crate::services::account::{self, AccountError, UserData};
use crate::services::{mailer, session};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Session user if the request carries a valid cookie, else `None`.
pub struct MaybeAuthUser(pub Option<AuthUser>);

async fn resolve_session(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, StatusCode> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    if token.is_empty() {
        return Ok(None);
    }

    let user_id = session::validate_session(&state.pool, token).await.map_err(|e| {
        tracing::error!(error = %e, "session lookup failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(user_id.map(|user_id| AuthUser { user_id, token: token.to_owned() }))
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        resolve_session(parts, &app_state).await?.ok_or(StatusCode::UNAUTHORIZED)
    }
}

impl<S> axum::extract::FromRequestParts<S> for MaybeAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(Self(resolve_session(parts, &app_state).await?))
    }
}

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::days(i64::from(config.accounts.login_expiration_days)))
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

pub(crate) fn account_error_status(err: &AccountError) -> StatusCode {
    match err {
        AccountError::Hash(_) | AccountError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::FORBIDDEN,
    }
}

fn account_error_response(err: AccountError) -> Response {
    let status = account_error_status(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "account operation failed");
        return error_response(status, "Internal server error");
    }
    error_response(status, err.to_string())
}

fn rate_limited_response(err: RateLimitError, method: RateLimitedMethod, addr: SocketAddr) -> Response {
    tracing::warn!(method = method.name(), client = %addr.ip(), "rate limit exceeded");
    error_response(StatusCode::TOO_MANY_REQUESTS, err.to_string())
}

async fn start_session(state: &AppState, jar: CookieJar, user: UserData) -> Response {
    match session::create_session(&state.pool, user.id, state.config.accounts.login_expiration_days).await {
        Ok(token) => (jar.add(session_cookie(token, &state.config)), Json(user)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "session creation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
        }
    }
}

/// Issue a verification token and email it. Failures are logged, not returned.
async fn send_verification(state: &AppState, user: &UserData) {
    let Some(address) = user.emails.first().map(|e| e.address.as_str()) else {
        return;
    };
    let token = match account::create_verification_token(&state.pool, user.id, address).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "verification token creation failed");
            return;
        }
    };
    let message = mailer::verification_email(&state.config.email, address, &token);
    if let Err(e) = state.mailer.send(&message).await {
        tracing::warn!(error = %e, user_id = %user.id, "verification email failed");
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/signup` — create an account and sign it in.
pub async fn signup(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    Json(body): Json<SignupFields>,
) -> Response {
    let method = RateLimitedMethod::CreateUser;
    if let Err(e) = state.rate_limiter.check_and_record(method, addr.ip()) {
        return rate_limited_response(e, method, addr);
    }
    if state.config.accounts.forbid_client_account_creation {
        return account_error_response(AccountError::SignupsForbidden);
    }

    let new_user = match account::validate_new_user(&body.email, &body.password, body.username.as_deref()) {
        Ok(new_user) => new_user,
        Err(e) => return account_error_response(e),
    };
    let user = match account::create_user(&state.pool, &new_user).await {
        Ok(user) => user,
        Err(e) => return account_error_response(e),
    };
    tracing::info!(user_id = %user.id, "account created");

    if state.config.accounts.send_verification_email {
        send_verification(&state, &user).await;
    }
    start_session(&state, jar, user).await
}

/// `POST /api/auth/login` — check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    let method = RateLimitedMethod::Login;
    if let Err(e) = state.rate_limiter.check_and_record(method, addr.ip()) {
        return rate_limited_response(e, method, addr);
    }

    let user_id = match account::authenticate(&state.pool, &body.email, &body.password).await {
        Ok(user_id) => user_id,
        Err(e) => return account_error_response(e),
    };
    let user = match account::load_user_data(&state.pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return account_error_response(AccountError::UserNotFound),
        Err(e) => return account_error_response(e.into()),
    };
    tracing::info!(%user_id, "login succeeded");
    start_session(&state, jar, user).await
}

/// `POST /api/auth/logout` — delete the session (if any) and clear the cookie.
pub async fn logout(State(state): State<AppState>, MaybeAuthUser(auth): MaybeAuthUser) -> impl IntoResponse {
    if let Some(auth) = auth {
        if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
            tracing::warn!(error = %e, user_id = %auth.user_id, "session delete failed");
        }
    }

    let jar = CookieJar::new().add(cleared_session_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me` — return the current user.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserData>, StatusCode> {
    match account::load_user_data(&state.pool, auth.user_id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    token: Option<String>,
}

/// `GET /api/auth/verify-email?token=` — mark the address verified, then go home.
pub async fn verify_email(State(state): State<AppState>, Query(query): Query<VerifyEmailQuery>) -> Response {
    let Some(token) = query.token.filter(|t| !t.trim().is_empty()) else {
        return account_error_response(AccountError::InvalidVerificationToken);
    };
    match account::verify_email_token(&state.pool, &token).await {
        Ok(user_id) => {
            tracing::info!(%user_id, "email verified");
            Redirect::to("/").into_response()
        }
        Err(e) => account_error_response(e),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
