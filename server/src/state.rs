//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the loaded configuration, the in-memory
//! rate limiter, and the email transport.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;
use crate::services::mailer::Mailer;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<ServerConfig>,
    /// In-memory rate limiter for login and account creation.
    pub rate_limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: ServerConfig, mailer: Arc<dyn Mailer>) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limits);
        Self { pool, config: Arc::new(config), rate_limiter, mailer }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
