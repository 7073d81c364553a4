//! In-memory rate limiting for account methods.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<(method, client), VecDeque<Instant>>`.
//! Two rules are enforced per client connection address:
//! - `login`: 5 attempts per 60 s
//! - `createUser`: 3 attempts per 60 s
//!
//! Every attempt counts, successful or not, so a client cannot probe
//! passwords faster than the window allows.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::env_parse;

const DEFAULT_LOGIN_LIMIT: usize = 5;
const DEFAULT_CREATE_USER_LIMIT: usize = 3;
const DEFAULT_WINDOW_SECS: u64 = 60;

/// Tracked clients above which idle entries are swept on insert.
const SWEEP_THRESHOLD: usize = 4096;

/// Methods subject to rate limiting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateLimitedMethod {
    Login,
    CreateUser,
}

impl RateLimitedMethod {
    /// Rule name, as used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CreateUser => "createUser",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CreateUser => "account creation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub login_limit: usize,
    pub create_user_limit: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_limit: DEFAULT_LOGIN_LIMIT,
            create_user_limit: DEFAULT_CREATE_USER_LIMIT,
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    pub(crate) fn from_lookup<L>(lookup: &L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        Self {
            login_limit: env_parse(lookup, "RATE_LIMIT_LOGIN", DEFAULT_LOGIN_LIMIT),
            create_user_limit: env_parse(lookup, "RATE_LIMIT_CREATE_USER", DEFAULT_CREATE_USER_LIMIT),
            window: Duration::from_secs(env_parse(lookup, "RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)),
        }
    }

    fn limit_for(&self, method: RateLimitedMethod) -> usize {
        match method {
            RateLimitedMethod::Login => self.login_limit,
            RateLimitedMethod::CreateUser => self.create_user_limit,
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Too many {action} attempts. Please wait {retry_after_secs} seconds and try again.")]
    Exceeded { action: &'static str, limit: usize, retry_after_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

type ClientKey = (RateLimitedMethod, IpAddr);

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<ClientKey, VecDeque<Instant>>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), config }
    }

    /// Check the method's limit for `client`, then record the attempt.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError::Exceeded` when the window is already full.
    pub fn check_and_record(&self, method: RateLimitedMethod, client: IpAddr) -> Result<(), RateLimitError> {
        self.check_and_record_at(method, client, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(
        &self,
        method: RateLimitedMethod,
        client: IpAddr,
        now: Instant,
    ) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.config.window;
        let limit = self.config.limit_for(method);

        if inner.len() >= SWEEP_THRESHOLD {
            inner.retain(|_, deque| {
                prune_window(deque, now, window);
                !deque.is_empty()
            });
        }

        let deque = inner.entry((method, client)).or_default();
        prune_window(deque, now, window);
        if deque.len() >= limit {
            let oldest = deque.front().copied().unwrap_or(now);
            let remaining = window.saturating_sub(now.duration_since(oldest));
            return Err(RateLimitError::Exceeded {
                action: method.action(),
                limit,
                retry_after_secs: remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0),
            });
        }

        deque.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) >= window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
