//! Toast notification store.
//!
//! DESIGN
//! ======
//! `NotificationStore` is a cheap-to-clone handle over one ordered map of live
//! notifications plus an observer list. Every effective mutation (`post`,
//! `dismiss`, `clear`) pushes the full ordered snapshot to each observer
//! synchronously. Ids come from a per-store counter and are never reused, so
//! the `BTreeMap` key order doubles as insertion order.
//!
//! Auto-expiry goes through the injected `Scheduler`. The expiry callback only
//! holds weak references and calls `dismiss`, which is idempotent: an explicit
//! dismiss or clear that lands first turns the later expiry into a no-op even
//! when the timer could not be cancelled.
//!
//! The store is used from the single UI thread. The lock is never held while
//! observers or the scheduler run, so observers may call back into the store.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use crate::util::scheduler::{Scheduler, TimerHandle, duration_ms};

/// Identifier assigned by `NotificationStore::post`.
pub type NotificationId = u64;

// =============================================================================
// KIND
// =============================================================================

/// Visual category of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub const ALL: [Self; 4] = [Self::Success, Self::Error, Self::Warning, Self::Info];

    /// Lifetime used when the caller does not pass one. Errors stay longest
    /// because they carry the most text to read.
    #[must_use]
    pub fn default_lifetime(self) -> Duration {
        match self {
            Self::Success | Self::Info => Duration::from_millis(4000),
            Self::Error => Duration::from_millis(6000),
            Self::Warning => Duration::from_millis(5000),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NotificationError::UnknownKind(s.to_owned()))
    }
}

// =============================================================================
// NOTIFICATION
// =============================================================================

/// A visible toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    /// Scheduler clock reading at creation.
    pub created_at_ms: u64,
    /// `0` means the toast stays until dismissed.
    pub lifetime_ms: u64,
}

/// Invalid-argument conditions raised by `post`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("notification message must not be empty")]
    EmptyMessage,
    #[error("unknown notification kind: {0:?}")]
    UnknownKind(String),
}

// =============================================================================
// STORE
// =============================================================================

type Observer = Arc<dyn Fn(&[Notification]) + Send + Sync>;

#[derive(Default)]
struct StoreInner {
    last_id: NotificationId,
    entries: BTreeMap<NotificationId, Notification>,
    timers: HashMap<NotificationId, TimerHandle>,
    last_observer: u64,
    observers: Vec<(u64, Observer)>,
}

/// Shared handle to the notification collection.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Mutex<StoreInner>>,
    scheduler: Arc<dyn Scheduler>,
}

impl NotificationStore {
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { inner: Arc::new(Mutex::new(StoreInner::default())), scheduler }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a notification and schedule its expiry.
    ///
    /// `lifetime` falls back to `kind.default_lifetime()`; a zero lifetime
    /// keeps the toast until it is dismissed.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::EmptyMessage` for a blank message.
    pub fn post(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        lifetime: Option<Duration>,
    ) -> Result<NotificationId, NotificationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(NotificationError::EmptyMessage);
        }
        let lifetime = lifetime.unwrap_or_else(|| kind.default_lifetime());
        let lifetime_ms = duration_ms(lifetime);
        let created_at_ms = self.scheduler.now_ms();

        let id = {
            let mut inner = self.lock();
            inner.last_id += 1;
            let id = inner.last_id;
            inner
                .entries
                .insert(id, Notification { id, message, kind, created_at_ms, lifetime_ms });
            id
        };

        if lifetime_ms > 0 {
            let store = Arc::downgrade(&self.inner);
            let scheduler = Arc::downgrade(&self.scheduler);
            let handle = self.scheduler.schedule(
                lifetime,
                Box::new(move || {
                    if let Some(store) = upgrade(&store, &scheduler) {
                        store.dismiss(id);
                    }
                }),
            );
            // Only retain the handle if the entry has not already gone.
            let mut inner = self.lock();
            if inner.entries.contains_key(&id) {
                inner.timers.insert(id, handle);
            }
        }

        self.notify();
        Ok(id)
    }

    /// `post` for callers holding the kind as a string.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::UnknownKind` for anything other than
    /// `success`, `error`, `warning` or `info`, and `EmptyMessage` as `post`.
    pub fn post_str(
        &self,
        message: impl Into<String>,
        kind: &str,
        lifetime: Option<Duration>,
    ) -> Result<NotificationId, NotificationError> {
        let kind = kind.parse::<NotificationKind>()?;
        self.post(message, kind, lifetime)
    }

    /// `post` for UI flows that have no caller to hand an error to. A
    /// rejected notification is logged as a warning.
    pub fn announce(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        lifetime: Option<Duration>,
    ) -> Option<NotificationId> {
        self.post(message, kind, lifetime)
            .inspect_err(|e| log::warn!("{kind} notification rejected: {e}"))
            .ok()
    }

    pub fn success(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.post(message, NotificationKind::Success, None)
    }

    pub fn error(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.post(message, NotificationKind::Error, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.post(message, NotificationKind::Warning, None)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.post(message, NotificationKind::Info, None)
    }

    /// Remove one notification. Missing ids are ignored and notify nobody.
    pub fn dismiss(&self, id: NotificationId) {
        let (removed, timer) = {
            let mut inner = self.lock();
            (inner.entries.remove(&id).is_some(), inner.timers.remove(&id))
        };
        if let Some(handle) = timer {
            self.scheduler.cancel(handle);
        }
        if removed {
            self.notify();
        }
    }

    /// Remove every notification and cancel all pending expiries.
    pub fn clear(&self) {
        let (removed, timers) = {
            let mut inner = self.lock();
            let removed = !inner.entries.is_empty();
            inner.entries.clear();
            let timers = inner.timers.drain().map(|(_, handle)| handle).collect::<Vec<_>>();
            (removed, timers)
        };
        for handle in timers {
            self.scheduler.cancel(handle);
        }
        if removed {
            self.notify();
        }
    }

    /// Register an observer for post-mutation snapshots.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&[Notification]) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.last_observer += 1;
        let key = inner.last_observer;
        inner.observers.push((key, Arc::new(observer)));
        Subscription { inner: Arc::downgrade(&self.inner), key }
    }

    /// Current notifications, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().entries.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn notify(&self) {
        let (snapshot, observers) = {
            let inner = self.lock();
            let snapshot = inner.entries.values().cloned().collect::<Vec<_>>();
            let observers = inner
                .observers
                .iter()
                .map(|(_, observer)| observer.clone())
                .collect::<Vec<_>>();
            (snapshot, observers)
        };
        for observer in observers {
            observer(&snapshot);
        }
    }
}

fn upgrade(store: &Weak<Mutex<StoreInner>>, scheduler: &Weak<dyn Scheduler>) -> Option<NotificationStore> {
    Some(NotificationStore { inner: store.upgrade()?, scheduler: scheduler.upgrade()? })
}

/// Registration returned by `NotificationStore::subscribe`.
#[derive(Clone)]
pub struct Subscription {
    inner: Weak<Mutex<StoreInner>>,
    key: u64,
}

impl Subscription {
    /// Stop receiving snapshots. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .observers
                .retain(|(key, _)| *key != self.key);
        }
    }
}
