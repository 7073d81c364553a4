//! One-shot deferred callbacks for timed UI behavior.
//!
//! DESIGN
//! ======
//! State holders never touch browser timers directly. They ask a `Scheduler`
//! for a one-shot callback and keep the returned `TimerHandle` so the callback
//! can be cancelled later. `BrowserScheduler` sleeps on a `gloo-timers` future
//! inside `spawn_local`; `ManualScheduler` runs the same contract from a
//! virtual clock, which is what tests and server rendering use.
//!
//! TRADE-OFFS
//! ==========
//! Browser cancellation flips a flag instead of aborting the sleeping task.
//! The sleep still completes, but the callback body is skipped.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Deferred unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send>;

/// Opaque identifier for a scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Timer facility of the event loop.
pub trait Scheduler: Send + Sync {
    /// Current wall-clock time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Run `task` once after `delay` elapses.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Cancel a pending callback. Unknown or already-fired handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

/// Saturating conversion used for every millisecond value in the client.
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Scheduler for the current build target: browser timers when hydrating,
/// a never-advanced manual clock during server rendering.
#[must_use]
pub fn default_scheduler() -> Arc<dyn Scheduler> {
    #[cfg(feature = "hydrate")]
    {
        Arc::new(BrowserScheduler::new())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Arc::new(ManualScheduler::new())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MANUAL SCHEDULER
// =============================================================================

struct PendingTask {
    handle: TimerHandle,
    due_ms: u64,
    task: Task,
}

#[derive(Default)]
struct ManualInner {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<PendingTask>,
}

/// Scheduler driven by explicit `advance` calls.
#[derive(Default)]
pub struct ManualScheduler {
    inner: Mutex<ManualInner>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.inner).pending.len()
    }

    /// Move the virtual clock forward, firing due callbacks in deadline order.
    ///
    /// Callbacks run without the internal lock held, so they may schedule or
    /// cancel further work. Work scheduled by a callback fires in the same
    /// call if its deadline falls inside the window.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.inner).now_ms.saturating_add(duration_ms(by));
        loop {
            let next = {
                let mut inner = lock(&self.inner);
                let due = inner
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due_ms <= target)
                    .min_by_key(|(_, p)| (p.due_ms, p.handle))
                    .map(|(idx, _)| idx);
                due.map(|idx| {
                    let entry = inner.pending.remove(idx);
                    inner.now_ms = inner.now_ms.max(entry.due_ms);
                    entry
                })
            };
            let Some(entry) = next else {
                break;
            };
            (entry.task)();
        }
        lock(&self.inner).now_ms = target;
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        lock(&self.inner).now_ms
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut inner = lock(&self.inner);
        inner.next_handle += 1;
        let handle = TimerHandle(inner.next_handle);
        let due_ms = inner.now_ms.saturating_add(duration_ms(delay));
        inner.pending.push(PendingTask { handle, due_ms, task });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        lock(&self.inner).pending.retain(|p| p.handle != handle);
    }
}

// =============================================================================
// BROWSER SCHEDULER
// =============================================================================

#[cfg(feature = "hydrate")]
pub use browser::BrowserScheduler;

#[cfg(feature = "hydrate")]
mod browser {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::time::Duration;

    use super::{Scheduler, Task, TimerHandle, duration_ms, lock};

    /// `setTimeout`-backed scheduler for the hydrated client.
    #[derive(Default)]
    pub struct BrowserScheduler {
        next_handle: AtomicU64,
        live: Arc<std::sync::Mutex<HashMap<TimerHandle, Arc<AtomicBool>>>>,
    }

    impl BrowserScheduler {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Scheduler for BrowserScheduler {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        fn now_ms(&self) -> u64 {
            js_sys::Date::now() as u64
        }

        fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
            let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
            let cancelled = Arc::new(AtomicBool::new(false));
            lock(&self.live).insert(handle, cancelled.clone());

            let live = self.live.clone();
            let millis = u32::try_from(duration_ms(delay)).unwrap_or(u32::MAX);
            leptos::task::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(millis).await;
                lock(&live).remove(&handle);
                if !cancelled.load(Ordering::Relaxed) {
                    task();
                }
            });
            handle
        }

        fn cancel(&self, handle: TimerHandle) {
            if let Some(flag) = lock(&self.live).remove(&handle) {
                flag.store(true, Ordering::Relaxed);
            }
        }
    }
}
