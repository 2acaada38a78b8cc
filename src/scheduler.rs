//! Scheduler (§4.7): a single deferred-callback timer. `schedule` cancels
//! any existing timer before storing a new one; at most one pending timer
//! exists at any instant (§8.1 property 9). Grounded on the `tokio::time`
//! spawn-and-sleep pattern the teacher's `orchestrator::runner` uses for its
//! elapsed-time interval loop.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub struct Scheduler {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }
}

impl Scheduler {
    /// Cancels any existing timer, spawns a new one that invokes `cb` after
    /// `delay`, and returns the scheduled wall-clock time.
    pub async fn schedule<F>(&self, delay: Duration, cb: F) -> DateTime<Utc>
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel().await;
        let scheduled_at = Utc::now()
            + ChronoDuration::from_std(delay).unwrap_or_else(|_| ChronoDuration::zero());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            cb();
        });
        *self.pending.lock().await = Some(handle);
        scheduled_at
    }

    /// Idempotent: clears any pending timer, aborting it if present.
    pub async fn cancel(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }

    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}

/// Async variant used when the callback itself needs to await (e.g. the
/// Orchestrator's `run_cycle`). Shares the same cancel-before-schedule
/// discipline as `schedule`.
impl Scheduler {
    pub async fn schedule_async<F, Fut>(&self, delay: Duration, cb: F) -> DateTime<Utc>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.cancel().await;
        let scheduled_at = Utc::now()
            + ChronoDuration::from_std(delay).unwrap_or_else(|_| ChronoDuration::zero());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            cb().await;
        });
        *self.pending.lock().await = Some(handle);
        scheduled_at
    }
}

pub type SharedScheduler = Arc<Scheduler>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn schedule_then_cancel_prevents_callback() {
        let scheduler = Scheduler::default();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        scheduler
            .schedule(Duration::from_millis(50), move || {
                flag.store(true, Ordering::SeqCst);
            })
            .await;
        scheduler.cancel().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn rescheduling_cancels_the_previous_timer() {
        let scheduler = Scheduler::default();
        let first_fired = Arc::new(AtomicBool::new(false));
        let flag = first_fired.clone();
        scheduler
            .schedule(Duration::from_millis(200), move || {
                flag.store(true, Ordering::SeqCst);
            })
            .await;

        let second_fired = Arc::new(AtomicBool::new(false));
        let flag2 = second_fired.clone();
        scheduler
            .schedule(Duration::from_millis(10), move || {
                flag2.store(true, Ordering::SeqCst);
            })
            .await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!first_fired.load(Ordering::SeqCst));
        assert!(second_fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn at_most_one_pending_timer() {
        let scheduler = Scheduler::default();
        assert!(!scheduler.has_pending().await);
        scheduler.schedule(Duration::from_millis(100), || {}).await;
        assert!(scheduler.has_pending().await);
        scheduler
            .schedule(Duration::from_millis(100), || {})
            .await;
        assert!(scheduler.has_pending().await);
        scheduler.cancel().await;
        assert!(!scheduler.has_pending().await);
    }
}
