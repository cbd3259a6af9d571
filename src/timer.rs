//! # Timer Service
//!
//! Deferred and repeating work as an explicit capability. Controllers never
//! call `tokio::spawn` for timed work directly; they ask a [`Scheduler`] and
//! keep the returned [`TimerHandle`], which cancels the work when it is
//! cancelled or dropped.
//!
//! ```rust
//! use futures::FutureExt;
//! use registration_client::{Scheduler, TokioScheduler};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let scheduler = TokioScheduler::new();
//! let mut handle = scheduler.schedule_once("demo", Duration::from_secs(60), async {}.boxed());
//! assert!(handle.is_active());
//!
//! handle.cancel();
//! assert!(!handle.is_active());
//! # });
//! ```

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Work run on each tick of a repeating timer
pub type RepeatingTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Capability for scheduling timed work
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// Run `task` once after `delay`
    fn schedule_once(&self, label: &'static str, delay: Duration, task: BoxFuture<'static, ()>)
        -> TimerHandle;

    /// Run `task` every `period`, first after one full period
    fn schedule_repeating(
        &self,
        label: &'static str,
        period: Duration,
        task: RepeatingTask,
    ) -> TimerHandle;
}

/// Cancellation handle for scheduled work; aborts on drop
pub struct TimerHandle {
    label: &'static str,
    abort: Option<AbortHandle>,
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("label", &self.label)
            .field("active", &self.is_active())
            .finish()
    }
}

impl TimerHandle {
    #[must_use]
    pub fn new(label: &'static str, abort: AbortHandle) -> Self {
        Self {
            label,
            abort: Some(abort),
        }
    }

    /// A handle with nothing behind it
    #[must_use]
    pub fn inert(label: &'static str) -> Self {
        Self { label, abort: None }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the scheduled work can still run
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.abort.as_ref().is_some_and(|a| !a.is_finished())
    }

    /// Stop the work if it has not completed. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(abort) = self.abort.take() {
            if !abort.is_finished() {
                debug!(timer = self.label, "Cancelling timer");
            }
            abort.abort();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler backed by the tokio runtime clock
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn shared() -> Arc<dyn Scheduler> {
        Arc::new(Self)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(
        &self,
        label: &'static str,
        delay: Duration,
        task: BoxFuture<'static, ()>,
    ) -> TimerHandle {
        debug!(timer = label, delay_ms = delay.as_millis() as u64, "Arming one-shot timer");
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(timer = label, "One-shot timer fired");
            task.await;
        });
        TimerHandle::new(label, join.abort_handle())
    }

    fn schedule_repeating(
        &self,
        label: &'static str,
        period: Duration,
        task: RepeatingTask,
    ) -> TimerHandle {
        // interval_at panics on a zero period
        let period = period.max(Duration::from_millis(1));
        debug!(timer = label, period_ms = period.as_millis() as u64, "Starting repeating timer");
        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!(timer = label, "Repeating timer tick");
                task().await;
            }
        });
        TimerHandle::new(label, join.abort_handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let _handle = TokioScheduler.schedule_once(
            "test",
            Duration::from_millis(3000),
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed(),
        );

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_one_shot_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let mut handle = TokioScheduler.schedule_once(
            "test",
            Duration::from_secs(1),
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed(),
        );

        handle.cancel();
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_ticks_until_dropped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let task: RepeatingTask = Arc::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        });
        let handle = TokioScheduler.schedule_repeating("test", Duration::from_secs(10), task);

        tokio::time::sleep(Duration::from_millis(9_900)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(20_200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }
}
