//! Progress reporter.
//!
//! A cancellable repeating timer owned by a session. The ticker itself knows
//! nothing about hosts or engines: every firing calls a tick closure with the
//! generation the timer was started under, and the closure decides whether
//! that generation is still current.
//!
//! Cancellation bumps the generation. The session checks the generation under
//! its own lock before emitting, so once `cancel` returns (with that lock held
//! by the caller) no tick from an earlier generation can reach the host, even
//! if the aborted task was already past its timer.

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

#[derive(Debug, Default)]
pub(crate) struct ProgressTicker {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Invalidate the current generation and abort its task.
    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
            trace!(generation = self.generation, "Progress ticker cancelled");
        }
    }

    /// Cancel any running timer and start a new one.
    ///
    /// The first tick fires one `period` after this call, then every `period`.
    /// A late tick is delayed rather than bursted. The timer stops when `tick`
    /// returns `Break`.
    pub(crate) fn start<F>(&mut self, runtime: &Handle, period: Duration, mut tick: F)
    where
        F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tick(generation).is_break() {
                    trace!(generation, "Progress ticker stopped");
                    break;
                }
            }
        });

        self.task = Some(task);
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut ticker = ProgressTicker::default();

        let counter = count.clone();
        ticker.start(&Handle::current(), Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_bumps_generation_and_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen_generation = Arc::new(AtomicU64::new(u64::MAX));
        let mut ticker = ProgressTicker::default();

        let counter = count.clone();
        let seen = seen_generation.clone();
        ticker.start(&Handle::current(), Duration::from_millis(100), move |generation| {
            seen.store(generation, Ordering::SeqCst);
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });
        let started_under = ticker.generation();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(seen_generation.load(Ordering::SeqCst), started_under);

        ticker.cancel();
        assert!(!ticker.is_running());
        assert_ne!(ticker.generation(), started_under);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn break_stops_the_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut ticker = ProgressTicker::default();

        let counter = count.clone();
        ticker.start(&Handle::current(), Duration::from_millis(10), move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        tokio::time::sleep(Duration::from_millis(105)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
