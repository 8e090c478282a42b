//! # Interval Timer
//!
//! Restartable periodic-task driver used to poll the storage backend.
//!
//! - At most one loop runs per timer. `start` on a running timer is a no-op.
//! - `stop` cancels pending and future ticks. A tick already in flight runs
//!   to completion.
//! - Each tick makes up to `max_attempts` attempts. Every failure is logged at
//!   `warn`, an exhausted budget at `error`; the loop then waits for the next
//!   interval.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

struct RunningLoop {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

/// Periodic task driver.
pub struct IntervalTimer {
    interval: Duration,
    max_attempts: u32,
    running: Mutex<Option<RunningLoop>>,
}

impl IntervalTimer {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
            running: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the periodic loop running `task` every interval.
    ///
    /// Returns `false` if the timer was already running. Must be called from
    /// within a tokio runtime.
    pub fn start<F, Fut, E>(&self, task: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let mut running = self.running.lock();
        if running.as_ref().map_or(false, |r| !r.handle.is_finished()) {
            debug!("[rq-01] Timer already running, start ignored");
            return false;
        }

        let (stop, mut stopped) = watch::channel(false);
        let interval = self.interval;
        let max_attempts = self.max_attempts;

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = stopped.changed() => break,
                }
                run_tick(&task, max_attempts).await;
                if *stopped.borrow() {
                    break;
                }
            }
            debug!("[rq-01] Timer loop exited");
        });

        *running = Some(RunningLoop { handle, stop });
        true
    }

    /// Cancel pending and future ticks. Safe to call at any time.
    pub fn stop(&self) {
        if let Some(running) = self.running.lock().take() {
            let _ = running.stop.send(true);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .map_or(false, |r| !r.handle.is_finished())
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_tick<F, Fut, E>(task: &F, max_attempts: u32)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    for attempt in 1..=max_attempts {
        match task().await {
            Ok(()) => return,
            Err(e) => warn!(
                "[rq-01] Periodic task failed (attempt {}/{}): {}",
                attempt, max_attempts, e
            ),
        }
    }
    error!(
        "[rq-01] Periodic task failed {} times, deferring to next interval",
        max_attempts
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_task(
        counter: Arc<AtomicU32>,
        fail_first: u32,
    ) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<(), String>> + Send>>
           + Send
           + Sync
           + 'static {
        move || {
            let counter = counter.clone();
            Box::pin(async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= fail_first {
                    Err(format!("failure {}", n))
                } else {
                    Ok(())
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_interval() {
        let timer = IntervalTimer::new(Duration::from_secs(10), 1);
        let calls = Arc::new(AtomicU32::new(0));
        assert!(timer.start(counting_task(calls.clone(), 0)));

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_noop() {
        let timer = IntervalTimer::new(Duration::from_secs(10), 1);
        let calls = Arc::new(AtomicU32::new(0));
        assert!(timer.start(counting_task(calls.clone(), 0)));
        assert!(!timer.start(counting_task(calls.clone(), 0)));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_future_ticks() {
        let timer = IntervalTimer::new(Duration::from_secs(10), 1);
        let calls = Arc::new(AtomicU32::new(0));
        timer.start(counting_task(calls.clone(), 0));

        tokio::time::sleep(Duration::from_secs(15)).await;
        timer.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let timer = IntervalTimer::new(Duration::from_secs(10), 1);
        let calls = Arc::new(AtomicU32::new(0));
        timer.start(counting_task(calls.clone(), 0));
        timer.stop();
        tokio::task::yield_now().await;

        assert!(timer.start(counting_task(calls.clone(), 0)));
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempts_are_retried_within_a_tick() {
        let timer = IntervalTimer::new(Duration::from_secs(10), 5);
        let calls = Arc::new(AtomicU32::new(0));
        timer.start(counting_task(calls.clone(), 2));

        tokio::time::sleep(Duration::from_secs(15)).await;
        // two failures then one success, all in the first tick
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_bounded() {
        let timer = IntervalTimer::new(Duration::from_secs(10), 5);
        let calls = Arc::new(AtomicU32::new(0));
        timer.start(counting_task(calls.clone(), u32::MAX));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(timer.is_running());
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let timer = IntervalTimer::new(Duration::from_secs(1), 0);
        assert_eq!(timer.max_attempts, 1);
    }
}
