//! Repeating refresh task with an explicit start/cancel lifecycle.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

pub struct Poller {
    interval: Duration,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `task` immediately and then once per interval until cancelled.
    ///
    /// Runs never overlap: a slow run delays the next tick instead of
    /// queueing extra ones.
    pub fn start<F, Fut>(&self, mut task: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = self.interval;
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !flag.load(Ordering::Relaxed) {
                    break;
                }
                task().await;
            }
            debug!("Poller stopped");
        });

        debug!("Poller started with interval {:?}", period);
        PollHandle {
            running,
            handle: Some(handle),
        }
    }
}

/// Owner of a running poll loop; dropping it stops the loop
pub struct PollHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop polling; an in-flight run is aborted
    pub fn cancel(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Wait for the loop to end, which only happens once it is cancelled elsewhere or panics
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
