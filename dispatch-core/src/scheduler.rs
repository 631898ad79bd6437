//! Fixed-interval batch tick trigger.
//!
//! Built on `tokio::time::interval` with `MissedTickBehavior::Skip`: the
//! first tick fires after one full window, not immediately, and if a tick
//! is still running when the next one is due, that firing is dropped rather
//! than queued. Overlap is prevented with a non-blocking `try_lock` on a
//! dedicated guard mutex — a busy tick really does skip the next firing
//! instead of buffering it behind a channel.

use crate::batch_processor::BatchProcessor;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, warn};

pub struct Scheduler {
    processor: Arc<BatchProcessor>,
    window: Duration,
    tick_guard: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(processor: Arc<BatchProcessor>, window_minutes: u64) -> Self {
        Self {
            processor,
            window: Duration::from_secs(window_minutes * 60),
            tick_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Runs the scheduler loop forever. Intended to be spawned as its own
    /// task; callers that want a single tick for tests or an admin
    /// operation should call `BatchProcessor::process_batch` directly.
    pub async fn run(self) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.window, self.window);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match self.tick_guard.try_lock() {
                Ok(_guard) => {
                    let now = Utc::now();
                    if let Err(e) = self.processor.process_batch(now).await {
                        error!(error = %e, "batch tick failed");
                    }
                }
                Err(_) => {
                    warn!("skipping tick: previous tick still running");
                }
            }
        }
    }
}
