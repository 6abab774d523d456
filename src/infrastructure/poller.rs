//! Fallback Poller
//!
//! Timer-based substitute for the push channel. When reconnect attempts are
//! exhausted or the channel errors, the session starts this poller to keep
//! list data eventually fresh at the cost of latency.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant};

/// Recurring refresh trigger with an idempotent activation guard.
///
/// At most one polling task exists per poller; `start()` on an active poller
/// is a no-op. The task is aborted on `stop()` and on drop.
pub struct FallbackPoller {
    interval: Duration,
    callback: Arc<dyn Fn() + Send + Sync>,
    handle: Option<JoinHandle<()>>,
}

impl FallbackPoller {
    /// Create an inactive poller that will invoke `callback` every
    /// `interval` once started.
    pub fn new(interval: Duration, callback: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            interval,
            callback,
            handle: None,
        }
    }

    /// Start polling. Idempotent: an already-active poller is left as is.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "fallback polling started");

        let period = self.interval;
        let callback = self.callback.clone();
        self.handle = Some(tokio::spawn(async move {
            // First tick one full period out; the consumer already has the
            // data it loaded before the channel degraded.
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                callback();
            }
        }));
    }

    /// Stop polling. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("fallback polling stopped");
        }
    }

    /// Whether a polling task is currently active.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for FallbackPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
