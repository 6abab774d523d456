//! Debounced Refresh
//!
//! Coalesces bursts of refresh triggers into a single callback invocation,
//! fired after the window elapses from the last trigger. Used by the session
//! to rate-limit reloads of list data.

use std::future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

enum Command {
    Trigger,
    Cancel,
}

/// A debounced wrapper around a caller-supplied refresh callback.
///
/// Any number of `trigger()` calls within the window produce exactly one
/// callback invocation, timed from the last trigger. Dropping the debouncer
/// cancels any pending invocation.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<Command>,
}

impl Debouncer {
    /// Create a debouncer that invokes `callback` after `window` of quiet.
    pub fn new(window: Duration, callback: Arc<dyn Fn() + Send + Sync>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(window, callback, rx));
        Self { tx }
    }

    /// Arm (or re-arm) the window.
    pub fn trigger(&self) {
        let _ = self.tx.send(Command::Trigger);
    }

    /// Drop any pending invocation without firing it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }
}

async fn run(
    window: Duration,
    callback: Arc<dyn Fn() + Send + Sync>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        let fire = async {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => future::pending().await,
            }
        };

        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Trigger) => deadline = Some(Instant::now() + window),
                Some(Command::Cancel) => deadline = None,
                // All senders dropped: pending work is cancelled with them.
                None => break,
            },
            _ = fire => {
                deadline = None;
                callback();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting_callback() -> (Arc<AtomicUsize>, Arc<dyn Fn() + Send + Sync>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_one_invocation() {
        let (count, callback) = counting_callback();
        let debouncer = Debouncer::new(Duration::from_millis(1000), callback);

        debouncer.trigger();
        debouncer.trigger();
        debouncer.trigger();

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_from_last_trigger() {
        let (count, callback) = counting_callback();
        let debouncer = Debouncer::new(Duration::from_millis(1000), callback);

        debouncer.trigger();
        sleep(Duration::from_millis(600)).await;
        debouncer.trigger();

        // 1200ms after the first trigger, only 600ms after the last
        sleep(Duration::from_millis(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (count, callback) = counting_callback();
        let debouncer = Debouncer::new(Duration::from_millis(1000), callback);

        debouncer.trigger();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        debouncer.trigger();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_invocation() {
        let (count, callback) = counting_callback();
        let debouncer = Debouncer::new(Duration::from_millis(1000), callback);

        debouncer.trigger();
        sleep(Duration::from_millis(500)).await;
        debouncer.cancel();

        sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_after_cancel_still_fires() {
        let (count, callback) = counting_callback();
        let debouncer = Debouncer::new(Duration::from_millis(1000), callback);

        debouncer.trigger();
        debouncer.cancel();
        debouncer.trigger();

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_invocation() {
        let (count, callback) = counting_callback();
        let debouncer = Debouncer::new(Duration::from_millis(1000), callback);

        debouncer.trigger();
        drop(debouncer);

        sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
