//! Watch Session
//!
//! Orchestrates one resilient watch over a resource collection: a push
//! channel with bounded exponential-backoff reconnects, degrading to
//! interval polling when the channel is exhausted, with debounced refresh
//! triggers and deletion-driven selection invalidation.
//!
//! Channel faults are absorbed here and never surfaced to the consumer;
//! the only outward signal is the boolean connectivity flag.

use crate::domain::endpoint::WatchTarget;
use crate::domain::events::{ChangeNotification, EventClassifier, EventKind};
use crate::domain::ports::{TransportError, WatchConnection, WatchTransport};
use crate::infrastructure::{BackoffPolicy, Debouncer, FallbackPoller};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

/// Parameters for one watch session.
#[derive(Debug, Clone)]
pub struct WatchParams {
    /// The resource collection to watch.
    pub target: WatchTarget,
    /// Quiet window for coalescing refresh triggers.
    pub debounce_window: Duration,
    /// Reload cadence while degraded to polling.
    pub poll_interval: Duration,
    /// Window after connection open during which ADDED replay is suppressed.
    pub bootstrap_window: Duration,
    /// Reconnect pacing and attempt bound.
    pub backoff: BackoffPolicy,
}

impl WatchParams {
    /// Parameters for `target` with the stock defaults: 1s debounce,
    /// 15s poll interval, 2s bootstrap window, 5 reconnect attempts.
    pub fn new(target: WatchTarget) -> Self {
        Self {
            target,
            debounce_window: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(15_000),
            bootstrap_window: Duration::from_millis(2000),
            backoff: BackoffPolicy::default(),
        }
    }

    /// Override the debounce window.
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Override the polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the bootstrap suppression window.
    pub fn bootstrap_window(mut self, window: Duration) -> Self {
        self.bootstrap_window = window;
        self
    }

    /// Override the reconnect backoff policy.
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }
}

/// Caller-supplied hooks invoked by the session.
///
/// Shared by reference, invoked only from the session, never mutated by it.
/// Failures inside a hook are the hosting view's concern.
#[derive(Clone)]
pub struct WatchHooks {
    on_refresh: Arc<dyn Fn() + Send + Sync>,
    on_deleted: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl WatchHooks {
    /// Hooks with only the reload trigger set.
    pub fn new<F>(on_refresh: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            on_refresh: Arc::new(on_refresh),
            on_deleted: None,
        }
    }

    /// Set the selection-invalidation hook, invoked on DELETED notifications
    /// before the refresh trigger.
    pub fn on_deleted<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_deleted = Some(Arc::new(callback));
        self
    }
}

/// Handle to a running watch session.
///
/// Dropping the handle requests teardown; `stop()` additionally waits for it
/// to complete. Both are idempotent.
pub struct WatchSession {
    connected_rx: watch::Receiver<bool>,
    stop_tx: watch::Sender<bool>,
    driver: Option<JoinHandle<()>>,
}

impl WatchSession {
    /// Start a session. The driver task owns the connection, all timers,
    /// and the attempt counter exclusively.
    pub fn start(
        params: WatchParams,
        transport: Arc<dyn WatchTransport>,
        hooks: WatchHooks,
    ) -> Self {
        let (connected_tx, connected_rx) = watch::channel(false);
        let (stop_tx, stop_rx) = watch::channel(false);

        let debouncer = Arc::new(Debouncer::new(params.debounce_window, hooks.on_refresh));
        let poll_trigger = {
            let debouncer = debouncer.clone();
            Arc::new(move || debouncer.trigger()) as Arc<dyn Fn() + Send + Sync>
        };

        let driver = Driver {
            target: params.target,
            bootstrap_window: params.bootstrap_window,
            backoff: params.backoff,
            transport,
            on_deleted: hooks.on_deleted,
            debouncer,
            poller: FallbackPoller::new(params.poll_interval, poll_trigger),
            attempts: 0,
            connected_tx,
            stop_rx,
        };

        Self {
            connected_rx,
            stop_tx,
            driver: Some(tokio::spawn(driver.run())),
        }
    }

    /// Snapshot of the push-channel connectivity flag.
    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    /// Subscribe to connectivity changes, e.g. for a passive indicator.
    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    /// Tear the session down and wait for cleanup to finish. Idempotent.
    pub async fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        // The driver finishes teardown on its own once signalled.
        let _ = self.stop_tx.send(true);
    }
}

/// Session state. Exactly one variant drives refreshes at any instant:
/// `Connected` owns the push channel, `Polling` means the fallback poller
/// is running, and neither holds in the transitional states.
enum Phase {
    Connecting,
    Backoff { until: Instant },
    Connected {
        conn: Box<dyn WatchConnection>,
        classifier: EventClassifier,
    },
    Polling,
    Terminated,
}

struct Driver {
    target: WatchTarget,
    bootstrap_window: Duration,
    backoff: BackoffPolicy,
    transport: Arc<dyn WatchTransport>,
    on_deleted: Option<Arc<dyn Fn() + Send + Sync>>,
    debouncer: Arc<Debouncer>,
    poller: FallbackPoller,
    attempts: u32,
    connected_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

/// Resolves when the session handle requests teardown (or is gone).
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}

enum ConnectOutcome {
    Stop,
    Opened(Box<dyn WatchConnection>),
    Failed(TransportError),
}

enum PumpOutcome {
    Stop,
    Payload(String),
    PeerClosed,
    Fault(TransportError),
}

impl Driver {
    async fn run(mut self) {
        let mut phase = Phase::Connecting;
        loop {
            phase = match phase {
                Phase::Connecting => self.connect().await,
                Phase::Backoff { until } => self.wait_backoff(until).await,
                Phase::Connected { conn, classifier } => self.pump(conn, classifier).await,
                Phase::Polling => self.poll_until_stopped().await,
                Phase::Terminated => break,
            };
        }
    }

    async fn connect(&mut self) -> Phase {
        let outcome = tokio::select! {
            _ = stop_requested(&mut self.stop_rx) => ConnectOutcome::Stop,
            result = self.transport.connect(&self.target) => match result {
                Ok(conn) => ConnectOutcome::Opened(conn),
                Err(e) => ConnectOutcome::Failed(e),
            },
        };

        match outcome {
            ConnectOutcome::Stop => self.teardown(None).await,
            ConnectOutcome::Opened(conn) => {
                self.attempts = 0;
                // Push and poll never drive refreshes at the same time.
                self.poller.stop();
                let _ = self.connected_tx.send(true);
                tracing::info!(
                    resource = %self.target.resource_plural,
                    namespace = %self.target.namespace,
                    "watch channel established"
                );
                Phase::Connected {
                    conn,
                    classifier: EventClassifier::new(Instant::now(), self.bootstrap_window),
                }
            }
            ConnectOutcome::Failed(e) => {
                tracing::warn!(error = %e, "watch connect failed");
                self.after_close()
            }
        }
    }

    async fn wait_backoff(&mut self, until: Instant) -> Phase {
        let stopped = tokio::select! {
            _ = stop_requested(&mut self.stop_rx) => true,
            _ = sleep_until(until) => false,
        };

        if stopped {
            self.teardown(None).await
        } else {
            Phase::Connecting
        }
    }

    async fn pump(&mut self, mut conn: Box<dyn WatchConnection>, classifier: EventClassifier) -> Phase {
        loop {
            let outcome = tokio::select! {
                _ = stop_requested(&mut self.stop_rx) => PumpOutcome::Stop,
                event = conn.next_event() => match event {
                    Ok(Some(payload)) => PumpOutcome::Payload(payload),
                    Ok(None) => PumpOutcome::PeerClosed,
                    Err(e) => PumpOutcome::Fault(e),
                },
            };

            match outcome {
                PumpOutcome::Stop => return self.teardown(Some(conn)).await,
                PumpOutcome::Payload(payload) => self.handle_payload(&payload, &classifier),
                PumpOutcome::PeerClosed => {
                    tracing::warn!("watch channel closed by peer");
                    return self.after_close();
                }
                PumpOutcome::Fault(e) => {
                    // Transport faults skip the reconnect ladder entirely.
                    tracing::warn!(error = %e, "watch channel fault, degrading to polling");
                    let _ = self.connected_tx.send(false);
                    self.poller.start();
                    return Phase::Polling;
                }
            }
        }
    }

    async fn poll_until_stopped(&mut self) -> Phase {
        stop_requested(&mut self.stop_rx).await;
        self.teardown(None).await
    }

    /// Routing after a non-deliberate close: reconnect while attempts
    /// remain, otherwise degrade to polling.
    fn after_close(&mut self) -> Phase {
        let _ = self.connected_tx.send(false);

        if self.backoff.exhausted(self.attempts) {
            tracing::warn!(
                attempts = self.attempts,
                "reconnect attempts exhausted, degrading to polling"
            );
            self.poller.start();
            Phase::Polling
        } else {
            let delay = self.backoff.delay_for(self.attempts);
            self.attempts += 1;
            tracing::warn!(
                attempt = self.attempts,
                delay_ms = delay.as_millis() as u64,
                "scheduling watch reconnect"
            );
            Phase::Backoff {
                until: Instant::now() + delay,
            }
        }
    }

    fn handle_payload(&self, payload: &str, classifier: &EventClassifier) {
        let notification = match ChangeNotification::parse(payload) {
            Ok(Some(n)) => n,
            Ok(None) => {
                tracing::debug!("ignoring notification of unhandled kind");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed watch notification");
                return;
            }
        };

        if notification.kind == EventKind::Deleted {
            // Selection invalidation runs before the refresh trigger.
            if let Some(callback) = &self.on_deleted {
                callback();
            }
        }

        if classifier.should_refresh(notification.kind, Instant::now()) {
            tracing::debug!(
                kind = ?notification.kind,
                name = %notification.name,
                "change notification triggers refresh"
            );
            self.debouncer.trigger();
        } else {
            tracing::debug!(name = %notification.name, "suppressing bootstrap replay event");
        }
    }

    /// Ordered teardown: the reconnect timer died with its phase, then the
    /// poll timer, then the pending debounced reload, then the connection
    /// (closed with a normal status so the peer sees a deliberate closure).
    async fn teardown(&mut self, conn: Option<Box<dyn WatchConnection>>) -> Phase {
        self.poller.stop();
        self.debouncer.cancel();

        if let Some(mut conn) = conn {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "error closing watch channel");
            }
        }

        let _ = self.connected_tx.send(false);
        tracing::info!(resource = %self.target.resource_plural, "watch session terminated");
        Phase::Terminated
    }
}
