//! Scripted watch transport for session integration tests.
//!
//! Connections follow a fixed script of delayed outcomes, and the transport
//! records connect times and deliberate closes so tests can assert backoff
//! pacing and teardown behavior against virtual time.

#![allow(dead_code)]

use async_trait::async_trait;
use fluid_watch::{TransportError, WatchConnection, WatchTarget, WatchTransport};
use std::collections::VecDeque;
use std::future;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration, Instant};

/// One step of an accepted connection's script. Delays are relative to the
/// previous step.
pub enum Step {
    /// Yield a notification payload after the delay.
    Event(Duration, String),
    /// Peer closes the channel after the delay.
    PeerClose(Duration),
    /// Transport fault on the established channel after the delay.
    Fault(Duration),
    /// Stay connected and silent until the session tears down.
    Hold,
}

/// Outcome of one connect attempt.
pub enum Script {
    /// Connect attempt fails.
    Reject,
    /// Connect succeeds; the connection then follows the steps.
    Accept(Vec<Step>),
}

#[derive(Default)]
struct TransportLog {
    connect_times: Vec<Instant>,
    closes: usize,
}

pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    log: Arc<Mutex<TransportLog>>,
}

impl ScriptedTransport {
    /// Scripts are consumed per connect attempt; once exhausted, further
    /// attempts are rejected.
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            log: Arc::new(Mutex::new(TransportLog::default())),
        })
    }

    pub fn connect_count(&self) -> usize {
        self.log.lock().unwrap().connect_times.len()
    }

    pub fn connect_times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().connect_times.clone()
    }

    /// Number of deliberate (session-initiated) closes.
    pub fn close_count(&self) -> usize {
        self.log.lock().unwrap().closes
    }
}

#[async_trait]
impl WatchTransport for ScriptedTransport {
    async fn connect(
        &self,
        _target: &WatchTarget,
    ) -> Result<Box<dyn WatchConnection>, TransportError> {
        self.log.lock().unwrap().connect_times.push(Instant::now());

        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Accept(steps)) => Ok(Box::new(ScriptedConnection {
                steps: steps.into(),
                log: self.log.clone(),
            })),
            Some(Script::Reject) | None => {
                Err(TransportError::Connect("scripted connect failure".into()))
            }
        }
    }
}

struct ScriptedConnection {
    steps: VecDeque<Step>,
    log: Arc<Mutex<TransportLog>>,
}

#[async_trait]
impl WatchConnection for ScriptedConnection {
    async fn next_event(&mut self) -> Result<Option<String>, TransportError> {
        match self.steps.pop_front() {
            Some(Step::Event(delay, payload)) => {
                sleep(delay).await;
                Ok(Some(payload))
            }
            Some(Step::PeerClose(delay)) => {
                sleep(delay).await;
                Ok(None)
            }
            Some(Step::Fault(delay)) => {
                sleep(delay).await;
                Err(TransportError::Channel("scripted channel fault".into()))
            }
            Some(Step::Hold) | None => future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Notification payload in the gateway's wire shape.
pub fn event_json(kind: &str, name: &str) -> String {
    format!(
        r#"{{"type":"{kind}","object":{{"metadata":{{"name":"{name}","namespace":"team-a"}}}}}}"#
    )
}
