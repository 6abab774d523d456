//! Watch Notifications
//!
//! Wire shape and classification of change notifications delivered by the
//! watch channel. Notifications are ephemeral: parsed, classified, and
//! dropped in the same turn.

use serde::Deserialize;
use tokio::time::{Duration, Instant};

/// Kind of change reported by the watch endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
}

impl EventKind {
    /// Map the wire-level type string. Unknown kinds (BOOKMARK, ERROR, ...)
    /// yield `None` and are ignored upstream.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "ADDED" => Some(Self::Added),
            "MODIFIED" => Some(Self::Modified),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Raw notification payload as sent by the watch endpoint.
///
/// Shape: `{ "type": "ADDED", "object": { "metadata": { "name": ..., "namespace": ... } } }`
#[derive(Debug, Deserialize)]
struct RawNotification {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    object: RawObject,
}

#[derive(Debug, Default, Deserialize)]
struct RawObject {
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    name: String,
    namespace: Option<String>,
}

/// A parsed change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub kind: EventKind,
    /// Name of the object the change refers to.
    pub name: String,
    /// Namespace of the object, absent for cluster-scoped objects.
    pub namespace: Option<String>,
}

impl ChangeNotification {
    /// Parse a JSON payload from the channel.
    ///
    /// Returns `Ok(None)` for well-formed payloads whose kind is not one of
    /// ADDED/MODIFIED/DELETED; those carry no refresh signal. Malformed
    /// payloads are an `Err` and are logged and discarded by the session.
    pub fn parse(payload: &str) -> Result<Option<Self>, serde_json::Error> {
        let raw: RawNotification = serde_json::from_str(payload)?;
        Ok(EventKind::from_wire(&raw.kind).map(|kind| Self {
            kind,
            name: raw.object.metadata.name,
            namespace: raw.object.metadata.namespace,
        }))
    }
}

/// Decides whether a notification warrants a refresh.
///
/// A freshly opened connection replays the full collection as ADDED events;
/// ADDED notifications inside the bootstrap window are connection noise, not
/// real changes, and are suppressed.
#[derive(Debug, Clone, Copy)]
pub struct EventClassifier {
    opened_at: Instant,
    bootstrap_window: Duration,
}

impl EventClassifier {
    /// Create a classifier anchored at the connection-established time.
    pub fn new(opened_at: Instant, bootstrap_window: Duration) -> Self {
        Self {
            opened_at,
            bootstrap_window,
        }
    }

    /// Whether a notification of `kind` arriving at `at` should trigger a
    /// refresh.
    pub fn should_refresh(&self, kind: EventKind, at: Instant) -> bool {
        match kind {
            EventKind::Added => at.duration_since(self.opened_at) >= self.bootstrap_window,
            EventKind::Modified | EventKind::Deleted => true,
        }
    }
}
