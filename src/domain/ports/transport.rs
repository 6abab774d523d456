//! Watch Transport Port
//!
//! Defines the interface the session uses to reach the streaming watch
//! endpoint. The production implementation speaks WebSocket; tests plug in
//! scripted connections.

use crate::domain::endpoint::WatchTarget;
use async_trait::async_trait;

/// Errors surfaced by a watch transport.
///
/// The session absorbs all of these; none propagate to the consumer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("channel error: {0}")]
    Channel(String),
}

/// Factory for watch connections.
#[async_trait]
pub trait WatchTransport: Send + Sync {
    /// Open a streaming connection to the watch endpoint for `target`.
    async fn connect(&self, target: &WatchTarget)
        -> Result<Box<dyn WatchConnection>, TransportError>;
}

/// One established streaming connection.
///
/// Owned exclusively by the session that opened it.
#[async_trait]
pub trait WatchConnection: Send {
    /// Receive the next notification payload.
    ///
    /// `Ok(Some(payload))` is a JSON-encoded change notification,
    /// `Ok(None)` means the peer closed the channel, and `Err` is a
    /// transport fault on an established connection.
    async fn next_event(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection deliberately, with a normal status code, so the
    /// peer does not treat the closure as a failure.
    async fn close(&mut self) -> Result<(), TransportError>;
}
