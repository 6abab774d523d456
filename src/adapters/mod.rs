//! Adapters
//!
//! Concrete implementations of the outward-facing pieces: the WebSocket
//! watch transport and the HTTP list client.

pub mod list_client;
pub mod websocket;

pub use list_client::{ListClient, ListError, ListSummary};
pub use websocket::WebSocketTransport;
