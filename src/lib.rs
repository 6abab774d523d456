//! fluid-watch Library
//!
//! Resilient watcher for Fluid resource collections: a WebSocket push
//! channel with bounded reconnects, polling fallback, debounced refresh
//! triggers, and deletion-driven selection invalidation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::{ListClient, ListError, ListSummary, WebSocketTransport};
pub use application::{WatchHooks, WatchParams, WatchSession};
pub use config::load_config;
pub use domain::endpoint::WatchTarget;
pub use domain::events::{ChangeNotification, EventClassifier, EventKind};
pub use domain::ports::{TransportError, WatchConnection, WatchTransport};
pub use infrastructure::{BackoffPolicy, Debouncer, FallbackPoller};
