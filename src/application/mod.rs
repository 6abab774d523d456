//! Application Layer
//!
//! The watch session service that wires the domain and infrastructure
//! pieces together.

mod watch_session;

pub use watch_session::{WatchHooks, WatchParams, WatchSession};
