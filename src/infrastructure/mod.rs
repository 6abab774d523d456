//! Infrastructure Layer
//!
//! Timer-backed building blocks of the session: backoff pacing, debounced
//! refresh, and the polling fallback.

pub mod backoff;
pub mod debounce;
pub mod poller;

pub use backoff::BackoffPolicy;
pub use debounce::Debouncer;
pub use poller::FallbackPoller;
