//! Domain Layer
//!
//! Watch targets, change notifications, and the ports the session drives.

pub mod endpoint;
pub mod events;
pub mod ports;
