mod transport;

pub use transport::{TransportError, WatchConnection, WatchTransport};
