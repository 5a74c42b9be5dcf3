pub mod http;
#[cfg(test)]
pub mod mock;
pub mod transport;

pub use http::HttpTransport;
pub use transport::{ChatTransport, ConnectError, TransportError};
