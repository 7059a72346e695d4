//! Talking to the controller: socket lifecycle, the request/reply exchange and
//! reply framing.

pub mod connection;
pub mod exchange;
pub mod framer;

pub use connection::{Connection, ConnectionError, ConnectionErrorKind, Endpoint};
pub use exchange::exchange;
pub use framer::{FramingError, RawPayload, ResponseFramer};
