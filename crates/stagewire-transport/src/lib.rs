//! Blocking TCP transport for stagewire.
//!
//! This is the lowest layer of stagewire. It resolves and dials a remote
//! staging server and hands back a [`WireStream`] with read/write timeouts
//! already applied. Framing and protocol logic live in the crates above.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::WireStream;
pub use tcp::{connect_timeout, DEFAULT_IO_TIMEOUT};
