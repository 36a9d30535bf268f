//! Client for a little-endian length-prefixed framing protocol.
//!
//! stagewire talks to a staging server over plain TCP: opaque payloads travel
//! as frames with a 4-byte length prefix, and a fixed handshake requests a
//! stage keyed by architecture, channel name and block timeout.
//!
//! # Crate Structure
//!
//! - [`transport`] — TCP connect with timeouts
//! - [`frame`] — Frame codec, base64 helpers, blocking reader/writer
//! - [`session`] — Session and stage handshake (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use stagewire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use stagewire_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use stagewire_session::*;
}
