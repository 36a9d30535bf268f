//! Blocking session management for stagewire.
//!
//! A [`Session`] owns one TCP connection to a staging server. It exchanges
//! raw frames with [`Session::send_frame`] / [`Session::receive_frame`] and
//! runs the fixed stage-request handshake with [`Session::get_stage`].

pub mod error;
pub mod session;
pub mod stage;

pub use error::{Result, SessionError};
pub use session::{ConnectionState, Session, SessionConfig};
pub use stage::{request_stage, StageRequest, DEFAULT_BLOCK, DEFAULT_PIPENAME};
