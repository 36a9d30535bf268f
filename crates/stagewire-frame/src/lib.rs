//! Length-prefixed frame codec for stagewire.
//!
//! Every frame on the wire is a 4-byte little-endian payload length followed
//! by exactly that many payload bytes. No magic, no version, no checksum.
//!
//! [`FrameReader`] and [`FrameWriter`] handle partial reads and writes
//! internally, so callers only ever see complete frames.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, encode_length, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, MAX_WIRE_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
