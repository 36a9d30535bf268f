use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: payload length (4, little-endian) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the 32-bit length prefix can describe.
pub const MAX_WIRE_PAYLOAD: usize = u32::MAX as usize;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Number of wire bytes shown at each end of a frame's debug sample.
const SAMPLE_LEN: usize = 10;

/// One length-prefixed unit of opaque bytes.
///
/// The length is always derived from the payload, so the wire prefix can
/// never disagree with the bytes that follow it.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Create a new frame. Any payload, including an empty one, is valid.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Build a frame from a full wire buffer (`prefix || payload`).
    ///
    /// The prefix is stripped and not checked against the remaining length;
    /// the caller must already have read exactly one frame's worth of bytes.
    /// A buffer no longer than the prefix yields an empty payload.
    pub fn from_wire_bytes(buf: impl Into<Bytes>) -> Self {
        let buf = buf.into();
        let payload = if buf.len() > HEADER_SIZE {
            buf.slice(HEADER_SIZE..)
        } else {
            Bytes::new()
        };
        Self { payload }
    }

    /// Build a frame from a base64-encoded wire buffer.
    pub fn from_base64(text: &str) -> Result<Self> {
        let raw = STANDARD.decode(text.trim())?;
        Ok(Self::from_wire_bytes(raw))
    }

    /// The frame payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consume the frame and return its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// The 4-byte little-endian length prefix for this frame.
    pub fn length_prefix(&self) -> Result<[u8; HEADER_SIZE]> {
        encode_length(self.payload.len())
    }

    /// The full wire representation: `prefix || payload`.
    pub fn to_wire_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::new();
        encode_frame(&self.payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Base64 (standard alphabet, padded) of the full wire representation.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_wire_bytes()?))
    }
}

impl From<Vec<u8>> for Frame {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(payload)
    }
}

impl From<&'static [u8]> for Frame {
    fn from(payload: &'static [u8]) -> Self {
        Self::new(payload)
    }
}

impl From<String> for Frame {
    fn from(payload: String) -> Self {
        Self::new(payload)
    }
}

// Never prints the whole payload: size plus a hex sample of the first and
// last wire bytes is enough to correlate frames in logs.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = u32::try_from(self.payload.len())
            .unwrap_or(u32::MAX)
            .to_le_bytes();
        let wire = prefix.iter().chain(self.payload.iter()).copied();
        let head: Vec<u8> = wire.clone().take(SAMPLE_LEN).collect();
        let tail: Vec<u8> = wire
            .skip(self.wire_size().saturating_sub(SAMPLE_LEN))
            .collect();

        f.debug_struct("Frame")
            .field("size", &self.payload.len())
            .field(
                "sample",
                &format_args!("{} ... {}", hex::encode(head), hex::encode(tail)),
            )
            .finish()
    }
}

/// Encode a payload length as the 4-byte little-endian wire prefix.
pub fn encode_length(len: usize) -> Result<[u8; HEADER_SIZE]> {
    let len = u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge {
        size: len,
        max: MAX_WIRE_PAYLOAD,
    })?;
    Ok(len.to_le_bytes())
}

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────────────┐
/// │ Length       │ Payload         │
/// │ (4B LE u32)  │ (Length bytes)  │
/// └──────────────┴─────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let prefix = encode_length(payload.len())?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&prefix);
    dst.put_slice(payload);
    Ok(())
}

/// Declared payload length of the frame at the start of `src`, if the header
/// is complete.
pub(crate) fn peek_payload_len(src: &[u8]) -> Option<usize> {
    let header: [u8; HEADER_SIZE] = src.get(..HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(header) as usize)
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// A declared length above `max_payload` is rejected as soon as the header
/// is available. On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let Some(payload_len) = peek_payload_len(&src[..]) else {
        return Ok(None);
    };

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { payload }))
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
