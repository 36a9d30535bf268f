use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use stagewire_transport::WireStream;
use tracing::trace;

use crate::codec::{decode_frame, peek_payload_len, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete frames.
/// Reads are sized to the frame in progress, so nothing past the current
/// frame is ever pulled off the stream.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached before
    /// a full frame arrives and `Err(FrameError::TimedOut)` when the stream's
    /// read timeout expires.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.config.max_payload_size)? {
                trace!(size = frame.len(), "frame read");
                return Ok(frame);
            }

            let start = self.buf.len();
            let wanted = self.bytes_wanted().min(READ_CHUNK_SIZE);
            self.buf.resize(start + wanted, 0);

            let result = self.inner.read(&mut self.buf[start..]);
            let read = *result.as_ref().unwrap_or(&0);
            self.buf.truncate(start + read);

            match result {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::from_io(err)),
            }
        }
    }

    /// Bytes still missing from the frame currently being buffered.
    fn bytes_wanted(&self) -> usize {
        match peek_payload_len(&self.buf[..]) {
            Some(payload_len) => (HEADER_SIZE + payload_len).saturating_sub(self.buf.len()),
            None => HEADER_SIZE - self.buf.len(),
        }
    }

    /// Number of bytes of a partially received frame held in the buffer.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<WireStream> {
    /// Create a frame reader for `WireStream` and apply read timeout from config.
    pub fn with_config_wire(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: stagewire_transport::TransportError) -> FrameError {
    match err {
        stagewire_transport::TransportError::Io(io) => FrameError::Io(io),
        stagewire_transport::TransportError::Resolve { source, .. }
        | stagewire_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
