use std::io::ErrorKind;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Base64 input could not be decoded.
    #[error("invalid base64 frame: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was transferred.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// A read or write did not complete within the socket timeout.
    #[error("frame I/O timed out")]
    TimedOut,
}

impl FrameError {
    /// Classify an I/O error; socket timeouts surface as `WouldBlock` on Unix
    /// and `TimedOut` on Windows.
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => FrameError::TimedOut,
            _ => FrameError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
