use stagewire_frame::FrameError;
use stagewire_transport::TransportError;

use crate::session::ConnectionState;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// TCP resolution or connect failed.
    #[error("connection error: {0}")]
    Connection(#[from] TransportError),

    /// A send or receive failed: I/O error, timeout, or the peer closed the
    /// stream before a full frame was transferred.
    #[error("transport error: {0}")]
    Transport(FrameError),

    /// A frame exceeded the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The operation needs a connected session.
    #[error("session is not connected (state: {0})")]
    NotConnected(ConnectionState),

    /// `connect` was called on a session that is already connected.
    #[error("session is already connected")]
    AlreadyConnected,
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::PayloadTooLarge { size, max } => SessionError::FrameTooLarge { size, max },
            other => SessionError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_too_large_maps_to_frame_too_large() {
        let err = SessionError::from(FrameError::PayloadTooLarge { size: 10, max: 4 });
        assert!(matches!(err, SessionError::FrameTooLarge { size: 10, max: 4 }));
    }

    #[test]
    fn other_frame_errors_are_transport_errors() {
        let err = SessionError::from(FrameError::ConnectionClosed);
        assert!(matches!(
            err,
            SessionError::Transport(FrameError::ConnectionClosed)
        ));
        assert_eq!(
            err.to_string(),
            "transport error: connection closed (incomplete frame)"
        );
    }

    #[test]
    fn not_connected_names_state() {
        let err = SessionError::NotConnected(ConnectionState::Failed);
        assert_eq!(err.to_string(), "session is not connected (state: failed)");
    }
}
