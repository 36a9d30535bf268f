use std::net::SocketAddr;

/// Errors that can occur while establishing or configuring a TCP transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host/port pair could not be resolved.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// Resolution succeeded but produced no usable address.
    #[error("no addresses found for {host}:{port}")]
    NoAddress { host: String, port: u16 },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
