use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected TCP stream — implements Read + Write.
///
/// Owned exclusively by whoever dialed it. Use [`WireStream::try_clone`] to
/// split it into independent read and write halves.
pub struct WireStream {
    inner: TcpStream,
    peer: SocketAddr,
}

impl Read for WireStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for WireStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl WireStream {
    pub(crate) fn from_tcp(inner: TcpStream, peer: SocketAddr) -> Self {
        Self { inner, peer }
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Current read timeout of the underlying socket.
    pub fn read_timeout(&self) -> Result<Option<Duration>> {
        self.inner.read_timeout().map_err(Into::into)
    }

    /// Current write timeout of the underlying socket.
    pub fn write_timeout(&self) -> Result<Option<Duration>> {
        self.inner.write_timeout().map_err(Into::into)
    }

    /// Try to clone this stream (creates a new socket handle).
    ///
    /// Timeouts are a property of the socket, so the clone shares them.
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned, self.peer))
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl std::fmt::Debug for WireStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireStream")
            .field("type", &"tcp")
            .field("peer", &self.peer)
            .finish()
    }
}
