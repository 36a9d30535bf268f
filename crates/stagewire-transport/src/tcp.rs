use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::WireStream;

/// Default timeout applied to connect, read and write operations.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to `host:port` (blocking).
///
/// Every resolved address is tried in order with `timeout` as the connect
/// deadline; the first one that accepts wins. The same `timeout` is then set
/// as the socket's read and write timeout.
pub fn connect_timeout(host: &str, port: u16, timeout: Duration) -> Result<WireStream> {
    let addrs: Vec<_> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                debug!(%addr, ?timeout, "connected to tcp peer");
                return Ok(WireStream::from_tcp(stream, addr));
            }
            Err(source) => {
                debug!(%addr, error = %source, "tcp connect attempt failed");
                last_err = Some(TransportError::Connect { addr, source });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| TransportError::NoAddress {
        host: host.to_string(),
        port,
    }))
}
