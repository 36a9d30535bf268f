use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

use stagewire_frame::{Frame, FrameConfig, FrameReader, FrameWriter, DEFAULT_MAX_PAYLOAD};
use stagewire_transport::{WireStream, DEFAULT_IO_TIMEOUT};
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::stage::{exchange, StageRequest};

/// Connection status of a [`Session`], driven by actual transport outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// `connect` has not been called yet.
    Unconnected,
    /// The last connect succeeded and no transport operation has failed since.
    Connected,
    /// A connect attempt or a send/receive failed. The stream is no longer
    /// trusted; `connect` may be called again.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Unconnected => "unconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Connect, read and write timeout. Default: 5 seconds.
    pub io_timeout: Duration,
    /// Largest frame accepted from, or sent to, the peer. Default: 16 MiB.
    pub max_frame_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            io_timeout: DEFAULT_IO_TIMEOUT,
            max_frame_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl SessionConfig {
    fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_frame_size,
            read_timeout: Some(self.io_timeout),
            write_timeout: Some(self.io_timeout),
        }
    }
}

/// A client session over one exclusively owned connection.
///
/// Sessions are meant for sequential use from one thread; use one session
/// per connection when concurrency is needed.
pub struct Session<R = WireStream, W = WireStream> {
    host: String,
    port: u16,
    state: ConnectionState,
    config: SessionConfig,
    reader: Option<FrameReader<R>>,
    writer: Option<FrameWriter<W>>,
    last_stage: Option<Frame>,
}

impl Session {
    /// Create an unconnected session with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create an unconnected session with explicit configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            host: String::new(),
            port: 0,
            state: ConnectionState::Unconnected,
            config,
            reader: None,
            writer: None,
            last_stage: None,
        }
    }

    /// Open a TCP connection to `host:port` (blocking).
    ///
    /// The configured I/O timeout bounds the connect itself and every later
    /// read and write on this session.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if self.state == ConnectionState::Connected {
            return Err(SessionError::AlreadyConnected);
        }

        match open(host, port, &self.config) {
            Ok((reader, writer)) => {
                let peer = writer.get_ref().peer_addr();
                self.reader = Some(reader);
                self.writer = Some(writer);
                self.host = host.to_string();
                self.port = port;
                self.state = ConnectionState::Connected;
                info!(host, port, %peer, "session connected");
                Ok(())
            }
            Err(err) => {
                self.reader = None;
                self.writer = None;
                Err(self.fail(err))
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn open(
    host: &str,
    port: u16,
    config: &SessionConfig,
) -> Result<(FrameReader<WireStream>, FrameWriter<WireStream>)> {
    let stream = stagewire_transport::connect_timeout(host, port, config.io_timeout)?;
    let reader_stream = stream.try_clone()?;

    let frame_config = config.frame_config();
    let reader = FrameReader::with_config_wire(reader_stream, frame_config.clone())
        .map_err(SessionError::Transport)?;
    let writer =
        FrameWriter::with_config_wire(stream, frame_config).map_err(SessionError::Transport)?;
    Ok((reader, writer))
}

impl<R: Read, W: Write> Session<R, W> {
    /// Build a connected session over an existing reader/writer pair.
    pub fn from_streams(reader: R, writer: W) -> Self {
        Self::from_streams_with_config(reader, writer, SessionConfig::default())
    }

    /// Build a connected session over an existing reader/writer pair.
    ///
    /// Only `max_frame_size` applies; timeouts are the streams' own business.
    pub fn from_streams_with_config(reader: R, writer: W, config: SessionConfig) -> Self {
        let frame_config = config.frame_config();
        Self {
            host: String::new(),
            port: 0,
            state: ConnectionState::Connected,
            reader: Some(FrameReader::with_config(reader, frame_config.clone())),
            writer: Some(FrameWriter::with_config(writer, frame_config)),
            config,
            last_stage: None,
        }
    }

    /// Whether the session is connected and no transport operation has failed.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Host passed to the last successful `connect`; empty before that.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port passed to the last successful `connect`; 0 before that.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The stage returned by the most recent successful `get_stage`.
    pub fn last_stage(&self) -> Option<&Frame> {
        self.last_stage.as_ref()
    }

    /// Send one frame: length prefix, then payload, both fully written.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let (_, writer) = self.io()?;
        match writer.write_frame(frame) {
            Ok(()) => Ok(()),
            // Rejected before anything reached the wire.
            Err(stagewire_frame::FrameError::PayloadTooLarge { size, max }) => {
                Err(SessionError::FrameTooLarge { size, max })
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Receive one complete frame (blocking).
    pub fn receive_frame(&mut self) -> Result<Frame> {
        let (reader, _) = self.io()?;
        match reader.read_frame() {
            Ok(frame) => Ok(frame),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Request a stage for `arch` with the default pipename and block values.
    pub fn get_stage(&mut self, arch: &str) -> Result<Frame> {
        self.get_stage_with(&StageRequest::new(arch))
    }

    /// Run the stage handshake and remember the result as the last stage.
    ///
    /// On failure the previous last stage is kept. A request frame over the
    /// size cap is rejected before anything is sent and leaves the session
    /// connected.
    pub fn get_stage_with(&mut self, request: &StageRequest) -> Result<Frame> {
        let (reader, writer) = self.io()?;
        let frames = request.checked_frames(writer.config().max_payload_size)?;
        match exchange(reader, writer, request, &frames) {
            Ok(stage) => {
                self.last_stage = Some(stage.clone());
                Ok(stage)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn io(&mut self) -> Result<(&mut FrameReader<R>, &mut FrameWriter<W>)> {
        match (self.state, self.reader.as_mut(), self.writer.as_mut()) {
            (ConnectionState::Connected, Some(reader), Some(writer)) => Ok((reader, writer)),
            (state, _, _) => Err(SessionError::NotConnected(state)),
        }
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        warn!(host = %self.host, port = self.port, error = %err, "session failed");
        self.state = ConnectionState::Failed;
        err
    }
}

impl<R, W> fmt::Debug for Session<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("last_stage", &self.last_stage)
            .finish()
    }
}
