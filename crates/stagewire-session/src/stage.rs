use std::io::{Read, Write};

use bytes::Bytes;
use stagewire_frame::{Frame, FrameReader, FrameWriter};
use tracing::debug;

use crate::error::{Result, SessionError};

/// Channel name requested when the caller does not pick one.
pub const DEFAULT_PIPENAME: &str = "beacon";

/// Blocking-timeout parameter sent when the caller does not pick one.
pub const DEFAULT_BLOCK: &str = "100";

const ARCH_KEY: &str = "arch";
const PIPENAME_KEY: &str = "pipename";
const BLOCK_KEY: &str = "block";
const GO: &[u8] = b"go";

/// Parameters for one stage request.
///
/// Values are sent verbatim as `key=value` text frames; nothing here
/// validates their content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRequest {
    /// Target architecture, e.g. `x86` or `x64`.
    pub arch: String,
    /// Channel name the staging server should associate with the stage.
    pub pipename: String,
    /// Blocking timeout in milliseconds, as text.
    pub block: String,
}

impl StageRequest {
    /// Request for `arch` with the default pipename and block values.
    pub fn new(arch: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            pipename: DEFAULT_PIPENAME.to_string(),
            block: DEFAULT_BLOCK.to_string(),
        }
    }

    pub fn with_pipename(mut self, pipename: impl Into<String>) -> Self {
        self.pipename = pipename.into();
        self
    }

    pub fn with_block(mut self, block: impl Into<String>) -> Self {
        self.block = block.into();
        self
    }

    /// The four request frames, in send order.
    pub fn frames(&self) -> [Frame; 4] {
        [
            option_frame(ARCH_KEY, &self.arch),
            option_frame(PIPENAME_KEY, &self.pipename),
            option_frame(BLOCK_KEY, &self.block),
            Frame::new(Bytes::from_static(GO)),
        ]
    }

    /// The four request frames, or `FrameTooLarge` if any of them exceeds
    /// `max_payload_size`.
    pub fn checked_frames(&self, max_payload_size: usize) -> Result<[Frame; 4]> {
        let frames = self.frames();
        if let Some(frame) = frames.iter().find(|f| f.len() > max_payload_size) {
            return Err(SessionError::FrameTooLarge {
                size: frame.len(),
                max: max_payload_size,
            });
        }
        Ok(frames)
    }
}

fn option_frame(key: &str, value: &str) -> Frame {
    Frame::new(format!("{key}={value}"))
}

/// Send the four request frames, then read exactly one frame back.
///
/// Every frame is checked against the writer's size cap before the first
/// one is written. No acknowledgment is read between sends. The first
/// failure aborts the exchange; later frames are not sent and nothing is read.
pub fn request_stage<R: Read, W: Write>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    request: &StageRequest,
) -> Result<Frame> {
    let frames = request.checked_frames(writer.config().max_payload_size)?;
    exchange(reader, writer, request, &frames)
}

pub(crate) fn exchange<R: Read, W: Write>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    request: &StageRequest,
    frames: &[Frame; 4],
) -> Result<Frame> {
    debug!(
        arch = %request.arch,
        pipename = %request.pipename,
        block = %request.block,
        "requesting stage"
    );

    for (step, frame) in frames.iter().enumerate() {
        writer.write_frame(frame)?;
        debug!(step = step + 1, size = frame.len(), "stage request frame sent");
    }

    let stage = reader.read_frame()?;
    debug!(size = stage.len(), "stage received");
    Ok(stage)
}
