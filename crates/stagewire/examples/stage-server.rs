//! Minimal staging server — answers one stage request with a fixed blob.
//!
//! Run with:
//!   cargo run --example stage-server
//!
//! In another terminal:
//!   cargo run --example fetch-stage -- 127.0.0.1 2222 x64

use std::net::TcpListener;

use stagewire::frame::{FrameReader, FrameWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:2222")?;
    eprintln!("Listening on {}", listener.local_addr()?);

    let (stream, addr) = listener.accept()?;
    eprintln!("Client connected: {addr}");

    let mut reader = FrameReader::new(stream.try_clone()?);
    let mut writer = FrameWriter::new(stream);

    // Four option frames, ending with "go".
    loop {
        let frame = reader.read_frame()?;
        eprintln!("Received {}", String::from_utf8_lossy(frame.payload()));
        if frame.payload().as_ref() == b"go" {
            break;
        }
    }

    let stage: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
    writer.send(&stage)?;
    eprintln!("Sent {} byte stage", stage.len());
    Ok(())
}
