//! Connect to a staging server and request one stage.
//!
//! Run with:
//!   cargo run --example fetch-stage -- [HOST] [PORT] [ARCH]
//!
//! Defaults to 127.0.0.1 2222 x64, which matches the `stage-server` example.

use stagewire::session::{Session, StageRequest};
use tracing::level_filters::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(LevelFilter::DEBUG)
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = match args.next() {
        Some(port) => port.parse()?,
        None => 2222,
    };
    let arch = args.next().unwrap_or_else(|| "x64".to_string());

    let mut session = Session::new();
    session.connect(&host, port)?;

    let stage = session.get_stage_with(&StageRequest::new(arch))?;
    tracing::info!(size = stage.len(), "stage received");
    println!("{stage:?}");

    Ok(())
}
