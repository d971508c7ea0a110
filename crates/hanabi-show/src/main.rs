//! # Hanabi Show
//!
//! Headless runner for the fireworks simulation. Drives a [`hanabi_sim::Show`]
//! at a fixed 60 Hz tick, logging launches, bursts and particle counts.
//! Useful for profiling, soak testing and verifying configs without a
//! renderer attached.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("hanabi=info".parse()?))
        .init();

    info!("Hanabi starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    app::run()?;

    info!("Hanabi show complete");
    Ok(())
}
