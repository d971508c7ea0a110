//! # Hanabi Sim
//!
//! The fireworks simulation core.
//!
//! This crate provides the CPU-side show engine:
//! - Pooled particle records (stars, sparks, burst flashes)
//! - Burst geometry with near-uniform angular density
//! - The shell model: eleven firework variants, launch and burst
//! - The fixed-gravity integrator run once per frame tick
//! - The show sequencer and pause-safe show runner
//! - Narrow traits for the external renderer, sound player and glyph
//!   rasterizer
//!
//! Rendering, audio playback and input decoding live in the host; the core
//! only produces frame samples and queued sound cues.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod effects;
pub mod geometry;
pub mod particle;
pub mod render;
pub mod sequencer;
pub mod shell;
pub mod show;
pub mod simulation;
pub mod sky;
pub mod sound;
pub mod words;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::geometry::*;
    pub use crate::particle::*;
    pub use crate::render::*;
    pub use crate::sequencer::*;
    pub use crate::shell::*;
    pub use crate::show::*;
    pub use crate::simulation::*;
    pub use crate::sky::*;
    pub use crate::sound::*;
    pub use crate::words::*;
    pub use hanabi_common::prelude::*;
}

pub use prelude::*;
