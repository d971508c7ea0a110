//! # Hanabi Common
//!
//! Common types and utilities for the Hanabi fireworks simulation.
//!
//! This crate provides foundational types used across all Hanabi subsystems:
//! - The fixed particle color palette and weighted color selection
//! - Shell kind vocabulary (the eleven firework variants)
//! - Show configuration (quality, sizing, feature toggles)
//! - Common error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod config;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::config::*;
    pub use crate::error::*;
}

pub use prelude::*;
