//! Error types for the Hanabi simulation.
//!
//! The error surface is deliberately narrow: missing optional collaborators
//! (audio, glyph rasterizer) degrade silently inside the core, and degenerate
//! geometry requests produce nothing rather than fault. Errors exist only at
//! the host-facing edges, where bad input should be rejected loudly.

use thiserror::Error;

/// Top-level error type for show operations.
#[derive(Debug, Error)]
pub enum ShowError {
    /// Host-supplied configuration is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A shell name did not match any known variant.
    #[error("unknown shell kind: {0:?}")]
    UnknownShell(String),

    /// The host asked for a stage the simulation cannot place shells in.
    #[error("degenerate stage size {width}x{height}")]
    DegenerateStage {
        /// Requested stage width.
        width: f32,
        /// Requested stage height.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShowError::UnknownShell("Sparkler".into());
        assert!(err.to_string().contains("Sparkler"));

        let err = ShowError::DegenerateStage {
            width: 0.0,
            height: -10.0,
        };
        assert!(err.to_string().contains("0x-10"));
    }
}
