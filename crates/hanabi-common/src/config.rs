//! Show configuration data model.
//!
//! This module provides:
//! - Quality tiers and their particle-count scaling
//! - Sky lighting levels
//! - The shell kind vocabulary and selection mode
//! - The flat [`ShowConfig`] the core reads each step and show action
//!
//! The core never persists configuration; the host loads/saves it and hands
//! the current value to the simulation.

use crate::error::ShowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering/simulation quality tier.
///
/// Quality scales particle counts and spark emission frequency, not physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Quality {
    /// Fewer stars, sparser spark trails.
    Low,
    /// Balanced default.
    #[default]
    Normal,
    /// Densest trails, extra crackle particles.
    High,
}

impl Quality {
    /// Numeric quality factor used as a spark-frequency divisor.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Low => 1.0,
            Self::Normal => 2.0,
            Self::High => 3.0,
        }
    }

    /// Whether this is the low tier.
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }

    /// Whether this is the high tier.
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

/// Ambient sky lighting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SkyLighting {
    /// Sky stays black.
    None,
    /// Subtle glow.
    Dim,
    /// Full glow.
    #[default]
    Normal,
}

impl SkyLighting {
    /// Maximum sky color saturation for this level.
    #[must_use]
    pub const fn saturation(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Dim => 15.0,
            Self::Normal => 30.0,
        }
    }
}

/// The eleven firework shell variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellKind {
    /// Default spherical burst, optionally with pistil or streamers.
    Crysanthemum,
    /// Invisible burst that fades into a color, always with streamers.
    Ghost,
    /// Blinking stars with a dense pistil bias.
    Strobe,
    /// Few long-lived stars with thick glitter trails, like palm fronds.
    Palm,
    /// Flat elliptical ring.
    Ring,
    /// Stars that split into four fragments at death.
    Crossette,
    /// Sparse fast stars that pop into secondary bursts.
    Floral,
    /// Invisible stars shedding dense gold trails.
    FallingLeaves,
    /// Very long-lived drooping gold trails.
    Willow,
    /// Mostly gold stars that crackle at death.
    Crackle,
    /// Stars inherit the comet's fall, forming one coherent tail.
    Horsetail,
}

impl ShellKind {
    /// Every shell kind, in menu order.
    pub const ALL: [Self; 11] = [
        Self::Crysanthemum,
        Self::Ghost,
        Self::Strobe,
        Self::Palm,
        Self::Ring,
        Self::Crossette,
        Self::Floral,
        Self::FallingLeaves,
        Self::Willow,
        Self::Crackle,
        Self::Horsetail,
    ];

    /// Kinds excluded from rapid sequencing (finale, barrage fillers):
    /// their stars settle too slowly for back-to-back launches.
    pub const SLOW_SETTLING: [Self; 3] = [Self::FallingLeaves, Self::Floral, Self::Willow];

    /// Display name, as shown in shell menus.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Crysanthemum => "Crysanthemum",
            Self::Ghost => "Ghost",
            Self::Strobe => "Strobe",
            Self::Palm => "Palm",
            Self::Ring => "Ring",
            Self::Crossette => "Crossette",
            Self::Floral => "Floral",
            Self::FallingLeaves => "Falling Leaves",
            Self::Willow => "Willow",
            Self::Crackle => "Crackle",
            Self::Horsetail => "Horse Tail",
        }
    }

    /// Whether this kind settles too slowly for rapid sequencing.
    #[must_use]
    pub fn is_slow_settling(self) -> bool {
        Self::SLOW_SETTLING.contains(&self)
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShellKind {
    type Err = ShowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ShowError::UnknownShell(s.to_owned()))
    }
}

/// Which shell the show fires for configured launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShellSelection {
    /// A weighted random kind per launch.
    #[default]
    Random,
    /// Always this kind.
    Named(ShellKind),
}

/// Largest supported shell size class.
pub const MAX_SHELL_SIZE: f32 = 5.0;

/// Flat show configuration, read by the core each step and show action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowConfig {
    /// Quality tier.
    pub quality: Quality,
    /// Shell selection for configured launches.
    pub shell: ShellSelection,
    /// Shell size class (0.0..=[`MAX_SHELL_SIZE`]); bigger bursts wider.
    pub shell_size: f32,
    /// Allow the rare dot-matrix word overlay on bursts.
    pub word_shells: bool,
    /// Let the sequencer fire shells automatically.
    pub auto_launch: bool,
    /// Finale mode: rapid capped volleys instead of the normal mix.
    pub finale: bool,
    /// Ambient sky glow level.
    pub sky_lighting: SkyLighting,
    /// Long-exposure trails (near-zero background fade).
    pub long_exposure: bool,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            quality: Quality::Normal,
            shell: ShellSelection::Random,
            shell_size: 3.0,
            word_shells: true,
            auto_launch: true,
            finale: false,
            sky_lighting: SkyLighting::Normal,
            long_exposure: false,
        }
    }
}

impl ShowConfig {
    /// Validate host-supplied configuration.
    pub fn validate(&self) -> Result<(), ShowError> {
        if !self.shell_size.is_finite() || self.shell_size < 0.0 || self.shell_size > MAX_SHELL_SIZE
        {
            return Err(ShowError::Config(format!(
                "shell_size {} out of range 0..={MAX_SHELL_SIZE}",
                self.shell_size
            )));
        }
        Ok(())
    }
}
