//! Firework color palette and weighted color selection.
//!
//! The show uses a small closed palette; every live particle is keyed by one
//! of these colors, so the palette doubles as the index space for the
//! color-keyed particle collections.

use serde::{Deserialize, Serialize};

/// A color from the fixed show palette.
///
/// `Invisible` is a real palette entry, not an absence: invisible stars still
/// move, emit sparks and die, they just draw nothing themselves. It sits last
/// in [`ParticleColor::ALL`] so collections can treat it as the trailing
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleColor {
    /// Intense red (#ff0043).
    Red,
    /// Bright green (#14fc56).
    Green,
    /// Sky blue (#1e7fff).
    Blue,
    /// Vivid purple (#e60aff).
    Purple,
    /// Warm gold (#ffbf36).
    Gold,
    /// Pure white (#ffffff).
    White,
    /// Draws nothing; used for ghost trails and falling-leaves stars.
    Invisible,
}

impl ParticleColor {
    /// Number of palette entries, including `Invisible`.
    pub const COUNT: usize = 7;

    /// Every palette entry, `Invisible` last.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Gold,
        Self::White,
        Self::Invisible,
    ];

    /// The visible palette entries, i.e. everything a random pick may return.
    pub const VISIBLE: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Gold,
        Self::White,
    ];

    /// Bucket index for color-keyed collections.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// RGB components. `Invisible` reports black.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (0xff, 0x00, 0x43),
            Self::Green => (0x14, 0xfc, 0x56),
            Self::Blue => (0x1e, 0x7f, 0xff),
            Self::Purple => (0xe6, 0x0a, 0xff),
            Self::Gold => (0xff, 0xbf, 0x36),
            Self::White => (0xff, 0xff, 0xff),
            Self::Invisible => (0x00, 0x00, 0x00),
        }
    }

    /// Whether this entry draws nothing.
    #[must_use]
    pub const fn is_invisible(self) -> bool {
        matches!(self, Self::Invisible)
    }
}

/// Options for a weighted random color pick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorOptions {
    /// Never return the previously picked color.
    pub not_same: bool,
    /// Never return this specific color.
    pub not_color: Option<ParticleColor>,
    /// Reroll white 60% of the time (white washes out multi-shell scenes).
    pub limit_white: bool,
}

/// Stateful color picker.
///
/// Remembers the last picked color so `not_same` picks can avoid immediate
/// repeats across independent call sites, matching how a human operator would
/// vary a show.
#[derive(Debug, Default)]
pub struct ColorPicker {
    last: Option<ParticleColor>,
}

impl ColorPicker {
    /// Create a picker with no pick history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn simple(rng: &mut fastrand::Rng) -> ParticleColor {
        ParticleColor::VISIBLE[rng.usize(0..ParticleColor::VISIBLE.len())]
    }

    /// Pick a random visible color subject to `options`.
    pub fn random(&mut self, rng: &mut fastrand::Rng, options: ColorOptions) -> ParticleColor {
        let mut color = Self::simple(rng);

        if options.limit_white && color == ParticleColor::White && rng.f32() < 0.6 {
            color = Self::simple(rng);
        }
        if options.not_same {
            while Some(color) == self.last {
                color = Self::simple(rng);
            }
        } else if let Some(avoid) = options.not_color {
            while color == avoid {
                color = Self::simple(rng);
            }
        }

        self.last = Some(color);
        color
    }

    /// Pick a random visible color with no constraints.
    pub fn any(&mut self, rng: &mut fastrand::Rng) -> ParticleColor {
        self.random(rng, ColorOptions::default())
    }

    /// Coin flip between gold and white, the classic glitter colors.
    pub fn white_or_gold(rng: &mut fastrand::Rng) -> ParticleColor {
        if rng.f32() < 0.5 {
            ParticleColor::Gold
        } else {
            ParticleColor::White
        }
    }

    /// Pick a pistil color that contrasts with the outer shell color.
    pub fn pistil_color(
        &mut self,
        rng: &mut fastrand::Rng,
        shell_color: ParticleColor,
    ) -> ParticleColor {
        if shell_color == ParticleColor::White || shell_color == ParticleColor::Gold {
            self.random(
                rng,
                ColorOptions {
                    not_color: Some(shell_color),
                    ..ColorOptions::default()
                },
            )
        } else {
            Self::white_or_gold(rng)
        }
    }
}

/// Color assignment of one shell's primary stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellColors {
    /// Every star shares one color.
    Single(ParticleColor),
    /// Stars split between two colors, either by half-arc or by count.
    Pair(ParticleColor, ParticleColor),
    /// Each star independently picks a random color at burst time.
    Random,
}

impl ShellColors {
    /// The color the launch comet should wear for this assignment.
    ///
    /// Multi-color and per-star-random shells launch on a white comet.
    #[must_use]
    pub const fn comet_color(self) -> ParticleColor {
        match self {
            Self::Single(color) => color,
            Self::Pair(..) | Self::Random => ParticleColor::White,
        }
    }
}
