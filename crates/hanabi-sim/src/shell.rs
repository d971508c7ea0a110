//! Shell recipes: the parameter sets behind each firework variant.
//!
//! A [`ShellRecipe`] is pure data describing a burst; the builders in this
//! module roll the randomized variants the show launches. The simulation
//! turns a recipe into particles at burst time.

use fastrand::Rng;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use hanabi_common::color::{ColorOptions, ColorPicker, ShellColors};
use hanabi_common::config::{Quality, ShellKind, ShellSelection, ShowConfig};
use hanabi_common::prelude::ParticleColor;

/// Glitter intensity classes.
///
/// Each class maps to an emission spec; frequency scales with quality so
/// low-end machines emit fewer sparks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlitterClass {
    /// Sparse, slow shimmer.
    Light,
    /// Moderate shimmer.
    Medium,
    /// Dense, fast shimmer.
    Heavy,
    /// Very dense trails, used by palm fronds.
    Thick,
    /// Long fast streamers.
    Streamer,
    /// Slow-settling willow trails.
    Willow,
}

/// Resolved glitter emission parameters.
#[derive(Debug, Clone, Copy)]
pub struct GlitterSpec {
    /// Emission period in milliseconds.
    pub freq: f32,
    /// Spark launch speed.
    pub speed: f32,
    /// Base spark life in milliseconds.
    pub life: f32,
    /// Fractional life variation.
    pub life_variation: f32,
}

impl GlitterClass {
    /// Resolves the class into emission parameters for a quality level.
    #[must_use]
    pub fn spec(self, quality: Quality) -> GlitterSpec {
        let (freq, speed, life, life_variation) = match self {
            Self::Light => (400.0, 0.3, 300.0, 2.0),
            Self::Medium => (200.0, 0.44, 700.0, 2.0),
            Self::Heavy => (80.0, 0.8, 1400.0, 2.0),
            Self::Thick => (
                16.0,
                if quality.is_high() { 1.65 } else { 1.5 },
                1400.0,
                3.0,
            ),
            Self::Streamer => (32.0, 1.05, 620.0, 2.0),
            Self::Willow => (120.0, 0.34, 1400.0, 3.8),
        };
        GlitterSpec {
            freq: freq / quality.factor(),
            speed,
            life,
            life_variation,
        }
    }
}

/// Everything that defines one firework burst.
#[derive(Debug, Clone)]
pub struct ShellRecipe {
    /// Caliber of the shell, drives launch height and sound intensity.
    pub shell_size: f32,
    /// Diameter of the burst in stage units.
    pub spread_size: f32,
    /// Base star life in milliseconds.
    pub star_life: f32,
    /// Fractional star life variation.
    pub star_life_variation: f32,
    /// Explicit star count; derived from spread and density when `None`.
    pub star_count: Option<f32>,
    /// Density multiplier for the derived star count.
    pub star_density: f32,
    /// How burst colors are assigned.
    pub colors: ShellColors,
    /// Mid-life color the stars transition to, if any.
    pub second_color: Option<ParticleColor>,
    /// Glitter class for star trails, if any.
    pub glitter: Option<GlitterClass>,
    /// Color of emitted glitter sparks.
    pub glitter_color: ParticleColor,
    /// Whether a small inner pistil burst accompanies the main one.
    pub pistil: bool,
    /// Pistil color; picked against the main color when `None`.
    pub pistil_color: Option<ParticleColor>,
    /// Whether white streamer stars ride along the burst.
    pub streamers: bool,
    /// Whether stars strobe after their transition time.
    pub strobe: bool,
    /// Color flashed while strobing; the base color when `None`.
    pub strobe_color: Option<ParticleColor>,
    /// Burst into a squashed planar ring instead of a sphere.
    pub ring: bool,
    /// Stars split into four crossing stars on death.
    pub crossette: bool,
    /// Stars bloom into small secondary flowers on death.
    pub floral: bool,
    /// Stars scatter golden leaves on death.
    pub falling_leaves: bool,
    /// Stars pop into crackle sparks on death.
    pub crackle: bool,
    /// Burst stars inherit the comet velocity instead of a symmetric kick.
    pub horsetail: bool,
    /// Suppress the occasional word overlay for this shell.
    pub disable_word: bool,
}

impl Default for ShellRecipe {
    fn default() -> Self {
        Self {
            shell_size: 1.0,
            spread_size: 300.0,
            star_life: 900.0,
            star_life_variation: 0.125,
            star_count: None,
            star_density: 1.0,
            colors: ShellColors::Random,
            second_color: None,
            glitter: None,
            glitter_color: ParticleColor::White,
            pistil: false,
            pistil_color: None,
            streamers: false,
            strobe: false,
            strobe_color: None,
            ring: false,
            crossette: false,
            floral: false,
            falling_leaves: false,
            crackle: false,
            horsetail: false,
            disable_word: false,
        }
    }
}

impl ShellRecipe {
    /// Number of stars the burst spawns.
    ///
    /// Derived from the burst area when not set explicitly, floored so tiny
    /// shells still read as bursts.
    #[must_use]
    pub fn star_count(&self) -> f32 {
        self.star_count.unwrap_or_else(|| {
            let per_unit = self.spread_size / 54.0;
            (per_unit * per_unit * self.star_density).max(6.0)
        })
    }
}

/// A shell in flight or about to burst.
///
/// `comet_vel` is set once the carrying comet dies so horsetail bursts can
/// inherit its velocity; a shell burst directly in the sky has none.
#[derive(Debug, Clone)]
pub struct Shell {
    /// The burst this shell produces.
    pub recipe: ShellRecipe,
    /// Velocity of the comet at burst time.
    pub comet_vel: Option<Vec2>,
}

impl Shell {
    /// Wraps a recipe for launch.
    #[must_use]
    pub fn new(recipe: ShellRecipe) -> Self {
        Self {
            recipe,
            comet_vel: None,
        }
    }
}

/// Shared inputs for recipe builders.
pub struct RecipeContext<'a> {
    /// Random source for this roll.
    pub rng: &'a mut Rng,
    /// Stateful color picker, remembers the last color dealt.
    pub colors: &'a mut ColorPicker,
    /// Show settings; quality and shell size feed several recipes.
    pub config: &'a ShowConfig,
}

/// Classic spherical peony burst; the workhorse shell.
pub fn crysanthemum(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let glitter = ctx.rng.f32() < 0.25;
    let single = if ctx.rng.f32() < 0.72 {
        Some(ctx.colors.random(
            ctx.rng,
            ColorOptions {
                limit_white: true,
                ..Default::default()
            },
        ))
    } else {
        None
    };
    let colors = single.map_or_else(
        || {
            ShellColors::Pair(
                ctx.colors.random(ctx.rng, ColorOptions::default()),
                ctx.colors.random(
                    ctx.rng,
                    ColorOptions {
                        not_same: true,
                        ..Default::default()
                    },
                ),
            )
        },
        ShellColors::Single,
    );
    let pistil = single.is_some() && ctx.rng.f32() < 0.42;
    let pistil_color = match (pistil, single) {
        (true, Some(color)) => Some(ctx.colors.pistil_color(ctx.rng, color)),
        _ => None,
    };
    let second_color = if single.is_some()
        && (ctx.rng.f32() < 0.2 || single == Some(ParticleColor::White))
    {
        Some(pistil_color.unwrap_or_else(|| {
            ctx.colors.random(
                ctx.rng,
                ColorOptions {
                    not_color: single,
                    limit_white: true,
                    ..Default::default()
                },
            )
        }))
    } else {
        None
    };
    let streamers =
        !pistil && single != Some(ParticleColor::White) && ctx.rng.f32() < 0.42;
    let mut star_density = if glitter { 1.1 } else { 1.25 };
    if ctx.config.quality.is_low() {
        star_density *= 0.8;
    }
    if ctx.config.quality.is_high() {
        star_density = 1.2;
    }
    ShellRecipe {
        shell_size: size,
        spread_size: 300.0 + size * 100.0,
        star_life: 900.0 + size * 200.0,
        star_density,
        colors,
        second_color,
        glitter: glitter.then_some(GlitterClass::Light),
        glitter_color: ColorPicker::white_or_gold(ctx.rng),
        pistil,
        pistil_color,
        streamers,
        ..Default::default()
    }
}

/// A crysanthemum of invisible stars that reveal a color mid-flight.
pub fn ghost(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let mut recipe = crysanthemum(ctx, size);
    recipe.star_life *= 1.5;
    recipe.streamers = true;
    recipe.colors = ShellColors::Single(ParticleColor::Invisible);
    recipe.second_color = Some(ctx.colors.random(
        ctx.rng,
        ColorOptions {
            not_color: Some(ParticleColor::White),
            ..Default::default()
        },
    ));
    recipe.glitter = None;
    recipe
}

/// Stars that blink in and out after a quiet onset.
pub fn strobe(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let color = ctx.colors.random(
        ctx.rng,
        ColorOptions {
            limit_white: true,
            ..Default::default()
        },
    );
    ShellRecipe {
        shell_size: size,
        spread_size: 280.0 + size * 92.0,
        star_life: 1100.0 + size * 200.0,
        star_life_variation: 0.4,
        star_density: 1.1,
        colors: ShellColors::Single(color),
        glitter: Some(GlitterClass::Light),
        glitter_color: ParticleColor::White,
        strobe: true,
        strobe_color: (ctx.rng.f32() < 0.5).then_some(ParticleColor::White),
        pistil: ctx.rng.f32() < 0.5,
        pistil_color: Some(ctx.colors.pistil_color(ctx.rng, color)),
        ..Default::default()
    }
}

/// Few heavy stars with thick trails, drooping like palm fronds.
pub fn palm(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let color = ctx.colors.random(ctx.rng, ColorOptions::default());
    let thick = ctx.rng.f32() < 0.5;
    ShellRecipe {
        shell_size: size,
        spread_size: 250.0 + size * 75.0,
        star_density: if thick { 0.15 } else { 0.4 },
        star_life: 1800.0 + size * 200.0,
        colors: ShellColors::Single(color),
        glitter: Some(if thick {
            GlitterClass::Thick
        } else {
            GlitterClass::Heavy
        }),
        glitter_color: color,
        ..Default::default()
    }
}

/// A flat ring burst, squashed at a random orientation.
pub fn ring(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let color = ctx.colors.random(ctx.rng, ColorOptions::default());
    let pistil = ctx.rng.f32() < 0.75;
    ShellRecipe {
        shell_size: size,
        spread_size: 300.0 + size * 100.0,
        star_life: 900.0 + size * 200.0,
        star_count: Some(2.2 * std::f32::consts::TAU * (size + 1.0)),
        colors: ShellColors::Single(color),
        ring: true,
        pistil,
        pistil_color: Some(ctx.colors.pistil_color(ctx.rng, color)),
        glitter: (!pistil).then_some(GlitterClass::Light),
        glitter_color: if color == ParticleColor::Gold {
            ParticleColor::Gold
        } else {
            ParticleColor::White
        },
        streamers: ctx.rng.f32() < 0.3,
        ..Default::default()
    }
}

/// Stars that split into four crossing stars at the end of their life.
pub fn crossette(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let color = ctx.colors.random(
        ctx.rng,
        ColorOptions {
            limit_white: true,
            ..Default::default()
        },
    );
    ShellRecipe {
        shell_size: size,
        spread_size: 300.0 + size * 100.0,
        star_life: 750.0 + size * 160.0,
        star_life_variation: 0.4,
        star_density: 0.85,
        colors: ShellColors::Single(color),
        crossette: true,
        pistil: ctx.rng.f32() < 0.5,
        pistil_color: Some(ctx.colors.pistil_color(ctx.rng, color)),
        ..Default::default()
    }
}

/// Sparse stars that each bloom into a small flower.
pub fn floral(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let colors = if ctx.rng.f32() < 0.65 {
        ShellColors::Random
    } else if ctx.rng.f32() < 0.15 {
        ShellColors::Single(ctx.colors.random(ctx.rng, ColorOptions::default()))
    } else {
        ShellColors::Pair(
            ctx.colors.random(ctx.rng, ColorOptions::default()),
            ctx.colors.random(
                ctx.rng,
                ColorOptions {
                    not_same: true,
                    ..Default::default()
                },
            ),
        )
    };
    ShellRecipe {
        shell_size: size,
        spread_size: 300.0 + size * 120.0,
        star_density: 0.12,
        star_life: 500.0 + size * 50.0,
        star_life_variation: 0.5,
        colors,
        floral: true,
        ..Default::default()
    }
}

/// Invisible stars that scatter into slow golden leaves.
pub fn falling_leaves(_ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    ShellRecipe {
        shell_size: size,
        spread_size: 300.0 + size * 120.0,
        star_density: 0.12,
        star_life: 500.0 + size * 50.0,
        star_life_variation: 0.5,
        colors: ShellColors::Single(ParticleColor::Invisible),
        falling_leaves: true,
        glitter: Some(GlitterClass::Medium),
        glitter_color: ParticleColor::Gold,
        ..Default::default()
    }
}

/// Long-lived invisible stars trailing drooping golden willow branches.
pub fn willow(_ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    ShellRecipe {
        shell_size: size,
        spread_size: 300.0 + size * 100.0,
        star_density: 0.6,
        star_life: 3000.0 + size * 300.0,
        colors: ShellColors::Single(ParticleColor::Invisible),
        glitter: Some(GlitterClass::Willow),
        glitter_color: ParticleColor::Gold,
        ..Default::default()
    }
}

/// Stars that pop into golden crackle at the end of their life.
pub fn crackle(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let color = if ctx.rng.f32() < 0.75 {
        ParticleColor::Gold
    } else {
        ctx.colors.random(ctx.rng, ColorOptions::default())
    };
    ShellRecipe {
        shell_size: size,
        spread_size: 380.0 + size * 75.0,
        star_density: if ctx.config.quality.is_low() { 0.65 } else { 1.0 },
        star_life: 600.0 + size * 100.0,
        star_life_variation: 0.32,
        colors: ShellColors::Single(color),
        glitter: Some(GlitterClass::Light),
        glitter_color: ParticleColor::Gold,
        crackle: true,
        pistil: ctx.rng.f32() < 0.65,
        pistil_color: Some(ctx.colors.pistil_color(ctx.rng, color)),
        ..Default::default()
    }
}

/// A narrow column burst inheriting the comet's velocity.
pub fn horsetail(ctx: &mut RecipeContext<'_>, size: f32) -> ShellRecipe {
    let color = ctx.colors.random(ctx.rng, ColorOptions::default());
    ShellRecipe {
        shell_size: size,
        spread_size: 250.0 + size * 38.0,
        star_density: 0.9,
        star_life: 2500.0 + size * 300.0,
        colors: ShellColors::Single(color),
        horsetail: true,
        glitter: Some(GlitterClass::Medium),
        glitter_color: if ctx.rng.f32() < 0.5 {
            ColorPicker::white_or_gold(ctx.rng)
        } else {
            color
        },
        strobe: color == ParticleColor::White,
        ..Default::default()
    }
}

/// Builds the recipe for a kind at the given size.
pub fn build(ctx: &mut RecipeContext<'_>, kind: ShellKind, size: f32) -> ShellRecipe {
    match kind {
        ShellKind::Crysanthemum => crysanthemum(ctx, size),
        ShellKind::Ghost => ghost(ctx, size),
        ShellKind::Strobe => strobe(ctx, size),
        ShellKind::Palm => palm(ctx, size),
        ShellKind::Ring => ring(ctx, size),
        ShellKind::Crossette => crossette(ctx, size),
        ShellKind::Floral => floral(ctx, size),
        ShellKind::FallingLeaves => falling_leaves(ctx, size),
        ShellKind::Willow => willow(ctx, size),
        ShellKind::Crackle => crackle(ctx, size),
        ShellKind::Horsetail => horsetail(ctx, size),
    }
}

/// Picks a random kind, weighted toward the classic crysanthemum.
pub fn random_kind(rng: &mut Rng) -> ShellKind {
    if rng.f32() < 0.5 {
        ShellKind::Crysanthemum
    } else {
        ShellKind::ALL[rng.usize(0..ShellKind::ALL.len())]
    }
}

/// Picks a random kind excluding the slow-settling variants.
///
/// Used for rapid-fire sequences where lingering trails would pile up.
pub fn random_fast_kind(rng: &mut Rng) -> ShellKind {
    let mut kind = random_kind(rng);
    while kind.is_slow_settling() {
        kind = random_kind(rng);
    }
    kind
}

/// Resolves the configured selection into a kind for one launch.
pub fn kind_for_launch(rng: &mut Rng, selection: ShellSelection) -> ShellKind {
    match selection {
        ShellSelection::Random => random_kind(rng),
        ShellSelection::Named(kind) => kind,
    }
}
