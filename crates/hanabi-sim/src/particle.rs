//! Pooled particle records: stars, sparks and burst flashes.
//!
//! Stars and sparks are recycled through free lists so steady-state shows
//! allocate nothing per frame. Live particles are bucketed by color so the
//! renderer can batch each color into a single stroke pass.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use hanabi_common::color::ParticleColor;

use crate::shell::Shell;

/// Air drag applied to regular stars each scaled step.
pub const STAR_AIR_DRAG: f32 = 0.98;

/// Air drag applied to heavy stars (rising comets).
pub const STAR_AIR_DRAG_HEAVY: f32 = 0.992;

/// Air drag applied to sparks.
pub const SPARK_AIR_DRAG: f32 = 0.9;

/// Shared once-only latch for burst-wide sound cues.
///
/// All stars of a crossette or crackle burst share one guard; whichever star
/// dies first flips it and plays the cue, the rest stay silent.
pub type CueGuard = Rc<Cell<bool>>;

/// What happens when a star's life runs out.
#[derive(Debug, Clone, Default)]
pub enum DeathAction {
    /// Nothing; the star is just recycled.
    #[default]
    None,
    /// The star is a rising comet carrying a shell; burst it here.
    Burst(Box<Shell>),
    /// Split into four crossing stars.
    Crossette(CueGuard),
    /// Pop into a ring of golden crackle sparks.
    Crackle(CueGuard),
    /// Bloom into a small secondary flower.
    Floral,
    /// Scatter a handful of slow golden leaves.
    FallingLeaves,
}

/// A single firework star.
///
/// Fields are public plain data; the pool resets every one of them on reuse
/// so no stale state can leak between incarnations.
#[derive(Debug, Clone)]
pub struct Star {
    /// Current position.
    pub pos: Vec2,
    /// Position at the previous step, for motion-trail strokes.
    pub prev_pos: Vec2,
    /// Velocity in units per scaled step.
    pub vel: Vec2,
    /// Remaining life in milliseconds of simulation time.
    pub life: f32,
    /// Life at spawn, for age-dependent spark emission.
    pub full_life: f32,
    /// Current color bucket.
    pub color: ParticleColor,
    /// Color to switch to partway through life, if any.
    pub second_color: Option<ParticleColor>,
    /// Remaining life at which the color switch (or strobing) begins.
    pub transition_time: f32,
    /// Set once the one-shot color switch has happened.
    pub color_changed: bool,
    /// Stroke width.
    pub size: f32,
    /// Whether the star is drawn this frame (strobing toggles this).
    pub visible: bool,
    /// Heavy stars use the gentler drag coefficient.
    pub heavy: bool,
    /// Amplitude of the wobble applied to rising comets; zero disables it.
    pub spin_radius: f32,
    /// Wobble angular speed per scaled step.
    pub spin_speed: f32,
    /// Current wobble phase.
    pub spin_angle: f32,
    /// Whether the star strobes after its transition time.
    pub strobe: bool,
    /// Strobe period in milliseconds.
    pub strobe_freq: f32,
    /// Spark emission period in milliseconds; zero disables emission.
    pub spark_freq: f32,
    /// Speed of emitted sparks.
    pub spark_speed: f32,
    /// Base life of emitted sparks in milliseconds.
    pub spark_life: f32,
    /// Fractional life variation of emitted sparks.
    pub spark_life_variation: f32,
    /// Color of emitted sparks.
    pub spark_color: ParticleColor,
    /// Countdown until the next spark is emitted.
    pub spark_timer: f32,
    /// Action performed when life reaches zero.
    pub death: DeathAction,
}

/// Spawn parameters for a star.
///
/// Velocity is derived from a polar angle and speed: `angle` of pi points
/// straight up (screen y grows downward), plus an optional carried offset.
#[derive(Debug, Clone, Copy)]
pub struct StarSeed {
    /// Spawn position.
    pub pos: Vec2,
    /// Color bucket.
    pub color: ParticleColor,
    /// Launch angle in radians.
    pub angle: f32,
    /// Launch speed.
    pub speed: f32,
    /// Life in milliseconds.
    pub life: f32,
    /// Velocity carried over from a parent star.
    pub vel_offset: Vec2,
    /// Stroke width.
    pub size: f32,
}

impl Default for StarSeed {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            color: ParticleColor::White,
            angle: 0.0,
            speed: 0.0,
            life: 0.0,
            vel_offset: Vec2::ZERO,
            size: 3.0,
        }
    }
}

/// Position, velocity and color of a star at the moment it died.
///
/// Returned alongside the death action so the caller can execute the action
/// without holding a borrow into the pool.
#[derive(Debug, Clone, Copy)]
pub struct StarSnapshot {
    /// Final position.
    pub pos: Vec2,
    /// Final velocity.
    pub vel: Vec2,
    /// Final color.
    pub color: ParticleColor,
}

/// Recycling pool of stars, bucketed by color.
#[derive(Debug, Default)]
pub struct StarPool {
    active: [Vec<Star>; ParticleColor::COUNT],
    free: Vec<Star>,
}

impl StarPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a star from a seed, reusing a recycled record when available.
    ///
    /// Returns a mutable reference so the caller can layer on glitter,
    /// strobing, transitions or a death action.
    pub fn add(&mut self, seed: StarSeed) -> &mut Star {
        let vel = Vec2::new(seed.angle.sin() * seed.speed, seed.angle.cos() * seed.speed)
            + seed.vel_offset;
        let mut star = self.free.pop().unwrap_or_else(|| Star {
            pos: Vec2::ZERO,
            prev_pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            life: 0.0,
            full_life: 0.0,
            color: ParticleColor::White,
            second_color: None,
            transition_time: 0.0,
            color_changed: false,
            size: 0.0,
            visible: true,
            heavy: false,
            spin_radius: 0.0,
            spin_speed: 0.8,
            spin_angle: 0.0,
            strobe: false,
            strobe_freq: 0.0,
            spark_freq: 0.0,
            spark_speed: 1.0,
            spark_life: 750.0,
            spark_life_variation: 0.25,
            spark_color: ParticleColor::White,
            spark_timer: 0.0,
            death: DeathAction::None,
        });
        star.pos = seed.pos;
        star.prev_pos = seed.pos;
        star.vel = vel;
        star.life = seed.life;
        star.full_life = seed.life;
        star.color = seed.color;
        star.second_color = None;
        star.transition_time = 0.0;
        star.color_changed = false;
        star.size = seed.size;
        star.visible = true;
        star.heavy = false;
        star.spin_radius = 0.0;
        star.spin_speed = 0.8;
        star.spin_angle = 0.0;
        star.strobe = false;
        star.strobe_freq = 0.0;
        star.spark_freq = 0.0;
        star.spark_speed = 1.0;
        star.spark_life = 750.0;
        star.spark_life_variation = 0.25;
        star.spark_color = seed.color;
        star.spark_timer = 0.0;
        star.death = DeathAction::None;
        let bucket = &mut self.active[seed.color.index()];
        bucket.push(star);
        bucket
            .last_mut()
            .expect("bucket cannot be empty right after push")
    }

    /// Retires a star, returning its death action and final state.
    ///
    /// Taking the star by value guarantees it cannot be released twice.
    pub fn release(&mut self, mut star: Star) -> (DeathAction, StarSnapshot) {
        let action = std::mem::take(&mut star.death);
        let snap = StarSnapshot {
            pos: star.pos,
            vel: star.vel,
            color: star.color,
        };
        self.free.push(star);
        (action, snap)
    }

    /// Detaches a color bucket for iteration without borrowing the pool.
    pub fn take_bucket(&mut self, color_index: usize) -> Vec<Star> {
        std::mem::take(&mut self.active[color_index])
    }

    /// Reattaches a bucket taken with [`StarPool::take_bucket`].
    pub fn put_bucket(&mut self, color_index: usize, bucket: Vec<Star>) {
        self.active[color_index] = bucket;
    }

    /// Files a live star into the bucket matching its current color.
    ///
    /// Used after a mid-life color switch so the star lands in its new
    /// bucket without being re-integrated this step.
    pub fn adopt(&mut self, star: Star) {
        self.active[star.color.index()].push(star);
    }

    /// Number of live stars across all buckets.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.active.iter().map(Vec::len).sum()
    }

    /// Iterates over all live stars.
    pub fn iter(&self) -> impl Iterator<Item = &Star> {
        self.active.iter().flatten()
    }

    /// Live stars of a single color bucket.
    #[must_use]
    pub fn bucket(&self, color_index: usize) -> &[Star] {
        &self.active[color_index]
    }
}

/// A glitter spark: a short-lived streak with no behavior of its own.
#[derive(Debug, Clone)]
pub struct Spark {
    /// Current position.
    pub pos: Vec2,
    /// Position at the previous step.
    pub prev_pos: Vec2,
    /// Velocity in units per scaled step.
    pub vel: Vec2,
    /// Color bucket.
    pub color: ParticleColor,
    /// Remaining life in milliseconds.
    pub life: f32,
}

/// Recycling pool of sparks, bucketed by color.
#[derive(Debug, Default)]
pub struct SparkPool {
    active: [Vec<Spark>; ParticleColor::COUNT],
    free: Vec<Spark>,
}

impl SparkPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a spark from polar launch parameters.
    pub fn add(&mut self, pos: Vec2, color: ParticleColor, angle: f32, speed: f32, life: f32) {
        let mut spark = self.free.pop().unwrap_or(Spark {
            pos: Vec2::ZERO,
            prev_pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            color: ParticleColor::White,
            life: 0.0,
        });
        spark.pos = pos;
        spark.prev_pos = pos;
        spark.vel = Vec2::new(angle.sin() * speed, angle.cos() * speed);
        spark.color = color;
        spark.life = life;
        self.active[color.index()].push(spark);
    }

    /// Retires a spark.
    pub fn release(&mut self, spark: Spark) {
        self.free.push(spark);
    }

    /// Detaches a color bucket for iteration.
    pub fn take_bucket(&mut self, color_index: usize) -> Vec<Spark> {
        std::mem::take(&mut self.active[color_index])
    }

    /// Reattaches a bucket taken with [`SparkPool::take_bucket`].
    pub fn put_bucket(&mut self, color_index: usize, bucket: Vec<Spark>) {
        self.active[color_index] = bucket;
    }

    /// Number of live sparks across all buckets.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.active.iter().map(Vec::len).sum()
    }

    /// Iterates over all live sparks.
    pub fn iter(&self) -> impl Iterator<Item = &Spark> {
        self.active.iter().flatten()
    }

    /// Live sparks of a single color bucket.
    #[must_use]
    pub fn bucket(&self, color_index: usize) -> &[Spark] {
        &self.active[color_index]
    }
}

/// A short-lived burst flash, drawn as a translucent disc for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Flash {
    /// Center of the flash.
    pub pos: Vec2,
    /// Radius of the disc.
    pub radius: f32,
}
