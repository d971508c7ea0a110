//! Star-death effects: crossette splits, crackle pops, floral blooms and
//! falling leaves.
//!
//! Each effect spawns its particles at the dead star's snapshot. Crossette
//! and crackle bursts share a cue guard so only the first star of a burst
//! plays the sound.

use std::f32::consts::{FRAC_PI_2, TAU};

use fastrand::Rng;

use hanabi_common::color::ParticleColor;
use hanabi_common::config::Quality;

use crate::geometry::{arc_angles, burst_angles};
use crate::particle::{CueGuard, Flash, SparkPool, StarPool, StarSeed, StarSnapshot};
use crate::sound::{SoundCue, SoundQueue};

/// Split borrows of the simulation state an effect may touch.
pub struct EffectContext<'a> {
    /// Random source.
    pub rng: &'a mut Rng,
    /// Star pool for spawned stars.
    pub stars: &'a mut StarPool,
    /// Spark pool for spawned sparks.
    pub sparks: &'a mut SparkPool,
    /// Burst flashes to draw this frame.
    pub flashes: &'a mut Vec<Flash>,
    /// Cue queue.
    pub sounds: &'a mut SoundQueue,
    /// Show quality, scales particle counts.
    pub quality: Quality,
    /// Current simulation time in milliseconds.
    pub now_ms: f64,
}

fn fire_once(guard: &CueGuard, ctx: &mut EffectContext<'_>, cue: SoundCue, intensity: f32) {
    if !guard.get() {
        guard.set(true);
        ctx.sounds.play(cue, intensity, ctx.now_ms);
    }
}

/// Splits a dead crossette star into four crossing stars.
pub fn crossette(ctx: &mut EffectContext<'_>, snap: &StarSnapshot, guard: &CueGuard) {
    let start = ctx.rng.f32() * FRAC_PI_2;
    for angle in arc_angles(ctx.rng, start, TAU, 4.0, 0.5) {
        ctx.stars.add(StarSeed {
            pos: snap.pos,
            color: snap.color,
            angle,
            speed: ctx.rng.f32() * 0.6 + 0.75,
            life: 600.0,
            ..Default::default()
        });
    }
    fire_once(guard, ctx, SoundCue::CrackleSmall, 0.5);
}

/// Pops a dead crackle star into a ring of golden sparks.
pub fn crackle(ctx: &mut EffectContext<'_>, snap: &StarSnapshot, guard: &CueGuard) {
    let count = if ctx.quality.is_high() { 32.0 } else { 16.0 };
    for angle in arc_angles(ctx.rng, 0.0, TAU, count, 1.8) {
        ctx.sparks.add(
            snap.pos,
            ParticleColor::Gold,
            angle,
            ctx.rng.f32().powf(0.45) * 2.4,
            300.0 + ctx.rng.f32() * 200.0,
        );
    }
    fire_once(guard, ctx, SoundCue::Crackle, 1.0);
}

/// Blooms a dead floral star into a small flower carried on its velocity.
pub fn floral(ctx: &mut EffectContext<'_>, snap: &StarSnapshot) {
    let count = 12.0 + 6.0 * ctx.quality.factor();
    for (angle, weight) in burst_angles(ctx.rng, count, 0.0, TAU) {
        ctx.stars.add(StarSeed {
            pos: snap.pos,
            color: snap.color,
            angle,
            speed: weight * 2.4,
            life: 1000.0 + ctx.rng.f32() * 300.0,
            vel_offset: snap.vel,
            ..Default::default()
        });
    }
    ctx.flashes.push(Flash {
        pos: snap.pos,
        radius: 46.0,
    });
    ctx.sounds.play(SoundCue::BurstSmall, 0.8, ctx.now_ms);
}

/// Scatters a dead star into slow invisible leaves trailing gold glitter.
pub fn falling_leaves(ctx: &mut EffectContext<'_>, snap: &StarSnapshot) {
    for (angle, weight) in burst_angles(ctx.rng, 7.0, 0.0, TAU) {
        let star = ctx.stars.add(StarSeed {
            pos: snap.pos,
            color: ParticleColor::Invisible,
            angle,
            speed: weight * 2.4,
            life: 2400.0 + ctx.rng.f32() * 600.0,
            vel_offset: snap.vel,
            ..Default::default()
        });
        star.spark_color = ParticleColor::Gold;
        star.spark_freq = 144.0 / ctx.quality.factor();
        star.spark_speed = 0.28;
        star.spark_life = 750.0;
        star.spark_life_variation = 3.2;
    }
    ctx.flashes.push(Flash {
        pos: snap.pos,
        radius: 46.0,
    });
    ctx.sounds.play(SoundCue::BurstSmall, 0.8, ctx.now_ms);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;

    struct Parts {
        rng: Rng,
        stars: StarPool,
        sparks: SparkPool,
        flashes: Vec<Flash>,
        sounds: SoundQueue,
    }

    impl Parts {
        fn new() -> Self {
            Self {
                rng: Rng::with_seed(0x5eed),
                stars: StarPool::new(),
                sparks: SparkPool::new(),
                flashes: Vec::new(),
                sounds: SoundQueue::new(),
            }
        }

        fn ctx(&mut self) -> EffectContext<'_> {
            EffectContext {
                rng: &mut self.rng,
                stars: &mut self.stars,
                sparks: &mut self.sparks,
                flashes: &mut self.flashes,
                sounds: &mut self.sounds,
                quality: Quality::Normal,
                now_ms: 0.0,
            }
        }
    }

    fn snap() -> StarSnapshot {
        StarSnapshot {
            pos: Vec2::new(100.0, 200.0),
            vel: Vec2::new(1.0, -0.5),
            color: ParticleColor::Purple,
        }
    }

    #[test]
    fn test_crossette_spawns_four_stars() {
        let mut parts = Parts::new();
        let guard: CueGuard = Rc::new(Cell::new(false));
        crossette(&mut parts.ctx(), &snap(), &guard);
        assert_eq!(parts.stars.live_count(), 4);
        for star in parts.stars.iter() {
            assert_eq!(star.color, ParticleColor::Purple);
        }
        assert!(guard.get());
    }

    #[test]
    fn test_shared_guard_plays_cue_once() {
        let mut parts = Parts::new();
        let guard: CueGuard = Rc::new(Cell::new(false));
        crossette(&mut parts.ctx(), &snap(), &guard);
        crossette(&mut parts.ctx(), &snap(), &guard);
        crossette(&mut parts.ctx(), &snap(), &guard);
        assert_eq!(parts.sounds.drain().len(), 1);
    }

    #[test]
    fn test_crackle_spawns_gold_sparks() {
        let mut parts = Parts::new();
        let guard: CueGuard = Rc::new(Cell::new(false));
        crackle(&mut parts.ctx(), &snap(), &guard);
        assert!(parts.stars.live_count() == 0);
        let n = parts.sparks.bucket(ParticleColor::Gold.index()).len();
        assert!((12..=24).contains(&n), "got {n} sparks");
    }

    #[test]
    fn test_floral_inherits_parent_velocity() {
        let mut parts = Parts::new();
        let s = snap();
        floral(&mut parts.ctx(), &s);
        assert!(parts.stars.live_count() > 10);
        // Mean star velocity should sit near the carried parent velocity.
        let mut mean = Vec2::ZERO;
        for star in parts.stars.iter() {
            mean += star.vel;
        }
        mean /= parts.stars.live_count() as f32;
        assert!((mean - s.vel).length() < 1.0);
        assert_eq!(parts.flashes.len(), 1);
    }

    #[test]
    fn test_falling_leaves_glitter_gold() {
        let mut parts = Parts::new();
        falling_leaves(&mut parts.ctx(), &snap());
        assert!(parts.stars.live_count() >= 7);
        for star in parts.stars.iter() {
            assert!(star.color.is_invisible());
            assert_eq!(star.spark_color, ParticleColor::Gold);
            assert!(star.spark_freq > 0.0);
        }
    }
}
