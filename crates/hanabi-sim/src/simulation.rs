//! The simulation context: launch, burst and the per-tick integrator.
//!
//! All state lives on [`Simulation`]; there are no globals. Time advances
//! on an internal millisecond clock scaled by the sim speed, so slow motion
//! and pause fall out of the same code path.

use std::cell::Cell;
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use fastrand::Rng;
use glam::Vec2;
use tracing::debug;

use hanabi_common::color::{ColorPicker, ParticleColor, ShellColors};
use hanabi_common::config::{ShellKind, ShowConfig};
use hanabi_common::error::ShowError;

use crate::effects;
use crate::effects::EffectContext;
use crate::geometry::{arc_angles, burst_angles};
use crate::particle::{
    DeathAction, Flash, SparkPool, Star, StarPool, StarSeed, StarSnapshot, SPARK_AIR_DRAG,
    STAR_AIR_DRAG, STAR_AIR_DRAG_HEAVY,
};
use crate::render::{FlashCircle, RenderFrame, Segment};
use crate::shell::{self, GlitterSpec, RecipeContext, Shell, ShellRecipe};
use crate::sky::SkyColor;
use crate::sound::{QueuedCue, SoundCue, SoundQueue};
use crate::words::{GlyphRasterizer, NullRasterizer, WORDS};

/// Downward acceleration, in stage units per second per scaled step.
const GRAVITY: f32 = 0.9;

/// Horizontal launch padding in stage units.
const H_PAD: f32 = 60.0;

/// Minimum burst altitude from the top of the stage.
const V_PAD: f32 = 50.0;

/// Ceiling on one tick's frame time; longer gaps are treated as a hitch.
const MAX_FRAME_MS: f32 = 250.0;

/// Per-star burst parameters shared by every star of one burst.
struct BurstProto {
    star_life: f32,
    star_life_variation: f32,
    vel_offset: Vec2,
    second_color: Option<ParticleColor>,
    strobe: bool,
    strobe_color: Option<ParticleColor>,
    glitter: Option<(GlitterSpec, ParticleColor)>,
    death: DeathAction,
}

/// The whole fireworks simulation.
pub struct Simulation {
    config: ShowConfig,
    stage_w: f32,
    stage_h: f32,
    rng: Rng,
    colors: ColorPicker,
    stars: StarPool,
    sparks: SparkPool,
    flashes: Vec<Flash>,
    sounds: SoundQueue,
    sky: SkyColor,
    rasterizer: Box<dyn GlyphRasterizer>,
    sim_speed: f32,
    speed_bar_opacity: f32,
    last_step_speed: f32,
    time_ms: f64,
}

impl Simulation {
    /// Creates a simulation over a stage of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ShowError::Config`] for invalid settings and
    /// [`ShowError::DegenerateStage`] for a non-positive stage.
    pub fn new(config: ShowConfig, stage_w: f32, stage_h: f32, seed: u64) -> Result<Self, ShowError> {
        config.validate()?;
        if !(stage_w > 0.0 && stage_h > 0.0) {
            return Err(ShowError::DegenerateStage {
                width: stage_w,
                height: stage_h,
            });
        }
        Ok(Self {
            config,
            stage_w,
            stage_h,
            rng: Rng::with_seed(seed),
            colors: ColorPicker::new(),
            stars: StarPool::new(),
            sparks: SparkPool::new(),
            flashes: Vec::new(),
            sounds: SoundQueue::new(),
            sky: SkyColor::new(),
            rasterizer: Box::new(NullRasterizer),
            sim_speed: 1.0,
            speed_bar_opacity: 0.0,
            last_step_speed: 1.0,
            time_ms: 0.0,
        })
    }

    /// Installs a host glyph rasterizer for word shells.
    pub fn set_rasterizer(&mut self, rasterizer: Box<dyn GlyphRasterizer>) {
        self.rasterizer = rasterizer;
    }

    /// Show settings.
    #[must_use]
    pub fn config(&self) -> &ShowConfig {
        &self.config
    }

    /// Current simulation time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.time_ms
    }

    /// Random source, shared with the sequencer.
    pub fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Live star count.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.stars.live_count()
    }

    /// Live spark count.
    #[must_use]
    pub fn spark_count(&self) -> usize {
        self.sparks.live_count()
    }

    /// Iterates over live stars.
    pub fn stars(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }

    /// Current speed factor in `[0, 1]`.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.sim_speed
    }

    /// Sets the speed factor and lights the speed bar.
    ///
    /// Slowed-down shows mute their cues.
    pub fn set_speed(&mut self, speed: f32) {
        self.sim_speed = speed.clamp(0.0, 1.0);
        self.speed_bar_opacity = 1.0;
        self.sounds.set_muted(self.sim_speed < 0.95);
    }

    /// Speed bar opacity for the host overlay.
    #[must_use]
    pub fn speed_bar_opacity(&self) -> f32 {
        self.speed_bar_opacity
    }

    /// Takes every sound cue queued since the last drain.
    pub fn drain_cues(&mut self) -> Vec<QueuedCue> {
        self.sounds.drain()
    }

    /// Resizes the stage; live particles keep their positions.
    pub fn resize(&mut self, stage_w: f32, stage_h: f32) -> Result<(), ShowError> {
        if !(stage_w > 0.0 && stage_h > 0.0) {
            return Err(ShowError::DegenerateStage {
                width: stage_w,
                height: stage_h,
            });
        }
        self.stage_w = stage_w;
        self.stage_h = stage_h;
        Ok(())
    }

    /// Builds a recipe for a shell kind at a size.
    pub fn build_recipe(&mut self, kind: ShellKind, size: f32) -> ShellRecipe {
        let mut ctx = RecipeContext {
            rng: &mut self.rng,
            colors: &mut self.colors,
            config: &self.config,
        };
        shell::build(&mut ctx, kind, size)
    }

    /// Builds a recipe from the configured shell selection.
    pub fn configured_recipe(&mut self, size: f32) -> ShellRecipe {
        let kind = shell::kind_for_launch(&mut self.rng, self.config.shell);
        self.build_recipe(kind, size)
    }

    /// Launches a shell from the bottom of the stage.
    ///
    /// `x` is a stage-width fraction, `height` a burst-altitude fraction;
    /// both are clamped into the playable band by padding. The shell rides
    /// a comet star and bursts when the comet's life runs out.
    pub fn launch(&mut self, recipe: ShellRecipe, x: f32, height: f32) {
        let min_height = self.stage_h - self.stage_h * 0.45;
        let launch_x = x * (self.stage_w - H_PAD * 2.0) + H_PAD;
        let launch_y = self.stage_h;
        let burst_y = min_height - height * (min_height - V_PAD);
        let launch_velocity = ((launch_y - burst_y) * 0.04).powf(0.64);

        debug!(
            spread = recipe.spread_size,
            x = launch_x,
            burst_y,
            velocity = launch_velocity,
            "launching shell"
        );

        let horsetail = recipe.horsetail;
        let spin_radius = self.rng.f32() * (0.85 - 0.32) + 0.32;
        let spin_angle = self.rng.f32() * TAU;
        let burn_out = self.rng.f32() > 0.4 && !horsetail;
        let transition_time = if burn_out {
            self.rng.f32().powf(1.5) * 700.0 + 500.0
        } else {
            0.0
        };
        let willow_trail =
            recipe.glitter == Some(crate::shell::GlitterClass::Willow) || recipe.falling_leaves;
        let quality_factor = self.config.quality.factor();
        let high = self.config.quality.is_high();
        let color = recipe.colors.comet_color();

        let comet = self.stars.add(StarSeed {
            pos: Vec2::new(launch_x, launch_y),
            color,
            angle: PI,
            speed: launch_velocity * if horsetail { 1.2 } else { 1.0 },
            life: launch_velocity * if horsetail { 100.0 } else { 400.0 },
            ..Default::default()
        });
        comet.heavy = true;
        comet.spin_radius = spin_radius;
        comet.spin_angle = spin_angle;
        comet.spark_freq = if high { 8.0 } else { 32.0 / quality_factor };
        comet.spark_life = 320.0;
        comet.spark_life_variation = 3.0;
        if willow_trail {
            comet.spark_freq = 20.0 / quality_factor;
            comet.spark_speed = 0.5;
            comet.spark_life = 500.0;
        }
        if color.is_invisible() {
            comet.spark_color = ParticleColor::Gold;
        }
        if burn_out {
            comet.second_color = Some(ParticleColor::Invisible);
            comet.transition_time = transition_time;
        }
        comet.death = DeathAction::Burst(Box::new(Shell::new(recipe)));

        self.sounds.play(SoundCue::Lift, 1.0, self.time_ms);
    }

    /// Bursts a shell at a point in the sky.
    pub fn burst(&mut self, shell: Shell, pos: Vec2) {
        let recipe = &shell.recipe;
        let speed = recipe.spread_size / 96.0;

        let death = if recipe.crossette {
            DeathAction::Crossette(Rc::new(Cell::new(false)))
        } else if recipe.crackle {
            DeathAction::Crackle(Rc::new(Cell::new(false)))
        } else if recipe.floral {
            DeathAction::Floral
        } else if recipe.falling_leaves {
            DeathAction::FallingLeaves
        } else {
            DeathAction::None
        };

        let proto = BurstProto {
            star_life: recipe.star_life,
            star_life_variation: recipe.star_life_variation,
            vel_offset: if recipe.horsetail {
                shell.comet_vel.unwrap_or(Vec2::ZERO)
            } else {
                Vec2::new(0.0, -recipe.spread_size / 1800.0)
            },
            second_color: recipe.second_color,
            strobe: recipe.strobe,
            strobe_color: recipe.strobe_color,
            glitter: recipe
                .glitter
                .map(|class| (class.spec(self.config.quality), recipe.glitter_color)),
            death,
        };

        let star_count = recipe.star_count();
        match recipe.colors {
            ShellColors::Single(color) if recipe.ring => {
                self.burst_ring(&proto, pos, color, speed, star_count);
            }
            ShellColors::Single(color) => {
                self.burst_sphere(&proto, pos, Some(color), speed, star_count, 0.0, TAU);
            }
            ShellColors::Random if recipe.ring => {
                // A random-color ring still reads best as one color.
                let color = self.colors.any(&mut self.rng);
                self.burst_ring(&proto, pos, color, speed, star_count);
            }
            ShellColors::Random => {
                self.burst_sphere(&proto, pos, None, speed, star_count, 0.0, TAU);
            }
            ShellColors::Pair(first, second) => {
                if self.rng.f32() < 0.5 {
                    let start = self.rng.f32() * PI;
                    self.burst_sphere(&proto, pos, Some(first), speed, star_count, start, PI);
                    self.burst_sphere(&proto, pos, Some(second), speed, star_count, start + PI, PI);
                } else {
                    let half = star_count / 2.0;
                    self.burst_sphere(&proto, pos, Some(first), speed, half, 0.0, TAU);
                    self.burst_sphere(&proto, pos, Some(second), speed, half, 0.0, TAU);
                }
            }
        }

        if !recipe.disable_word
            && self.config.word_shells
            && self.rng.f32() < 0.1
            && self.rng.f32() < 0.5
        {
            self.burst_word(&proto, pos);
        }

        if recipe.pistil {
            let pistil_color = recipe.pistil_color;
            let inner = ShellRecipe {
                spread_size: recipe.spread_size * 0.5,
                star_life: recipe.star_life * 0.6,
                star_life_variation: recipe.star_life_variation,
                star_density: 1.4,
                colors: pistil_color.map_or(ShellColors::Random, ShellColors::Single),
                glitter: Some(crate::shell::GlitterClass::Light),
                glitter_color: if pistil_color == Some(ParticleColor::Gold) {
                    ParticleColor::Gold
                } else {
                    ParticleColor::White
                },
                disable_word: true,
                ..Default::default()
            };
            self.burst(Shell::new(inner), pos);
        }

        if recipe.streamers {
            let inner = ShellRecipe {
                spread_size: recipe.spread_size * 0.9,
                star_life: recipe.star_life * 0.8,
                star_life_variation: recipe.star_life_variation,
                star_count: Some((recipe.spread_size / 45.0).max(6.0).floor()),
                colors: ShellColors::Single(ParticleColor::White),
                glitter: Some(crate::shell::GlitterClass::Streamer),
                disable_word: true,
                ..Default::default()
            };
            self.burst(Shell::new(inner), pos);
        }

        self.flashes.push(Flash {
            pos,
            radius: recipe.spread_size / 4.0,
        });

        if shell.comet_vel.is_some() {
            let max_diff = 2.0;
            let size_diff = (self.config.shell_size - recipe.shell_size).min(max_diff);
            let intensity = (1.0 - size_diff / max_diff) * 0.3 + 0.7;
            self.sounds.play(SoundCue::Burst, intensity, self.time_ms);
        }
    }

    fn burst_sphere(
        &mut self,
        proto: &BurstProto,
        pos: Vec2,
        color: Option<ParticleColor>,
        speed: f32,
        count: f32,
        start: f32,
        arc: f32,
    ) {
        for (angle, weight) in burst_angles(&mut self.rng, count, start, arc) {
            let color = color.unwrap_or_else(|| self.colors.any(&mut self.rng));
            self.spawn_burst_star(proto, pos, color, angle, weight * speed);
        }
    }

    /// A planar ring: uniform angles squashed along a random axis.
    fn burst_ring(
        &mut self,
        proto: &BurstProto,
        pos: Vec2,
        color: ParticleColor,
        speed: f32,
        count: f32,
    ) {
        let ring_start = self.rng.f32() * PI;
        let squash = self.rng.f32().powi(2) * 0.85 + 0.15;
        for angle in arc_angles(&mut self.rng, 0.0, TAU, count, 0.0) {
            let vx = angle.sin() * speed * squash;
            let vy = angle.cos() * speed;
            let new_speed = (vx * vx + vy * vy).sqrt();
            let new_angle = vx.atan2(vy) + ring_start;
            let life = proto.star_life
                + self.rng.f32() * proto.star_life * proto.star_life_variation;
            let glitter = proto.glitter;
            let spark_timer = glitter.map(|(spec, _)| self.rng.f32() * spec.freq);
            let star = self.stars.add(StarSeed {
                pos,
                color,
                angle: new_angle,
                speed: new_speed,
                life,
                ..Default::default()
            });
            if let (Some((spec, spark_color)), Some(timer)) = (glitter, spark_timer) {
                star.spark_freq = spec.freq;
                star.spark_speed = spec.speed;
                star.spark_life = spec.life;
                star.spark_life_variation = spec.life_variation;
                star.spark_color = spark_color;
                star.spark_timer = timer;
            }
        }
    }

    fn spawn_burst_star(
        &mut self,
        proto: &BurstProto,
        pos: Vec2,
        color: ParticleColor,
        angle: f32,
        speed: f32,
    ) {
        let life =
            proto.star_life + self.rng.f32() * proto.star_life * proto.star_life_variation;
        let second_transition = self.rng.f32() * 0.05 + 0.32;
        let strobe_transition = self.rng.f32() * 0.08 + 0.46;
        let strobe_freq = self.rng.f32() * 20.0 + 40.0;
        let spark_timer = proto.glitter.map(|(spec, _)| self.rng.f32() * spec.freq);
        let death = proto.death.clone();

        let star = self.stars.add(StarSeed {
            pos,
            color,
            angle,
            speed,
            life,
            vel_offset: proto.vel_offset,
            ..Default::default()
        });
        if let Some(second) = proto.second_color {
            star.transition_time = proto.star_life * second_transition;
            star.second_color = Some(second);
        }
        if proto.strobe {
            star.transition_time = proto.star_life * strobe_transition;
            star.strobe = true;
            star.strobe_freq = strobe_freq;
            if let Some(strobe_color) = proto.strobe_color {
                star.second_color = Some(strobe_color);
            }
        }
        star.death = death;
        if let (Some((spec, spark_color)), Some(timer)) = (proto.glitter, spark_timer) {
            star.spark_freq = spec.freq;
            star.spark_speed = spec.speed;
            star.spark_life = spec.life;
            star.spark_life_variation = spec.life_variation;
            star.spark_color = spark_color;
            star.spark_timer = timer;
        }
    }

    /// Overlays a phrase on the burst as strobing dots or drifting sparks.
    fn burst_word(&mut self, proto: &BurstProto, pos: Vec2) {
        let word = WORDS[self.rng.usize(0..WORDS.len())];
        let font_px = (self.rng.f32() * 70.0 + 60.0).floor();
        let Some(lattice) = self.rasterizer.rasterize(word, font_px) else {
            return;
        };
        let color = self.colors.any(&mut self.rng);
        let strobed = self.rng.f32() < 0.5;
        let strobe_color = if strobed {
            self.colors.any(&mut self.rng)
        } else {
            color
        };
        let center = Vec2::new(lattice.width / 2.0, lattice.height / 2.0);
        for point in lattice.points {
            let dot = pos + point - center;
            let life_jitter =
                self.rng.f32() * proto.star_life * proto.star_life_variation;
            if strobed {
                let speed = self.rng.f32() * 0.1 + 0.05;
                let angle = self.rng.f32() * TAU;
                let transition = proto.star_life * (self.rng.f32() * 0.08 + 0.46);
                let strobe_freq = self.rng.f32() * 20.0 + 40.0;
                let star = self.stars.add(StarSeed {
                    pos: dot,
                    color,
                    angle,
                    speed,
                    life: proto.star_life + life_jitter + speed * 1000.0,
                    vel_offset: proto.vel_offset,
                    size: 2.0,
                });
                star.transition_time = transition;
                star.strobe = true;
                star.strobe_freq = strobe_freq;
                star.second_color = Some(strobe_color);
            } else {
                self.sparks.add(
                    dot,
                    color,
                    self.rng.f32() * TAU,
                    self.rng.f32().powf(0.15) * 1.4,
                    proto.star_life + life_jitter + 1000.0,
                );
            }
            let tail_jitter =
                self.rng.f32() * proto.star_life * proto.star_life_variation;
            self.sparks.add(
                dot + Vec2::new(5.0, 10.0),
                color,
                self.rng.f32() * TAU,
                self.rng.f32().powf(0.05) * 0.4,
                proto.star_life + tail_jitter + 2000.0,
            );
        }
    }

    /// Advances the simulation by one frame.
    ///
    /// `frame_ms` is wall time since the last tick; `lag` is that time
    /// expressed in 60 Hz frames. Both are scaled by the sim speed so the
    /// whole world slows down together.
    pub fn step(&mut self, frame_ms: f32, lag: f32) {
        let frame_ms = frame_ms.min(MAX_FRAME_MS);
        let time_step = frame_ms * self.sim_speed;
        let speed = lag * self.sim_speed;
        self.time_ms += f64::from(time_step);
        self.last_step_speed = speed;

        self.speed_bar_opacity = (self.speed_bar_opacity - lag / 30.0).max(0.0);

        let star_drag = 1.0 - (1.0 - STAR_AIR_DRAG) * speed;
        let star_drag_heavy = 1.0 - (1.0 - STAR_AIR_DRAG_HEAVY) * speed;
        let spark_drag = 1.0 - (1.0 - SPARK_AIR_DRAG) * speed;
        let g_acc = time_step / 1000.0 * GRAVITY;

        let mut deaths: Vec<(DeathAction, StarSnapshot)> = Vec::new();
        let mut recolored: Vec<Star> = Vec::new();

        for color_index in 0..ParticleColor::COUNT {
            let mut bucket = self.stars.take_bucket(color_index);
            let mut i = bucket.len();
            while i > 0 {
                i -= 1;
                bucket[i].life -= time_step;
                if bucket[i].life <= 0.0 {
                    let star = bucket.swap_remove(i);
                    deaths.push(self.stars.release(star));
                    continue;
                }
                let star = &mut bucket[i];
                star.prev_pos = star.pos;
                star.pos += star.vel * speed;
                let drag = if star.heavy { star_drag_heavy } else { star_drag };
                star.vel *= drag;
                star.vel.y += g_acc;

                if star.spin_radius > 0.0 {
                    star.spin_angle += star.spin_speed * speed;
                    star.pos += Vec2::new(star.spin_angle.sin(), star.spin_angle.cos())
                        * star.spin_radius
                        * speed;
                }

                if star.spark_freq > 0.0 {
                    star.spark_timer -= time_step;
                    while star.spark_timer < 0.0 {
                        // Emission slows as the star ages.
                        let age = 1.0 - (star.life / star.full_life).sqrt();
                        star.spark_timer += star.spark_freq * 0.75 + star.spark_freq * age * 4.0;
                        self.sparks.add(
                            star.pos,
                            star.spark_color,
                            self.rng.f32() * TAU,
                            self.rng.f32() * star.spark_speed,
                            star.spark_life * 0.8
                                + self.rng.f32() * star.spark_life_variation * star.spark_life,
                        );
                    }
                }

                if star.life < star.transition_time {
                    if let Some(second) = star.second_color {
                        if !star.color_changed {
                            star.color_changed = true;
                            star.color = second;
                            if second.is_invisible() {
                                star.spark_freq = 0.0;
                            }
                            recolored.push(bucket.swap_remove(i));
                            continue;
                        }
                    }
                    if star.strobe {
                        star.visible = (star.life / star.strobe_freq).floor() as i64 % 3 == 0;
                    }
                }
            }
            self.stars.put_bucket(color_index, bucket);
        }

        // Recolored stars join their new bucket only after the sweep so
        // they are never integrated twice in one step.
        for star in recolored {
            self.stars.adopt(star);
        }

        for (action, snap) in deaths {
            self.apply_death(action, &snap);
        }

        for color_index in 0..ParticleColor::COUNT {
            let mut bucket = self.sparks.take_bucket(color_index);
            let mut i = bucket.len();
            while i > 0 {
                i -= 1;
                bucket[i].life -= time_step;
                if bucket[i].life <= 0.0 {
                    let spark = bucket.swap_remove(i);
                    self.sparks.release(spark);
                    continue;
                }
                let spark = &mut bucket[i];
                spark.prev_pos = spark.pos;
                spark.pos += spark.vel * speed;
                spark.vel *= spark_drag;
                spark.vel.y += g_acc;
            }
            self.sparks.put_bucket(color_index, bucket);
        }

        self.sky.update(self.config.sky_lighting, &self.stars, speed);
    }

    fn apply_death(&mut self, action: DeathAction, snap: &StarSnapshot) {
        match action {
            DeathAction::None => {}
            DeathAction::Burst(mut boxed) => {
                boxed.comet_vel = Some(snap.vel);
                self.burst(*boxed, snap.pos);
            }
            DeathAction::Crossette(guard) => {
                effects::crossette(&mut self.effect_ctx(), snap, &guard);
            }
            DeathAction::Crackle(guard) => {
                effects::crackle(&mut self.effect_ctx(), snap, &guard);
            }
            DeathAction::Floral => effects::floral(&mut self.effect_ctx(), snap),
            DeathAction::FallingLeaves => effects::falling_leaves(&mut self.effect_ctx(), snap),
        }
    }

    fn effect_ctx(&mut self) -> EffectContext<'_> {
        EffectContext {
            rng: &mut self.rng,
            stars: &mut self.stars,
            sparks: &mut self.sparks,
            flashes: &mut self.flashes,
            sounds: &mut self.sounds,
            quality: self.config.quality,
            now_ms: self.time_ms,
        }
    }

    /// Flattens current particle state into a frame for the host.
    ///
    /// Consumes the pending burst flashes; everything else is copied out.
    pub fn sample_frame(&mut self) -> RenderFrame {
        let fade_alpha = if self.config.long_exposure {
            0.0025
        } else {
            0.175 * self.last_step_speed
        };
        let spark_width = if self.config.quality.is_high() { 0.75 } else { 1.0 };

        let mut frame = RenderFrame {
            fade_alpha,
            sky: self.sky.rgb(),
            ..Default::default()
        };

        for color in ParticleColor::ALL {
            if color.is_invisible() {
                // Invisible stars exist only to carry trails; sparks
                // emitted into the invisible bucket still draw as gold.
                for spark in self.sparks.bucket(color.index()) {
                    frame.sparks.push(Segment {
                        from: spark.prev_pos,
                        to: spark.pos,
                        width: spark_width,
                        color: ParticleColor::Gold.rgb(),
                    });
                }
                continue;
            }
            let rgb = color.rgb();
            for star in self.stars.bucket(color.index()) {
                if !star.visible {
                    continue;
                }
                frame.stars.push(Segment {
                    from: star.prev_pos,
                    to: star.pos,
                    width: star.size,
                    color: rgb,
                });
            }
            for spark in self.sparks.bucket(color.index()) {
                frame.sparks.push(Segment {
                    from: spark.prev_pos,
                    to: spark.pos,
                    width: spark_width,
                    color: rgb,
                });
            }
        }

        for flash in self.flashes.drain(..) {
            frame.flashes.push(FlashCircle {
                center: flash.pos,
                radius: flash.radius,
                alpha: 0.25,
            });
        }

        frame
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_common::config::Quality;

    fn sim() -> Simulation {
        let config = ShowConfig {
            word_shells: false,
            auto_launch: false,
            ..Default::default()
        };
        Simulation::new(config, 1920.0, 1080.0, 0x5eed).expect("valid sim")
    }

    fn plain_recipe() -> ShellRecipe {
        ShellRecipe {
            shell_size: 3.0,
            spread_size: 300.0,
            star_life: 900.0,
            colors: ShellColors::Single(ParticleColor::Red),
            disable_word: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_degenerate_stage_rejected() {
        let res = Simulation::new(ShowConfig::default(), 0.0, 1080.0, 1);
        assert!(matches!(res.err(), Some(ShowError::DegenerateStage { .. })));
    }

    #[test]
    fn test_launch_spawns_one_comet_and_lift_cue() {
        let mut sim = sim();
        sim.launch(plain_recipe(), 0.5, 0.5);
        assert_eq!(sim.star_count(), 1);
        let comet = sim.stars().next().expect("comet");
        assert!(comet.heavy);
        assert!(comet.vel.y < 0.0, "comet must rise");
        assert!(matches!(comet.death, DeathAction::Burst(_)));
        let cues = sim.drain_cues();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].cue, SoundCue::Lift);
    }

    #[test]
    fn test_comet_rises_then_bursts() {
        let mut sim = sim();
        sim.launch(plain_recipe(), 0.5, 0.5);
        let expected = plain_recipe().star_count();
        let mut peak = 0;
        // Comet life is launch velocity * 400 ms, comfortably under 10 s.
        for _ in 0..600 {
            sim.step(16.0, 1.0);
            peak = peak.max(sim.star_count());
        }
        assert!(
            peak as f32 >= expected * 0.8,
            "burst never materialized: peak {peak}, expected ~{expected}"
        );
        let burst_happened = sim.drain_cues().iter().any(|c| c.cue == SoundCue::Burst);
        assert!(burst_happened, "expected a burst cue");
    }

    #[test]
    fn test_burst_star_count_near_recipe() {
        let mut sim = sim();
        let recipe = plain_recipe();
        let expected = recipe.star_count();
        sim.burst(Shell::new(recipe), Vec2::new(960.0, 400.0));
        let n = sim.star_count() as f32;
        assert!(
            n >= expected * 0.8 && n <= expected * 1.45,
            "expected ~{expected}, got {n}"
        );
    }

    #[test]
    fn test_burst_adds_one_flash_quarter_spread() {
        let mut sim = sim();
        sim.burst(Shell::new(plain_recipe()), Vec2::new(960.0, 400.0));
        let frame = sim.sample_frame();
        assert_eq!(frame.flashes.len(), 1);
        assert!((frame.flashes[0].radius - 75.0).abs() < 1e-5);
        // Flashes are consumed by sampling.
        assert!(sim.sample_frame().flashes.is_empty());
    }

    #[test]
    fn test_horsetail_stars_ride_comet_velocity() {
        let mut sim = sim();
        let recipe = ShellRecipe {
            horsetail: true,
            spread_size: 250.0,
            star_life: 2500.0,
            colors: ShellColors::Single(ParticleColor::Gold),
            disable_word: true,
            ..Default::default()
        };
        let comet_vel = Vec2::new(50.0, 80.0);
        let kick = recipe.spread_size / 96.0;
        let mut shell = Shell::new(recipe);
        shell.comet_vel = Some(comet_vel);
        sim.burst(shell, Vec2::new(960.0, 400.0));
        assert!(sim.star_count() > 0);
        for star in sim.stars() {
            assert!(
                (star.vel - comet_vel).length() <= kick + 1e-3,
                "star velocity {:?} strays from comet {:?}",
                star.vel,
                comet_vel
            );
        }
    }

    #[test]
    fn test_star_life_decreases_monotonically() {
        let mut sim = sim();
        sim.burst(Shell::new(plain_recipe()), Vec2::new(960.0, 400.0));
        let mut last: Vec<f32> = sim.stars().map(|s| s.life).collect();
        for _ in 0..20 {
            sim.step(16.0, 1.0);
            let now: Vec<f32> = sim.stars().map(|s| s.life).collect();
            if now.len() == last.len() {
                for (a, b) in last.iter().zip(&now) {
                    assert!(b < a);
                }
            }
            last = now;
        }
    }

    #[test]
    fn test_gravity_pulls_stars_down() {
        let mut sim = sim();
        sim.burst(Shell::new(plain_recipe()), Vec2::new(960.0, 400.0));
        let before: f32 = sim.stars().map(|s| s.vel.y).sum::<f32>() / sim.star_count() as f32;
        for _ in 0..30 {
            sim.step(16.0, 1.0);
        }
        let after: f32 = sim.stars().map(|s| s.vel.y).sum::<f32>() / sim.star_count() as f32;
        assert!(after > before, "mean vertical velocity must grow downward");
    }

    #[test]
    fn test_color_transition_is_one_shot() {
        let mut sim = sim();
        let recipe = ShellRecipe {
            colors: ShellColors::Single(ParticleColor::Red),
            second_color: Some(ParticleColor::Blue),
            star_life: 600.0,
            star_life_variation: 0.0,
            disable_word: true,
            ..Default::default()
        };
        sim.burst(Shell::new(recipe), Vec2::new(960.0, 400.0));
        let total = sim.star_count();
        // Transition begins between 0.32 and 0.37 of star life from death.
        for _ in 0..35 {
            sim.step(16.0, 1.0);
        }
        let blue = sim
            .stars()
            .filter(|s| s.color == ParticleColor::Blue)
            .count();
        assert_eq!(blue, sim.star_count());
        assert!(blue <= total);
        for star in sim.stars() {
            assert!(star.color_changed);
        }
    }

    #[test]
    fn test_zero_speed_freezes_everything() {
        let mut sim = sim();
        sim.burst(Shell::new(plain_recipe()), Vec2::new(960.0, 400.0));
        sim.set_speed(0.0);
        let before: Vec<Vec2> = sim.stars().map(|s| s.pos).collect();
        let time_before = sim.now_ms();
        for _ in 0..60 {
            sim.step(16.0, 1.0);
        }
        let after: Vec<Vec2> = sim.stars().map(|s| s.pos).collect();
        assert_eq!(before, after);
        assert!((sim.now_ms() - time_before).abs() < f64::EPSILON);
        assert_eq!(sim.star_count(), before.len());
    }

    #[test]
    fn test_frame_time_clamped() {
        let mut sim = sim();
        sim.burst(Shell::new(plain_recipe()), Vec2::new(960.0, 400.0));
        let t0 = sim.now_ms();
        sim.step(10_000.0, 1.0);
        assert!((sim.now_ms() - t0 - 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_invisible_stars_hidden_from_frame() {
        let mut sim = sim();
        let recipe = ShellRecipe {
            colors: ShellColors::Single(ParticleColor::Invisible),
            star_life: 3000.0,
            disable_word: true,
            ..Default::default()
        };
        sim.burst(Shell::new(recipe), Vec2::new(960.0, 400.0));
        assert!(sim.star_count() > 0);
        let frame = sim.sample_frame();
        assert!(frame.stars.is_empty());
    }

    #[test]
    fn test_pistil_bursts_inner_shell() {
        let mut sim = sim();
        let recipe = ShellRecipe {
            colors: ShellColors::Single(ParticleColor::Blue),
            pistil: true,
            pistil_color: Some(ParticleColor::Gold),
            disable_word: true,
            ..Default::default()
        };
        let outer_only = plain_recipe().star_count();
        sim.burst(Shell::new(recipe), Vec2::new(960.0, 400.0));
        let gold = sim
            .stars()
            .filter(|s| s.color == ParticleColor::Gold)
            .count();
        assert!(gold > 0, "pistil stars missing");
        assert!(sim.star_count() as f32 > outer_only);
        // Inner shell contributes its own flash.
        assert_eq!(sim.sample_frame().flashes.len(), 2);
    }

    #[test]
    fn test_quality_changes_crackle_density() {
        for (quality, max) in [(Quality::Normal, 16), (Quality::High, 32)] {
            let config = ShowConfig {
                quality,
                word_shells: false,
                ..Default::default()
            };
            let mut sim = Simulation::new(config, 1920.0, 1080.0, 9).expect("valid sim");
            let recipe = ShellRecipe {
                colors: ShellColors::Single(ParticleColor::Gold),
                crackle: true,
                star_life: 100.0,
                star_life_variation: 0.0,
                star_count: Some(6.0),
                disable_word: true,
                ..Default::default()
            };
            sim.burst(Shell::new(recipe), Vec2::new(960.0, 400.0));
            for _ in 0..10 {
                sim.step(16.0, 1.0);
            }
            // Nine stars survive ring quantization of six; each pops into
            // `max` sparks on death.
            let gold_sparks = sim.spark_count();
            assert!(
                gold_sparks >= max * 8 && gold_sparks <= max * 10,
                "quality {quality:?}: {gold_sparks} sparks"
            );
        }
    }
}
