//! The show sequencer: decides what to launch next and when.
//!
//! Sequences that fan out over time (barrages, pyramids, triples) do not
//! block; they schedule [`PendingLaunch`] entries with absolute fire times
//! on the simulation clock, so pausing the show freezes the choreography
//! with no catch-up burst on resume.

use tracing::debug;

use hanabi_common::config::{ShellKind, ShellSelection};

use crate::shell::{self, ShellRecipe};
use crate::simulation::Simulation;

/// Shells fired back to back in a finale volley.
const FINALE_COUNT: u32 = 32;

/// Minimum simulation time between small barrages, in milliseconds.
const BARRAGE_COOLDOWN_MS: f64 = 15_000.0;

/// Shell pairs on each side of a pyramid's crown.
const PYRAMID_HALF: u32 = 7;

/// Shells in a small barrage.
const BARRAGE_COUNT: u32 = 11;

/// Barrage slot that fires the special shell pair.
const BARRAGE_SPECIAL_INDEX: u32 = 3;

/// A launch scheduled for a future moment of simulation time.
///
/// The recipe is rolled at scheduling time; only the launch itself waits.
#[derive(Debug, Clone)]
pub struct PendingLaunch {
    /// Simulation time at which to launch, in milliseconds.
    pub fire_at: f64,
    /// The shell to launch.
    pub recipe: ShellRecipe,
    /// Stage-width fraction.
    pub x: f32,
    /// Burst-altitude fraction.
    pub height: f32,
}

/// Randomized launch position and size for one shell.
struct SizedSpot {
    size: f32,
    x: f32,
    height: f32,
}

/// Chooses and schedules launch sequences.
#[derive(Debug)]
pub struct Sequencer {
    first: bool,
    finale_count: u32,
    barrage_last: f64,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Squeezes a horizontal fraction away from the stage edges.
fn fit_h(position: f32) -> f32 {
    let edge = 0.18;
    (1.0 - edge * 2.0) * position + edge
}

/// Keeps a burst-altitude fraction out of the very top of the stage.
fn fit_v(position: f32) -> f32 {
    position * 0.75
}

impl Sequencer {
    /// Creates a sequencer ready for the opening shell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            first: true,
            finale_count: 0,
            barrage_last: 0.0,
        }
    }

    /// Launches or schedules the next sequence.
    ///
    /// Returns the delay in milliseconds until the sequencer should run
    /// again. Multi-shell sequences land their later shells in `pending`.
    pub fn advance(&mut self, sim: &mut Simulation, pending: &mut Vec<PendingLaunch>) -> f32 {
        if self.first {
            self.first = false;
            let size = sim.config().shell_size;
            let recipe = sim.build_recipe(ShellKind::Crysanthemum, size);
            sim.launch(recipe, 0.5, 0.5);
            return 2400.0;
        }
        if sim.config().finale {
            // The volley cadence overrides the shell's own settle delay.
            let _ = self.fast_shell(sim);
            if self.finale_count < FINALE_COUNT {
                self.finale_count += 1;
                return 170.0;
            }
            self.finale_count = 0;
            return 6000.0;
        }
        let roll = sim.rng_mut().f32();
        let now = sim.now_ms();
        if roll < 0.08 && now - self.barrage_last > BARRAGE_COOLDOWN_MS {
            self.small_barrage(sim, pending)
        } else if roll < 0.1 {
            self.pyramid(sim, pending)
        } else if roll < 0.6 {
            self.single_shell(sim)
        } else if roll < 0.8 {
            self.two_shells(sim, pending)
        } else {
            self.triple(sim, pending)
        }
    }

    /// Random size, position and altitude for one shell.
    ///
    /// Smaller rolls burst lower and may drift further from center, so a
    /// run of small shells fills the sky instead of stacking.
    fn random_spot(sim: &mut Simulation) -> SizedSpot {
        let base = sim.config().shell_size;
        let rng = sim.rng_mut();
        let max_variance = base.min(2.5);
        let variance = rng.f32() * max_variance;
        let size = base - variance;
        let height = if max_variance == 0.0 {
            rng.f32()
        } else {
            1.0 - variance / max_variance
        };
        let center_offset = rng.f32() * (1.0 - height * 0.65) * 0.5;
        let x = if rng.f32() < 0.5 {
            0.5 - center_offset
        } else {
            0.5 + center_offset
        };
        SizedSpot {
            size,
            x: fit_h(x),
            height: fit_v(height),
        }
    }

    fn single_shell(&mut self, sim: &mut Simulation) -> f32 {
        let spot = Self::random_spot(sim);
        let recipe = sim.configured_recipe(spot.size);
        let extra = if recipe.falling_leaves {
            4600.0
        } else {
            recipe.star_life
        };
        sim.launch(recipe, spot.x, spot.height);
        900.0 + sim.rng_mut().f32() * 600.0 + extra
    }

    fn fast_shell(&mut self, sim: &mut Simulation) -> f32 {
        let spot = Self::random_spot(sim);
        let kind = shell::random_fast_kind(sim.rng_mut());
        let recipe = sim.build_recipe(kind, spot.size);
        let star_life = recipe.star_life;
        sim.launch(recipe, spot.x, spot.height);
        900.0 + sim.rng_mut().f32() * 600.0 + star_life
    }

    fn two_shells(&mut self, sim: &mut Simulation, pending: &mut Vec<PendingLaunch>) -> f32 {
        let spot1 = Self::random_spot(sim);
        let spot2 = Self::random_spot(sim);
        let left_offset = sim.rng_mut().f32() * 0.2 - 0.1;
        let right_offset = sim.rng_mut().f32() * 0.2 - 0.1;
        let recipe1 = sim.configured_recipe(spot1.size);
        let recipe2 = sim.configured_recipe(spot2.size);
        let leaves = recipe1.falling_leaves || recipe2.falling_leaves;
        let extra = if leaves {
            4600.0
        } else {
            recipe1.star_life.max(recipe2.star_life)
        };
        sim.launch(recipe1, 0.3 + left_offset, spot1.height);
        pending.push(PendingLaunch {
            fire_at: sim.now_ms() + 100.0,
            recipe: recipe2,
            x: 0.7 + right_offset,
            height: spot2.height,
        });
        900.0 + sim.rng_mut().f32() * 600.0 + extra
    }

    fn triple(&mut self, sim: &mut Simulation, pending: &mut Vec<PendingLaunch>) -> f32 {
        let kind = shell::random_fast_kind(sim.rng_mut());
        let base = sim.config().shell_size;
        let small = (base - 1.25).max(0.0);
        let now = sim.now_ms();

        let offset = sim.rng_mut().f32() * 0.08 - 0.04;
        let center = sim.build_recipe(kind, base);
        sim.launch(center, 0.5 + offset, 0.7);

        for side_x in [0.2, 0.8] {
            let delay = 1000.0 + sim.rng_mut().f32() * 400.0;
            let offset = sim.rng_mut().f32() * 0.08 - 0.04;
            let recipe = sim.build_recipe(kind, small);
            pending.push(PendingLaunch {
                fire_at: now + f64::from(delay),
                recipe,
                x: side_x + offset,
                height: 0.1,
            });
        }
        4000.0
    }

    fn pyramid(&mut self, sim: &mut Simulation, pending: &mut Vec<PendingLaunch>) -> f32 {
        debug!("scheduling pyramid sequence");
        let large = sim.config().shell_size;
        let small = (large - 3.0).max(0.0);
        let main_kind = if sim.rng_mut().f32() < 0.78 {
            ShellKind::Crysanthemum
        } else {
            ShellKind::Ring
        };
        let now = sim.now_ms();

        let mut schedule = |sim: &mut Simulation,
                            pending: &mut Vec<PendingLaunch>,
                            x: f32,
                            special: bool,
                            delay: f32| {
            let kind = match sim.config().shell {
                ShellSelection::Named(kind) => kind,
                ShellSelection::Random if special => shell::random_kind(sim.rng_mut()),
                ShellSelection::Random => main_kind,
            };
            let recipe = sim.build_recipe(kind, if special { large } else { small });
            let slope = if x <= 0.5 { x / 0.5 } else { (1.0 - x) / 0.5 };
            let height = if special { 0.75 } else { slope * 0.42 };
            pending.push(PendingLaunch {
                fire_at: now + f64::from(delay),
                recipe,
                x,
                height,
            });
        };

        let mut delay = 0.0;
        for count in 0..=PYRAMID_HALF {
            if count == PYRAMID_HALF {
                schedule(sim, pending, 0.5, true, delay);
            } else {
                let offset = count as f32 / PYRAMID_HALF as f32 * 0.5;
                let partner_jitter = sim.rng_mut().f32() * 30.0 + 30.0;
                schedule(sim, pending, offset, false, delay);
                schedule(sim, pending, 1.0 - offset, false, delay + partner_jitter);
            }
            delay += 200.0;
        }
        3400.0 + PYRAMID_HALF as f32 * 250.0
    }

    fn small_barrage(&mut self, sim: &mut Simulation, pending: &mut Vec<PendingLaunch>) -> f32 {
        debug!("scheduling small barrage");
        self.barrage_last = sim.now_ms();
        let size = (sim.config().shell_size - 2.0).max(0.0);
        let main_kind = if sim.rng_mut().f32() < 0.78 {
            ShellKind::Crysanthemum
        } else {
            ShellKind::Ring
        };
        let special_kind = shell::random_fast_kind(sim.rng_mut());
        let now = sim.now_ms();

        let mut schedule = |sim: &mut Simulation,
                            pending: &mut Vec<PendingLaunch>,
                            x: f32,
                            special: bool,
                            delay: f32| {
            let kind = match sim.config().shell {
                ShellSelection::Named(kind) => kind,
                ShellSelection::Random if special => special_kind,
                ShellSelection::Random => main_kind,
            };
            let recipe = sim.build_recipe(kind, size);
            // Cosine comb: alternating high and low bursts across the arc.
            let wave = ((x * 5.0 * std::f32::consts::PI + std::f32::consts::FRAC_PI_2).cos()
                + 1.0)
                / 2.0;
            pending.push(PendingLaunch {
                fire_at: now + f64::from(delay),
                recipe,
                x,
                height: wave * 0.75,
            });
        };

        let mut count = 0;
        let mut delay = 0.0;
        while count < BARRAGE_COUNT {
            if count == 0 {
                schedule(sim, pending, 0.5, false, 0.0);
                count += 1;
            } else {
                let offset = (count + 1) as f32 / BARRAGE_COUNT as f32 / 2.0;
                let partner_jitter = sim.rng_mut().f32() * 30.0 + 30.0;
                let special = count == BARRAGE_SPECIAL_INDEX;
                schedule(sim, pending, 0.5 + offset, special, delay);
                schedule(sim, pending, 0.5 - offset, special, delay + partner_jitter);
                count += 2;
            }
            delay += 200.0;
        }
        3400.0 + BARRAGE_COUNT as f32 * 120.0
    }
}
