//! Show loop: config loading and the fixed-tick drive.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use hanabi_common::config::ShowConfig;
use hanabi_sim::show::Show;

/// Stage size for headless runs, in stage units.
const STAGE_W: f32 = 1920.0;
const STAGE_H: f32 = 1080.0;

/// Tick rate the simulation is tuned for.
const FRAME_MS: f32 = 1000.0 / 60.0;

/// Simulated seconds to run when none is given on the command line.
const DEFAULT_DURATION_S: u64 = 30;

/// Loads the show config from a JSON file, or defaults.
fn load_config(path: Option<&str>) -> Result<ShowConfig> {
    let Some(path) = path else {
        return Ok(ShowConfig::default());
    };
    let text = fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading config {path}"))?;
    let config: ShowConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?;
    config.validate()?;
    Ok(config)
}

/// Runs the show for a fixed stretch of simulated time.
///
/// Usage: `hanabi [config.json] [seconds]`. Ticks are simulated
/// back-to-back rather than in real time, so a 30 second show finishes
/// in well under a second of wall time.
pub fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let duration_s: u64 = match args.get(1) {
        Some(raw) => raw.parse().context("parsing duration")?,
        None => DEFAULT_DURATION_S,
    };

    info!(?config, duration_s, "running show");

    let seed = fastrand::u64(..);
    let mut show = Show::new(config, STAGE_W, STAGE_H, seed)?;

    let ticks = duration_s * 60;
    let mut cue_total = 0usize;
    let mut peak_stars = 0usize;
    let mut peak_sparks = 0usize;

    for tick in 0..ticks {
        show.tick(FRAME_MS, 1.0);
        let frame = show.frame();
        let cues = show.drain_cues();
        cue_total += cues.len();
        for cue in &cues {
            debug!(cue = ?cue.cue, intensity = cue.intensity, "cue");
        }
        peak_stars = peak_stars.max(show.sim().star_count());
        peak_sparks = peak_sparks.max(show.sim().spark_count());

        if tick % 300 == 0 {
            info!(
                t_ms = show.sim().now_ms(),
                stars = show.sim().star_count(),
                sparks = show.sim().spark_count(),
                star_segments = frame.stars.len(),
                spark_segments = frame.sparks.len(),
                pending = show.pending_launches().len(),
                "tick"
            );
        }
    }

    info!(cue_total, peak_stars, peak_sparks, "show finished");
    Ok(())
}
