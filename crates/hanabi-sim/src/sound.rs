//! Sound cues queued by the simulation.
//!
//! The core never touches an audio device; it queues typed cues with an
//! intensity and the host drains them each frame. Cooldowns run on the
//! simulation clock so a paused show stays silent.

use serde::{Deserialize, Serialize};

/// Minimum simulation time between small-burst pops, in milliseconds.
const BURST_SMALL_COOLDOWN_MS: f64 = 20.0;

/// A sound effect the host should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// A shell leaving the mortar.
    Lift,
    /// A full shell burst.
    Burst,
    /// A pistil, streamer or effect sub-burst.
    BurstSmall,
    /// A crackle shell popping.
    Crackle,
    /// A single crossette star splitting.
    CrackleSmall,
}

/// A cue with its playback intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueuedCue {
    /// Which effect to play.
    pub cue: SoundCue,
    /// Volume scale in `[0, 1]`.
    pub intensity: f32,
}

/// Per-frame cue queue with rate limiting.
#[derive(Debug, Default)]
pub struct SoundQueue {
    queued: Vec<QueuedCue>,
    last_burst_small: f64,
    muted: bool,
}

impl SoundQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutes or unmutes the queue.
    ///
    /// Slowed-down shows run silent; pitch-shifting every cue would sound
    /// worse than no sound at all.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Queues a cue at the given intensity.
    ///
    /// Dense bursts fire many small pops in the same instant; those are
    /// limited to one per cooldown window of simulation time.
    pub fn play(&mut self, cue: SoundCue, intensity: f32, now_ms: f64) {
        if self.muted {
            return;
        }
        if cue == SoundCue::BurstSmall {
            if now_ms - self.last_burst_small < BURST_SMALL_COOLDOWN_MS {
                return;
            }
            self.last_burst_small = now_ms;
        }
        self.queued.push(QueuedCue {
            cue,
            intensity: intensity.clamp(0.0, 1.0),
        });
    }

    /// Takes every cue queued since the last drain.
    pub fn drain(&mut self) -> Vec<QueuedCue> {
        std::mem::take(&mut self.queued)
    }

    /// Number of cues waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queued.len()
    }
}

/// Host-side cue playback.
pub trait CuePlayer {
    /// Plays one cue.
    fn play(&mut self, cue: QueuedCue);
}

/// Discards every cue; used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCuePlayer;

impl CuePlayer for NullCuePlayer {
    fn play(&mut self, _cue: QueuedCue) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_clamped() {
        let mut queue = SoundQueue::new();
        queue.play(SoundCue::Burst, 3.0, 0.0);
        queue.play(SoundCue::Lift, -1.0, 0.0);
        let cues = queue.drain();
        assert_eq!(cues[0].intensity, 1.0);
        assert_eq!(cues[1].intensity, 0.0);
    }

    #[test]
    fn test_small_burst_rate_limited() {
        let mut queue = SoundQueue::new();
        queue.play(SoundCue::BurstSmall, 1.0, 100.0);
        queue.play(SoundCue::BurstSmall, 1.0, 110.0);
        queue.play(SoundCue::BurstSmall, 1.0, 125.0);
        assert_eq!(queue.drain().len(), 2);
    }

    #[test]
    fn test_other_cues_not_rate_limited() {
        let mut queue = SoundQueue::new();
        queue.play(SoundCue::Burst, 1.0, 0.0);
        queue.play(SoundCue::Burst, 1.0, 0.0);
        queue.play(SoundCue::Crackle, 1.0, 0.0);
        assert_eq!(queue.drain().len(), 3);
    }

    #[test]
    fn test_muted_queue_drops_cues() {
        let mut queue = SoundQueue::new();
        queue.set_muted(true);
        queue.play(SoundCue::Burst, 1.0, 0.0);
        assert_eq!(queue.pending(), 0);
        queue.set_muted(false);
        queue.play(SoundCue::Burst, 1.0, 0.0);
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = SoundQueue::new();
        queue.play(SoundCue::Lift, 0.5, 0.0);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert_eq!(queue.pending(), 0);
        assert!(queue.drain().is_empty());
    }
}
