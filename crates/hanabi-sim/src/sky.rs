//! Ambient sky tint driven by the live star population.
//!
//! The sky glows faintly in the blended color of whatever is currently
//! burning, eased toward its target so bursts bloom in and fade out.

use hanabi_common::color::ParticleColor;
use hanabi_common::config::SkyLighting;

use crate::particle::StarPool;

/// Smoothed ambient sky color.
#[derive(Debug, Clone, Default)]
pub struct SkyColor {
    current: [f32; 3],
}

impl SkyColor {
    /// Creates a dark sky.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Eases the tint toward the population-weighted star color.
    ///
    /// `speed` is the scaled step factor, so slow motion also slows the
    /// sky's response.
    pub fn update(&mut self, lighting: SkyLighting, stars: &StarPool, speed: f32) {
        if lighting == SkyLighting::None {
            self.current = [0.0; 3];
            return;
        }
        let mut target = [0.0_f32; 3];
        let mut total = 0.0_f32;
        for color in ParticleColor::VISIBLE {
            let count = stars.bucket(color.index()).len() as f32;
            if count == 0.0 {
                continue;
            }
            let (r, g, b) = color.rgb();
            target[0] += f32::from(r) * count;
            target[1] += f32::from(g) * count;
            target[2] += f32::from(b) * count;
            total += count;
        }
        let intensity = (total / 500.0).min(1.0).powf(0.3);
        let max_component = target[0].max(target[1]).max(target[2]).max(1.0);
        for (cur, t) in self.current.iter_mut().zip(target) {
            let normalized = t / max_component * lighting.saturation() * intensity;
            *cur += (normalized - *cur) / 10.0 * speed;
        }
    }

    /// Current tint as RGB bytes.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            self.current[0].round() as u8,
            self.current[1].round() as u8,
            self.current[2].round() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::StarSeed;

    fn pool_with(color: ParticleColor, count: usize) -> StarPool {
        let mut pool = StarPool::new();
        for _ in 0..count {
            pool.add(StarSeed {
                color,
                life: 1000.0,
                ..Default::default()
            });
        }
        pool
    }

    #[test]
    fn test_disabled_lighting_stays_black() {
        let pool = pool_with(ParticleColor::Red, 200);
        let mut sky = SkyColor::new();
        for _ in 0..100 {
            sky.update(SkyLighting::None, &pool, 1.0);
        }
        assert_eq!(sky.rgb(), (0, 0, 0));
    }

    #[test]
    fn test_sky_converges_toward_dominant_color() {
        let pool = pool_with(ParticleColor::Green, 500);
        let mut sky = SkyColor::new();
        for _ in 0..200 {
            sky.update(SkyLighting::Normal, &pool, 1.0);
        }
        let (r, g, b) = sky.rgb();
        assert!(g > r && g > b, "expected green-dominant tint, got {:?}", (r, g, b));
        // Saturation caps the brightest channel near the configured level.
        assert!(g <= 31);
    }

    #[test]
    fn test_dim_lighting_darker_than_normal() {
        let pool = pool_with(ParticleColor::White, 500);
        let mut dim = SkyColor::new();
        let mut normal = SkyColor::new();
        for _ in 0..200 {
            dim.update(SkyLighting::Dim, &pool, 1.0);
            normal.update(SkyLighting::Normal, &pool, 1.0);
        }
        assert!(dim.rgb().0 < normal.rgb().0);
    }

    #[test]
    fn test_empty_sky_fades_out() {
        let pool = pool_with(ParticleColor::Blue, 500);
        let mut sky = SkyColor::new();
        for _ in 0..200 {
            sky.update(SkyLighting::Normal, &pool, 1.0);
        }
        let lit = sky.rgb().2;
        let empty = StarPool::new();
        for _ in 0..400 {
            sky.update(SkyLighting::Normal, &empty, 1.0);
        }
        assert!(sky.rgb().2 < lit);
        assert!(sky.rgb().2 <= 1);
    }
}
