//! Burst geometry: angular distributions for spherical and ring bursts.
//!
//! A naive uniform angle draw clumps stars near the poles of the burst. The
//! ring construction here slices the burst into latitude rings sized by
//! cosine so the flattened 2D projection reads as an even sphere.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use fastrand::Rng;

/// Angles for a spherical burst of roughly `count` stars.
///
/// Returns `(angle, ring_weight)` pairs. The weight is the cosine of the
/// ring's latitude, in `(0, 1]`; effects that want a visible 3D falloff
/// scale star speed by it. Actual pair count tracks `count` loosely, the
/// ring quantization lands within about +-30%.
///
/// `start` rotates the whole pattern; `arc` limits it to a partial sweep
/// (`TAU` for a full circle). A `count` below one yields no angles.
#[must_use]
pub fn burst_angles(rng: &mut Rng, count: f32, start: f32, arc: f32) -> Vec<(f32, f32)> {
    let mut out = Vec::new();
    if count < 1.0 {
        return out;
    }
    let r = 0.5 * (count / PI).sqrt();
    let c = 2.0 * r * PI;
    let c_half = c / 2.0;
    let mut i = 0.0_f32;
    while i <= c_half {
        let ring_angle = i / c_half * FRAC_PI_2;
        let ring_size = ring_angle.cos();
        let parts_per_full_ring = c * ring_size;
        // Rings too small to hold a single star would blow up the angle
        // increment; skip them.
        if parts_per_full_ring < 1.0 {
            i += 1.0;
            continue;
        }
        let parts_per_arc = parts_per_full_ring * (arc / TAU);
        let angle_inc = TAU / parts_per_full_ring;
        let angle_offset = rng.f32() * angle_inc + start;
        let mut j = 0.0_f32;
        while j < parts_per_arc {
            let jitter = rng.f32() * angle_inc * 0.33;
            out.push((angle_offset + j * angle_inc + jitter, ring_size));
            j += 1.0;
        }
        i += 1.0;
    }
    out
}

/// Evenly spaced angles across an arc, walked outward from `start`.
///
/// Produces roughly `count` angles covering `[start, start + arc)`. A
/// negative `arc` walks the sweep downward instead. `randomness` jitters
/// each angle by up to that fraction of the spacing; zero gives an exact
/// lattice.
#[must_use]
pub fn arc_angles(rng: &mut Rng, start: f32, arc: f32, count: f32, randomness: f32) -> Vec<f32> {
    let mut out = Vec::new();
    if count < 1.0 {
        return out;
    }
    let delta = arc / count;
    let end = start + arc - delta * 0.5;
    let mut angle = start;
    if end > start {
        while angle < end {
            out.push(angle + rng.f32() * delta * randomness);
            angle += delta;
        }
    } else {
        while angle > end {
            out.push(angle + rng.f32() * delta * randomness);
            angle += delta;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_burst_count_tracks_request() {
        let mut rng = Rng::with_seed(0x5eed);
        let angles = burst_angles(&mut rng, 100.0, 0.0, TAU);
        // Ring quantization of 100 lands around 113 for a full circle.
        assert!(
            (90..=130).contains(&angles.len()),
            "got {} angles",
            angles.len()
        );
    }

    #[test]
    fn test_burst_below_one_is_empty() {
        let mut rng = Rng::with_seed(0x5eed);
        assert!(burst_angles(&mut rng, 0.5, 0.0, TAU).is_empty());
        assert!(burst_angles(&mut rng, 0.0, 0.0, TAU).is_empty());
    }

    #[test]
    fn test_burst_angles_spread_evenly() {
        let mut rng = Rng::with_seed(0x5eed);
        let angles = burst_angles(&mut rng, 400.0, 0.0, TAU);
        let mut bins = [0usize; 8];
        for &(a, _) in &angles {
            let wrapped = a.rem_euclid(TAU);
            let bin = ((wrapped / TAU * 8.0) as usize).min(7);
            bins[bin] += 1;
        }
        let expected = angles.len() / 8;
        for (i, &n) in bins.iter().enumerate() {
            assert!(
                n > expected / 2 && n < expected * 2,
                "bin {i} holds {n} of ~{expected}"
            );
        }
    }

    #[test]
    fn test_burst_weights_in_unit_range() {
        let mut rng = Rng::with_seed(0x5eed);
        for (_, w) in burst_angles(&mut rng, 200.0, 0.0, TAU) {
            assert!(w > 0.0 && w <= 1.0);
        }
    }

    #[test]
    fn test_arc_exact_lattice_without_randomness() {
        let mut rng = Rng::with_seed(0x5eed);
        let angles = arc_angles(&mut rng, 0.0, TAU, 8.0, 0.0);
        assert_eq!(angles.len(), 8);
        let delta = TAU / 8.0;
        for (i, a) in angles.iter().enumerate() {
            assert!((a - i as f32 * delta).abs() < 1e-4);
        }
    }

    #[test]
    fn test_arc_below_one_is_empty() {
        let mut rng = Rng::with_seed(0x5eed);
        assert!(arc_angles(&mut rng, 0.0, TAU, 0.9, 0.5).is_empty());
    }

    #[test]
    fn test_arc_negative_sweep_descends() {
        let mut rng = Rng::with_seed(0x5eed);
        let angles = arc_angles(&mut rng, PI, -PI, 4.0, 0.0);
        assert_eq!(angles.len(), 4);
        let delta = PI / 4.0;
        for (i, a) in angles.iter().enumerate() {
            assert!((a - (PI - i as f32 * delta)).abs() < 1e-4);
        }
    }

    proptest! {
        #[test]
        fn prop_burst_total_near_request(
            count in 16.0_f32..600.0,
            seed in 0_u64..1000,
        ) {
            let mut rng = Rng::with_seed(seed);
            let angles = burst_angles(&mut rng, count, 0.0, TAU);
            let n = angles.len() as f32;
            prop_assert!(n >= count * 0.8 && n <= count * 1.45,
                "count {count} produced {n}");
            for (a, w) in angles {
                prop_assert!(a.is_finite());
                prop_assert!(w.is_finite());
            }
        }

        #[test]
        fn prop_arc_angles_stay_in_sweep(
            start in -10.0_f32..10.0,
            count in 1.0_f32..64.0,
            randomness in 0.0_f32..1.0,
            seed in 0_u64..1000,
        ) {
            let mut rng = Rng::with_seed(seed);
            let arc = TAU;
            let angles = arc_angles(&mut rng, start, arc, count, randomness);
            prop_assert!(!angles.is_empty());
            for a in angles {
                prop_assert!(a.is_finite());
                prop_assert!(a >= start - 1e-3);
                prop_assert!(a <= start + arc + arc / count);
            }
        }
    }
}
