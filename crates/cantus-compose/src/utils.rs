//! Shared helpers for the generation stages.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use cantus_spec::derive_stage_seed;

/// Create a deterministic RNG for a stage and an index within it.
///
/// Streams are independent per `(seed, stage, index)`, so a stage can draw
/// per-section randomness without disturbing its neighbours.
pub fn rng_for(seed: u64, stage: &str, index: u32) -> Pcg32 {
    Pcg32::seed_from_u64(derive_stage_seed(seed, stage, index))
}

/// Generate a Euclidean rhythm of `pulses` onsets spread over `steps` slots.
///
/// Produces the Bjorklund distribution rotated so the first step is an onset.
pub fn bjorklund(steps: usize, pulses: usize) -> Vec<bool> {
    if pulses == 0 {
        return vec![false; steps];
    }
    if pulses >= steps {
        return vec![true; steps];
    }
    (0..steps).map(|i| (i * pulses) % steps < pulses).collect()
}

/// Rotate a rhythm right by `offset` steps.
pub fn rotate(pattern: &[bool], offset: usize) -> Vec<bool> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let n = pattern.len();
    (0..n).map(|i| pattern[(i + n - offset % n) % n]).collect()
}

/// Pick an index with probability proportional to its weight.
///
/// Returns `None` when no weight is positive and finite.
pub fn weighted_index<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights
        .iter()
        .filter(|w| w.is_finite() && **w > 0.0)
        .sum();
    if total <= 0.0 {
        return None;
    }
    let mut target = rng.gen::<f64>() * total;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if !(w.is_finite() && w > 0.0) {
            continue;
        }
        if target < w {
            return Some(i);
        }
        target -= w;
        last = Some(i);
    }
    last
}

/// Velocity scaled by tension: `base + tension * span + accent`, clamped to 1..=127.
pub fn velocity(base: f64, span: f64, tension: f64, accent: f64) -> u8 {
    (base + tension.clamp(0.0, 1.0) * span + accent)
        .round()
        .clamp(1.0, 127.0) as u8
}

/// Clamp an integer pitch into MIDI range.
pub fn clamp_midi(pitch: i32) -> u8 {
    pitch.clamp(0, 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_tresillo() {
        let pattern = bjorklund(8, 3);
        let s: String = pattern.iter().map(|&b| if b { 'x' } else { '.' }).collect();
        assert_eq!(s, "x..x..x.");
    }

    #[test]
    fn euclidean_edges() {
        assert_eq!(bjorklund(4, 0), vec![false; 4]);
        assert_eq!(bjorklund(4, 4), vec![true; 4]);
        assert_eq!(bjorklund(5, 2).iter().filter(|&&b| b).count(), 2);
    }

    #[test]
    fn rotate_wraps() {
        let pattern = vec![true, false, false];
        assert_eq!(rotate(&pattern, 1), vec![false, true, false]);
        assert_eq!(rotate(&pattern, 3), pattern);
    }

    #[test]
    fn rng_streams_are_reproducible() {
        let mut a = rng_for(9, "melody", 2);
        let mut b = rng_for(9, "melody", 2);
        let mut other = rng_for(9, "melody", 3);
        let first: u32 = a.gen();
        assert_eq!(first, b.gen::<u32>());
        assert_ne!(first, other.gen::<u32>());
    }

    #[test]
    fn velocity_scales_and_clamps() {
        assert_eq!(velocity(50.0, 60.0, 0.5, 0.0), 80);
        assert_eq!(velocity(50.0, 60.0, 2.0, 30.0), 127);
        assert_eq!(velocity(0.0, 0.0, 0.0, -5.0), 1);
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = rng_for(1, "test", 0);
        for _ in 0..100 {
            let i = weighted_index(&mut rng, &[0.0, 1.0, 0.0]).unwrap();
            assert_eq!(i, 1);
        }
        assert!(weighted_index(&mut rng, &[0.0, -1.0]).is_none());
        assert!(weighted_index(&mut rng, &[]).is_none());
    }
}
