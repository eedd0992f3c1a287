//! Weighted random source
//!
//! Thin wrapper over a seeded `Pcg32` exposing the three draws the
//! simulation needs: a front-biased palette pick, an inclusive integer range
//! and a half-open real range.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::ValueRange;

#[derive(Debug, Clone)]
pub struct WeightedRng {
    seed: u64,
    rng: Pcg32,
}

impl WeightedRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed from the OS-seeded thread generator
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Pick one palette entry.
    ///
    /// Repetition in the palette encodes weight, and the index is drawn from
    /// a squared uniform so entries nearer the front are favoured further.
    /// Returns `None` only for an empty palette.
    pub fn pick<T: Copy>(&mut self, palette: &[T]) -> Option<T> {
        if palette.is_empty() {
            return None;
        }
        let u: f64 = self.rng.random();
        let index = (u * u * (palette.len() as f64 - 0.5) + 0.5) as usize;
        palette.get(index.min(palette.len() - 1)).copied()
    }

    /// Uniform integer in `[min, max]`
    pub fn range<T>(&mut self, min: T, max: T) -> T
    where
        T: rand::distr::uniform::SampleUniform + PartialOrd + Copy,
    {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Uniform real in `[min, max)`
    pub fn range_real(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Draw from an inclusive configured range
    pub fn within<T>(&mut self, bounds: ValueRange<T>) -> T
    where
        T: rand::distr::uniform::SampleUniform + PartialOrd + Copy,
    {
        self.range(bounds.min, bounds.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = WeightedRng::new(7);
        let mut b = WeightedRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.range(0, 1000), b.range(0, 1000));
        }
    }

    #[test]
    fn test_pick_empty_palette() {
        let mut rng = WeightedRng::new(1);
        let empty: [u32; 0] = [];
        assert_eq!(rng.pick(&empty), None);
    }

    #[test]
    fn test_pick_single_entry() {
        let mut rng = WeightedRng::new(1);
        for _ in 0..50 {
            assert_eq!(rng.pick(&[42u32]), Some(42));
        }
    }

    #[test]
    fn test_pick_favours_front() {
        let mut rng = WeightedRng::new(99);
        let palette: Vec<u32> = (0..10).collect();
        let mut counts = [0u32; 10];
        for _ in 0..20_000 {
            let v = rng.pick(&palette).expect("non-empty");
            counts[v as usize] += 1;
        }
        // Squared bias: the first entry is several times likelier than the last
        assert!(counts[0] > counts[9] * 2, "{counts:?}");
        assert!(counts.iter().all(|&c| c > 0), "{counts:?}");
    }

    #[test]
    fn test_range_inclusive() {
        let mut rng = WeightedRng::new(3);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let v = rng.range(1, 4);
            assert!((1..=4).contains(&v));
            seen_min |= v == 1;
            seen_max |= v == 4;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_range_real_half_open() {
        let mut rng = WeightedRng::new(5);
        for _ in 0..2_000 {
            let v = rng.range_real(0.0001, 0.001);
            assert!((0.0001..0.001).contains(&v));
        }
        assert_eq!(rng.range_real(2.0, 2.0), 2.0);
    }
}
