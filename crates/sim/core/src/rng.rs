//! Seedable deterministic randomness source.
//!
//! The core never generates entropy itself: the caller supplies the seed at
//! engine construction and two runs with the same seed and turn sequence
//! consume identical random streams. The generator is PCG-XSH-RR (64-bit
//! state, 32-bit output), chosen for small state and reproducibility.

/// Deterministic PCG-XSH-RR random stream owned by one engine instance.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a stream from a caller-supplied seed.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = Self {
            state: seed.wrapping_add(Self::INCREMENT),
        };
        // Burn one step so nearby seeds diverge immediately.
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) -> u64 {
        let state = self.state;
        self.state = state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        state
    }

    /// Next 32-bit output (XSH-RR permutation of the advanced state).
    pub fn next_u32(&mut self) -> u32 {
        let state = self.step();
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX) / (1.0 + f64::EPSILON)
    }

    /// Uniform value in `[min, max]` inclusive.
    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + self.next_u32() % (max - min + 1)
    }

    /// Bernoulli trial with probability `p` (clamped to `[0, 1]`).
    ///
    /// Used by ability code for crit and effect-hit rolls.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::with_seed(42);
        let mut b = SimRng::with_seed(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::with_seed(1);
        let mut b = SimRng::with_seed(2);
        let a_vals: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let b_vals: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(a_vals, b_vals);
    }

    #[test]
    fn next_f64_stays_in_unit_interval() {
        let mut rng = SimRng::with_seed(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn range_is_inclusive_and_degenerate_safe() {
        let mut rng = SimRng::with_seed(9);
        for _ in 0..100 {
            let v = rng.range(3, 5);
            assert!((3..=5).contains(&v));
        }
        assert_eq!(rng.range(4, 4), 4);
    }
}
