//! Injectable randomness for combat sampling.
//!
//! The core never touches system randomness. Combat destruction picks
//! its victims through the [`Sampler`] trait so resolutions are
//! reproducible under test: same seed, same inputs, same destroyed set.

/// Source of uniform without-replacement samples.
pub trait Sampler {
    /// Draw `count` distinct indices from `0..population`, each subset
    /// equally likely. `count` greater than `population` yields the full
    /// index set.
    fn sample(&mut self, population: usize, count: usize) -> Vec<usize>;
}

/// Seeded multiplicative congruential generator.
///
/// Deterministic across platforms; not cryptographic, which combat
/// sampling does not need.
#[derive(Debug, Clone)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a generator from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5DEE_CE66D).wrapping_add(11);
        self.state
    }

    fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next() % bound
    }
}

impl Sampler for GameRng {
    fn sample(&mut self, population: usize, count: usize) -> Vec<usize> {
        let count = count.min(population);
        let mut indices: Vec<usize> = (0..population).collect();
        // Partial Fisher-Yates: after i swaps, the first i entries are a
        // uniform without-replacement draw.
        for i in 0..count {
            let j = i + self.next_below((population - i) as u64) as usize;
            indices.swap(i, j);
        }
        indices.truncate(count);
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_distinct_and_in_range() {
        let mut rng = GameRng::new(42);
        let picked = rng.sample(10, 4);
        assert_eq!(picked.len(), 4);
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert!(picked.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_same_seed_same_draw() {
        let a = GameRng::new(7).sample(50, 10);
        let b = GameRng::new(7).sample(50, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = GameRng::new(1).sample(50, 10);
        let b = GameRng::new(2).sample(50, 10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_count_clamped_to_population() {
        let mut rng = GameRng::new(3);
        let picked = rng.sample(3, 8);
        let mut sorted = picked;
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_population() {
        let mut rng = GameRng::new(3);
        assert!(rng.sample(0, 5).is_empty());
    }

    #[test]
    fn test_roughly_uniform_over_indices() {
        // Every index should be picked a reasonable share of the time.
        let mut counts = [0u32; 5];
        for seed in 0..2000 {
            let mut rng = GameRng::new(seed);
            for index in rng.sample(5, 2) {
                counts[index] += 1;
            }
        }
        // 2000 draws of 2 from 5: expectation 800 per index.
        for &count in &counts {
            assert!(count > 500, "index badly under-sampled: {counts:?}");
            assert!(count < 1100, "index badly over-sampled: {counts:?}");
        }
    }
}
