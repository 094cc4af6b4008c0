//! Weighted selection of write operation kinds.
//!
//! A [`WriteMix`] holds an ordered set of `(kind, weight)` pairs and draws
//! kinds with probability proportional to their weight. Weights are relative
//! probability mass, not percentages; they need not sum to 100.

use rand::Rng;

/// The kind of write operation to perform against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Write the identifier as the value of the target key.
    Put,
}

/// Error type for write mix construction.
#[derive(Debug, thiserror::Error)]
pub enum MixError {
    /// The mix contains no entries at all.
    #[error("write mix must contain at least one operation kind")]
    Empty,

    /// Every entry has weight zero, so no kind could ever be drawn.
    #[error("write mix weights sum to zero")]
    ZeroWeightSum,
}

/// An ordered set of weighted operation kinds.
///
/// Validation happens once at construction; drawing never fails afterwards.
/// Iteration order is fixed, so a seeded random source produces a
/// reproducible sequence of kinds.
#[derive(Debug, Clone)]
pub struct WriteMix<T> {
    entries: Vec<(T, u32)>,
    weight_sum: u64,
}

impl<T: Copy> WriteMix<T> {
    /// Creates a mix from `(kind, weight)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`MixError::Empty`] if `entries` is empty, or
    /// [`MixError::ZeroWeightSum`] if all weights are zero.
    pub fn new(entries: Vec<(T, u32)>) -> Result<Self, MixError> {
        if entries.is_empty() {
            return Err(MixError::Empty);
        }

        let weight_sum: u64 = entries.iter().map(|(_, weight)| u64::from(*weight)).sum();
        if weight_sum == 0 {
            return Err(MixError::ZeroWeightSum);
        }

        Ok(Self {
            entries,
            weight_sum,
        })
    }

    /// Draws one kind, with probability proportional to its weight.
    ///
    /// Linear-scan selection: draw `roll` uniformly in `[0, weight_sum)`,
    /// then subtract weights in entry order until `roll` falls inside the
    /// current entry.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> T {
        let mut roll = rng.gen_range(0..self.weight_sum);
        for (kind, weight) in &self.entries {
            let weight = u64::from(*weight);
            if roll < weight {
                return *kind;
            }
            roll -= weight;
        }
        // roll < weight_sum and the weights sum to weight_sum, so the scan
        // always terminates inside an entry once construction validated.
        unreachable!("write mix weight sum invariant violated");
    }

    /// Returns the configured `(kind, weight)` pairs in draw order.
    #[must_use]
    pub fn entries(&self) -> &[(T, u32)] {
        &self.entries
    }

    /// Returns the sum of all weights.
    #[must_use]
    pub const fn weight_sum(&self) -> u64 {
        self.weight_sum
    }
}

impl Default for WriteMix<OperationKind> {
    /// The default traffic mix: `Put` only, at weight 100.
    fn default() -> Self {
        Self {
            entries: vec![(OperationKind::Put, 100)],
            weight_sum: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestKind {
        A,
        B,
    }

    #[test]
    fn test_empty_mix_rejected() {
        let result = WriteMix::<TestKind>::new(vec![]);
        assert!(matches!(result, Err(MixError::Empty)));
    }

    #[test]
    fn test_zero_weight_sum_rejected() {
        let result = WriteMix::new(vec![(TestKind::A, 0), (TestKind::B, 0)]);
        assert!(matches!(result, Err(MixError::ZeroWeightSum)));
    }

    #[test]
    fn test_single_kind_always_selected() {
        let mix = WriteMix::new(vec![(TestKind::A, 100)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for _ in 0..1000 {
            assert_eq!(mix.pick(&mut rng), TestKind::A);
        }
    }

    #[test]
    fn test_zero_weight_entry_never_selected() {
        let mix = WriteMix::new(vec![(TestKind::A, 0), (TestKind::B, 5)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1000 {
            assert_eq!(mix.pick(&mut rng), TestKind::B);
        }
    }

    #[test]
    fn test_weighted_selection_converges() {
        let mix = WriteMix::new(vec![(TestKind::A, 1), (TestKind::B, 3)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let draws = 100_000;
        let mut b_count = 0u64;
        for _ in 0..draws {
            if mix.pick(&mut rng) == TestKind::B {
                b_count += 1;
            }
        }

        // Expected 75%, allow 1% tolerance at 100k draws.
        #[allow(clippy::cast_precision_loss)]
        let b_ratio = b_count as f64 / f64::from(draws);
        assert!(
            (b_ratio - 0.75).abs() < 0.01,
            "B ratio {b_ratio} not close to 0.75"
        );
    }

    #[test]
    fn test_seeded_draws_reproducible() {
        let mix = WriteMix::new(vec![(TestKind::A, 2), (TestKind::B, 5)]).unwrap();
        let mut rng1 = ChaCha8Rng::seed_from_u64(123);
        let mut rng2 = ChaCha8Rng::seed_from_u64(123);

        for _ in 0..500 {
            assert_eq!(mix.pick(&mut rng1), mix.pick(&mut rng2));
        }
    }

    #[test]
    fn test_default_mix_is_put_only() {
        let mix = WriteMix::default();
        assert_eq!(mix.entries(), &[(OperationKind::Put, 100)]);
        assert_eq!(mix.weight_sum(), 100);
    }

    #[test]
    fn test_weight_sum_accumulates() {
        let mix = WriteMix::new(vec![(TestKind::A, 1), (TestKind::B, 3)]).unwrap();
        assert_eq!(mix.weight_sum(), 4);
        assert_eq!(mix.entries().len(), 2);
    }
}
