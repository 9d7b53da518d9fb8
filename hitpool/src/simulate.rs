//! Monte Carlo rolls of a dice pool, for sanity checking the exact engine.

use crate::{dice::DicePool, prob::HitsPmf, stats};
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro64Star;

pub struct Roller<'a> {
    pool: &'a DicePool,
    rng: Xoroshiro64Star,
}

impl<'a> Roller<'a> {
    pub fn new(pool: &'a DicePool, seed: u64) -> Self {
        Self {
            pool,
            rng: Xoroshiro64Star::seed_from_u64(seed),
        }
    }

    /// Roll every die in the pool once and count the hits.
    pub fn roll(&mut self) -> u32 {
        let faces = self.pool.faces();
        let mut hits = 0;

        for group in self.pool.groups() {
            for _ in 0..group.capacity() {
                let face = self.rng.gen_range(1..=faces);
                if face <= group.threshold() {
                    hits += 1;
                }
            }
        }

        hits
    }

    /// Roll the pool `n` times. `counts[h]` is the number of rolls with exactly
    /// `h` hits.
    pub fn sample_counts(&mut self, n: usize) -> Array1<usize> {
        let mut counts = Array1::zeros(self.pool.total_dice() as usize + 1);
        for _ in 0..n {
            counts[self.roll() as usize] += 1;
        }
        counts
    }

    /// The empirical hits PMF after `n` rolls.
    pub fn sample_pmf(&mut self, n: usize) -> Array1<f64> {
        self.sample_counts(n)
            .mapv(|count| (count as f64) / (n.max(1) as f64))
    }
}

/// How plausible is it that `p_hat`, sampled from `n` rolls, came from the exact
/// `pmf`? Returns the G-test p-value.
pub fn goodness_of_fit(pmf: &HitsPmf, n: usize, p_hat: &Array1<f64>) -> f64 {
    stats::multinomial_test(n, pmf.view(), p_hat.view())
}
