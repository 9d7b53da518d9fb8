//! # hitpool
//!
//! An exact calculator for dice-pool "hit" odds.
//!
//! ## Explanation
//!
//! A pool is an ordered list of dice groups. Every die in a group shares the
//! same success threshold: a die rolled at or under its group's threshold is a
//! hit. Given a pool and a hit count, this crate computes the probability of
//! rolling exactly that many hits (or at least that many hits) across the
//! whole pool.
//!
//! The probability is assembled by enumerating every way the hits can be
//! spread across the groups (a [`Distribution`]), then weighting each way by
//! the number of per-die roll sequences that collapse to it. Weights are
//! computed with exact big-integer arithmetic; only the final per-distribution
//! contribution is moved into floating point.
//!
//! ```
//! use hitpool::{hits_probability, min_hits_probability, GroupSpec};
//!
//! // two dice that hit on 1-3 (of 6)
//! let groups = [GroupSpec::new(3, 2)];
//! assert_eq!(0.5, hits_probability(&groups, 1).unwrap());
//! assert_eq!(0.75, min_hits_probability(&groups, 1).unwrap());
//! ```

#[macro_use]
mod macros;

pub mod cli;
pub mod dice;
pub mod enumerate;
pub mod parse;
pub mod prob;
pub mod simulate;
mod stats;

pub use dice::{DicePool, GroupSpec};
pub use enumerate::{enumerate_distributions, Distribution};
pub use prob::{hits_pmf, Context, HitsPmf};

use num_bigint::BigUint;
use num_traits::{One, Zero};
use thiserror::Error;

pub(crate) const DEFAULT_FACES: u32 = 6;

////////////
// Errors //
////////////

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A malformed pool or distribution, or combinatorics inputs that don't
    /// add up.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid hit count: {hits}, expected a value in the range [0, {max_hits}]")]
    InvalidHitCount { hits: i64, max_hits: u32 },

    #[error("enumeration exceeded the limit of {limit} distributions")]
    ResourceExhausted { limit: usize },
}

/////////////////////////
// Boundary functions //
/////////////////////////

/// The probability of rolling exactly `total_hits` hits with the six-sided
/// dice pool `groups`.
pub fn hits_probability(groups: &[GroupSpec], total_hits: i64) -> Result<f64, Error> {
    let pool = DicePool::d6(groups)?;
    prob::hits_probability_with(&pool, total_hits, &mut Context::new())
}

/// The probability of rolling at least `min_hits` hits with the six-sided
/// dice pool `groups`. A negative `min_hits` is treated as zero, and asking
/// for more hits than there are dice returns `0.0`.
pub fn min_hits_probability(groups: &[GroupSpec], min_hits: i64) -> Result<f64, Error> {
    let pool = DicePool::d6(groups)?;
    prob::min_hits_probability_with(&pool, min_hits, &mut Context::new())
}

///////////////////
// Combinatorics //
///////////////////

/// `n!`, computed exactly.
pub fn factorial(n: u32) -> BigUint {
    (1..=n).fold(BigUint::one(), |acc, k| acc * k)
}

/// `n! / (parts[0]! * parts[1]! * .. * parts[m]!)`, the number of distinct
/// orderings of `n` items split into runs of identical items of the given
/// sizes. `parts` must sum to `n`.
pub fn multinomial_coefficient(n: u32, parts: &[u32]) -> Result<BigUint, Error> {
    let sum = parts.iter().map(|&k| u64::from(k)).sum::<u64>();
    if sum != u64::from(n) {
        return Err(Error::Validation(format!(
            "multinomial parts {:?} sum to {}, expected {}",
            parts, sum, n
        )));
    }

    let denom = parts
        .iter()
        .fold(BigUint::one(), |acc, &k| acc * factorial(k));

    Ok(factorial(n) / denom)
}

/// count `n choose k` without replacement.
pub fn num_combinations(n: u32, k: u32) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    factorial(n) / (factorial(k) * factorial(n - k))
}

/////////////////////
// TotalSize trait //
/////////////////////

/// A trait for computing the total size of a data structure in memory. That means
/// not just the size on the stack, but also the total size of any owned resources.
pub trait TotalSize: Sized {
    /// Types whose total size is known statically, like a `u32`, can return a
    /// constant here. Types that own variable-size resources must return `None`
    /// here and override [`TotalSize::total_size`].
    fn static_size() -> Option<usize> {
        None
    }
    fn total_size(&self) -> usize {
        Self::static_size().unwrap_or_else(std::mem::size_of::<Self>)
    }
}

impl_total_size_static!(u32);

impl<T> TotalSize for Vec<T>
where
    T: TotalSize,
{
    fn total_size(&self) -> usize {
        let inner_size = if let Some(elt_size) = T::static_size() {
            self.len() * elt_size
        } else {
            self.iter().map(|x| x.total_size()).sum()
        };
        std::mem::size_of::<Self>() + inner_size
    }
}

///////////
// Tests //
///////////
