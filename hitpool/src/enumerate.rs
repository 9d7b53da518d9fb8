//! Enumerate every way a number of hits can be spread across a pool's groups.
//!
//! The search starts from the "left-packed" distribution, where each group
//! soaks up as many hits as it can before spilling over into the next one.
//! From there, hits are only ever shifted one at a time into groups further
//! to the right. A successor may move a hit out of the group its parent
//! moved out of, or any group left of it, and only into the group its parent
//! moved into or any group right of it. This keeps every path from the seed
//! canonical, so each distribution is reached exactly once.

use crate::{Error, TotalSize};
use claim::debug_assert_le;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::{cmp, collections::HashSet, fmt};

//////////////////
// Distribution //
//////////////////

/// The number of hits assigned to each group of a pool, in group order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Distribution(Vec<u32>);

impl Distribution {
    pub fn zeros(num_groups: usize) -> Self {
        Self(vec![0; num_groups])
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_hits(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }

    /// Draw each group as a bin holding one `X` per hit, e.g., `[2, 0, 1]`
    /// becomes `| X X | | X |`.
    pub fn to_partition_string(&self) -> String {
        let mut out = String::new();
        for &hits in &self.0 {
            out.push_str("| ");
            out.push_str(&"X ".repeat(hits as usize));
        }
        out.push('|');
        out
    }

    /// A fresh copy of `self` with one hit moved from group `source` into
    /// group `dest`. `self` is left untouched.
    fn shifted(&self, source: usize, dest: usize) -> Self {
        debug_assert!(self.0[source] > 0);

        let mut hits = self.0.clone();
        hits[source] -= 1;
        hits[dest] += 1;
        Self(hits)
    }
}

impl From<Vec<u32>> for Distribution {
    fn from(hits: Vec<u32>) -> Self {
        Self(hits)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use itertools::Itertools;
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

impl TotalSize for Distribution {
    fn total_size(&self) -> usize {
        self.0.total_size()
    }
}

/////////////
// Helpers //
/////////////

/// Convert a requested hit count into a `u32`, ensuring it's in the range
/// `[0, max_hits]`.
pub(crate) fn checked_hit_count(hits: i64, max_hits: u32) -> Result<u32, Error> {
    if (0..=i64::from(max_hits)).contains(&hits) {
        Ok(hits as u32)
    } else {
        Err(Error::InvalidHitCount { hits, max_hits })
    }
}

/// Greedily fill each group in order, so that every group left of the last
/// occupied group is full.
pub fn left_pack(capacities: &[u32], hits: u32) -> Distribution {
    let mut left = hits;
    let distr = capacities
        .iter()
        .map(|&capacity| {
            let take = cmp::min(left, capacity);
            left -= take;
            take
        })
        .collect();

    debug_assert_eq!(0, left);
    Distribution(distr)
}

/// The index of the last group holding any hits.
pub fn rightmost_occupied(hits: &[u32]) -> Option<usize> {
    hits.iter().rposition(|&h| h > 0)
}

fn check_limit(num_distributions: usize, limit: Option<usize>) -> Result<(), Error> {
    match limit {
        Some(limit) if num_distributions > limit => Err(Error::ResourceExhausted { limit }),
        _ => Ok(()),
    }
}

/////////////////
// SearchState //
/////////////////

/// A distribution along with the move that produced it.
struct SearchState {
    distr: Distribution,
    /// the group the last move took a hit out of
    source: usize,
    /// the group the last move put a hit into
    dest: usize,
}

impl SearchState {
    fn seed(distr: Distribution, rightmost: usize) -> Self {
        Self {
            distr,
            source: rightmost,
            dest: rightmost,
        }
    }

    /// Push every legal single-hit move from this state onto `stack`.
    fn push_successors(&self, capacities: &[u32], stack: &mut Vec<SearchState>) {
        let hits = self.distr.as_slice();

        for source in (0..=self.source).rev() {
            if hits[source] == 0 {
                continue;
            }

            // hits only ever move right
            let dest_start = cmp::max(self.dest, source + 1);

            for dest in dest_start..hits.len() {
                if hits[dest] < capacities[dest] {
                    let distr = self.distr.shifted(source, dest);
                    debug_assert_le!(distr.as_slice()[dest], capacities[dest]);

                    stack.push(SearchState {
                        distr,
                        source,
                        dest,
                    });
                }
            }
        }
    }
}

//////////////////////
// Enumerate search //
//////////////////////

/// Find every distribution of exactly `hits` hits over groups with the given
/// `capacities`. Each distribution appears once; the order is unspecified.
///
/// When `max_distributions` is set, the search fails with
/// [`Error::ResourceExhausted`] instead of producing more than that many
/// distributions.
pub fn enumerate_distributions(
    capacities: &[u32],
    hits: i64,
    max_distributions: Option<usize>,
) -> Result<Vec<Distribution>, Error> {
    let max_hits = capacities.iter().sum::<u32>();
    let total_hits = checked_hit_count(hits, max_hits)?;

    let seed = left_pack(capacities, total_hits);

    let rightmost = match rightmost_occupied(seed.as_slice()) {
        Some(rightmost) => rightmost,
        None => {
            // nothing to move around; the all-miss distribution is the only one.
            debug_assert_eq!(0, total_hits);
            check_limit(1, max_distributions)?;
            return Ok(vec![seed]);
        }
    };

    let mut stack = vec![SearchState::seed(seed, rightmost)];
    let mut seen = HashSet::new();
    let mut distrs = Vec::new();
    let mut duplicates: u64 = 0;

    while let Some(state) = stack.pop() {
        if !seen.insert(state.distr.clone()) {
            duplicates += 1;
            continue;
        }

        check_limit(distrs.len() + 1, max_distributions)?;

        state.push_successors(capacities, &mut stack);

        trace!(
            "enumerate_distributions: {} (source: {}, dest: {})",
            state.distr,
            state.source,
            state.dest
        );
        distrs.push(state.distr);
    }

    if duplicates > 0 {
        warn!(
            "enumerate_distributions: skipped {duplicates} duplicate distributions: capacities: {:?}, hits: {total_hits}",
            capacities
        );
    }

    debug!(
        "enumerate_distributions: capacities: {:?}, hits: {total_hits}, distributions: {}",
        capacities,
        distrs.len()
    );

    Ok(distrs)
}

#[cfg(test)]
mod test {
    use super::*;
    use claim::{assert_err, assert_ok};
    use itertools::Itertools;
    use proptest::{collection::vec, prelude::*};

    fn niters(n: u32) -> ProptestConfig {
        ProptestConfig::with_cases(n)
    }

    // brute force: try every vector under the capacities
    fn all_distributions_ref(capacities: &[u32], hits: u32) -> Vec<Vec<u32>> {
        if capacities.is_empty() {
            return if hits == 0 { vec![vec![]] } else { vec![] };
        }

        capacities
            .iter()
            .map(|&capacity| 0..=capacity)
            .multi_cartesian_product()
            .filter(|distr| distr.iter().sum::<u32>() == hits)
            .collect()
    }

    fn sorted(distrs: Vec<Distribution>) -> Vec<Vec<u32>> {
        let mut distrs = distrs
            .into_iter()
            .map(Distribution::into_vec)
            .collect::<Vec<_>>();
        distrs.sort_unstable();
        distrs
    }

    #[test]
    fn test_left_pack() {
        assert_eq!(vec![3, 1, 0], left_pack(&[3, 2, 2], 4).into_vec());
        assert_eq!(vec![0, 0, 0], left_pack(&[3, 2, 2], 0).into_vec());
        assert_eq!(vec![3, 2, 2], left_pack(&[3, 2, 2], 7).into_vec());
        assert_eq!(vec![2, 0, 1], left_pack(&[2, 0, 3], 3).into_vec());
        assert_eq!(Vec::<u32>::new(), left_pack(&[], 0).into_vec());
    }

    #[test]
    fn test_rightmost_occupied() {
        assert_eq!(Some(2), rightmost_occupied(&[2, 0, 1]));
        assert_eq!(Some(0), rightmost_occupied(&[1, 0, 0]));
        assert_eq!(Some(1), rightmost_occupied(&[0, 4, 0]));
        assert_eq!(None, rightmost_occupied(&[0, 0]));
        assert_eq!(None, rightmost_occupied(&[]));
    }

    #[test]
    fn test_distribution_display() {
        let distr = Distribution::from(vec![2, 0, 1]);
        assert_eq!("[2, 0, 1]", distr.to_string());
        assert_eq!("| X X | | X |", distr.to_partition_string());
        assert_eq!("|", Distribution::zeros(0).to_partition_string());
        assert_eq!(3, distr.total_hits());
    }

    #[test]
    fn test_enumerate_small() {
        let distrs = enumerate_distributions(&[3, 2, 2], 2, None).unwrap();
        assert_eq!(
            vec![
                vec![0, 0, 2],
                vec![0, 1, 1],
                vec![0, 2, 0],
                vec![1, 0, 1],
                vec![1, 1, 0],
                vec![2, 0, 0],
            ],
            sorted(distrs),
        );

        // full pool
        let distrs = enumerate_distributions(&[3, 2, 2], 7, None).unwrap();
        assert_eq!(vec![vec![3, 2, 2]], sorted(distrs));

        // empty group in the middle of the pool
        let distrs = enumerate_distributions(&[2, 0, 3], 3, None).unwrap();
        assert_eq!(all_distributions_ref(&[2, 0, 3], 3), sorted(distrs));
    }

    #[test]
    fn test_enumerate_no_hits() {
        assert_eq!(
            vec![vec![0, 0, 0]],
            sorted(enumerate_distributions(&[1, 2, 3], 0, None).unwrap())
        );
        assert_eq!(
            vec![Vec::<u32>::new()],
            sorted(enumerate_distributions(&[], 0, None).unwrap())
        );
    }

    #[test]
    fn test_enumerate_invalid_hits() {
        assert_eq!(
            Err(Error::InvalidHitCount {
                hits: 1,
                max_hits: 0
            }),
            enumerate_distributions(&[], 1, None)
        );
        assert_err!(enumerate_distributions(&[1], 2, None));
        assert_err!(enumerate_distributions(&[1, 1], -1, None));
    }

    #[test]
    fn test_enumerate_limit() {
        // (a, b, c) <= 2 where a + b + c = 3
        assert_eq!(
            7,
            enumerate_distributions(&[2, 2, 2], 3, None).unwrap().len()
        );
        assert_ok!(enumerate_distributions(&[2, 2, 2], 3, Some(7)));
        assert_eq!(
            Err(Error::ResourceExhausted { limit: 6 }),
            enumerate_distributions(&[2, 2, 2], 3, Some(6))
        );

        assert_ok!(enumerate_distributions(&[2, 2, 2], 0, Some(1)));
        assert_eq!(
            Err(Error::ResourceExhausted { limit: 0 }),
            enumerate_distributions(&[2, 2, 2], 0, Some(0))
        );
    }

    #[test]
    fn test_enumerate_matches_brute_force() {
        let arb_case = vec(0_u32..=5, 0..=4).prop_flat_map(|capacities| {
            let max_hits = capacities.iter().sum::<u32>();
            (Just(capacities), 0..=max_hits)
        });

        proptest!(niters(500), |((capacities, hits) in arb_case)| {
            let distrs = enumerate_distributions(&capacities, hits.into(), None).unwrap();

            for distr in &distrs {
                prop_assert_eq!(hits, distr.total_hits());
                prop_assert_eq!(capacities.len(), distr.len());
            }

            // sorted equality means no duplicates and nothing missing
            prop_assert_eq!(all_distributions_ref(&capacities, hits), sorted(distrs));
        });
    }

    #[test]
    fn test_enumerate_large_pool() {
        // 11 choose 4 ways to put 4 hits in 11 single-die groups
        let distrs = enumerate_distributions(&[1; 11], 4, None).unwrap();
        assert_eq!(330, distrs.len());

        let distrs = enumerate_distributions(&[4, 2, 12, 8], 10, None).unwrap();
        assert_eq!(all_distributions_ref(&[4, 2, 12, 8], 10), sorted(distrs));
    }
}
