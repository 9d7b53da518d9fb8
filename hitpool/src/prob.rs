use crate::{
    dice::DicePool,
    enumerate::{checked_hit_count, enumerate_distributions, Distribution},
    multinomial_coefficient, Error,
};
use approx::relative_eq;
use log::{debug, trace};
use ndarray::{Array1, ArrayView1};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use std::{borrow::Borrow, cmp, collections::HashMap, hash::Hash};

///////////
// Cache //
///////////

pub struct Cache<K, V> {
    store: HashMap<K, V>,
    hits: u32,
    misses: u32,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn new() -> Self {
        Self {
            store: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn peek_cache<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash,
    {
        let out = self.store.get(key).cloned();
        if out.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        out
    }

    fn fill_cache(&mut self, key: K, value: V) -> V {
        let out = value.clone();
        self.store.insert(key, value);
        out
    }

    pub fn cache_size(&self) -> usize {
        self.store.len()
    }

    pub fn cache_hits(&self) -> u32 {
        self.hits
    }

    pub fn cache_misses(&self) -> u32 {
        self.misses
    }

    pub fn cache_hit_rate(&self) -> f32 {
        let total_queries = self.hits + self.misses;
        if total_queries == 0 {
            0.0
        } else {
            (self.hits as f32) / (total_queries as f32)
        }
    }
}

////////////////////////
// Evaluation Context //
////////////////////////

/// Evaluation state passed along while computing probabilities for a single
/// query. Results are the same with or without a warm `Context`; it only holds
/// limits, memoized weights, and evaluation statistics. A `Context` is never
/// meant to be shared between threads.
pub struct Context {
    /// Fail instead of enumerating more than this many distributions for a
    /// single hit count.
    max_distributions: Option<usize>,
    /// `(capacity, hits) -> capacity choose hits`
    weight_cache: Cache<(u32, u32), BigUint>,
    distributions_explored: u64,
}

impl Context {
    pub fn new() -> Self {
        Self {
            max_distributions: None,
            weight_cache: Cache::new(),
            distributions_explored: 0,
        }
    }

    pub fn with_max_distributions(max_distributions: usize) -> Self {
        let mut ctxt = Self::new();
        ctxt.set_max_distributions(Some(max_distributions));
        ctxt
    }

    #[inline]
    pub fn set_max_distributions(&mut self, max_distributions: Option<usize>) -> &mut Self {
        self.max_distributions = max_distributions;
        self
    }

    #[inline]
    pub fn max_distributions(&self) -> Option<usize> {
        self.max_distributions
    }

    #[inline]
    pub fn distributions_explored(&self) -> u64 {
        self.distributions_explored
    }

    #[inline]
    pub fn weight_cache(&self) -> &Cache<(u32, u32), BigUint> {
        &self.weight_cache
    }

    fn group_weight(&mut self, capacity: u32, hits: u32) -> Result<BigUint, Error> {
        if let Some(weight) = self.weight_cache.peek_cache(&(capacity, hits)) {
            return Ok(weight);
        }

        let weight = group_weight(capacity, hits)?;
        Ok(self.weight_cache.fill_cache((capacity, hits), weight))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

//////////////////////////////
// Per-distribution scoring //
//////////////////////////////

/// The number of hit/miss sequences of `capacity` dice with exactly `hits` hits.
fn group_weight(capacity: u32, hits: u32) -> Result<BigUint, Error> {
    let misses = capacity.checked_sub(hits).ok_or_else(|| {
        Error::Validation(format!(
            "can't fit {hits} hits in a group of {capacity} dice"
        ))
    })?;
    multinomial_coefficient(capacity, &[hits, misses])
}

fn event_probability_unchecked(pool: &DicePool, distr: &Distribution) -> f64 {
    pool.groups()
        .iter()
        .zip(distr.as_slice())
        .enumerate()
        .map(|(idx, (group, &hits))| {
            let p_hit = pool.p_hit(idx);
            let misses = group.capacity() - hits;
            p_hit.powi(hits as i32) * (1.0 - p_hit).powi(misses as i32)
        })
        .product()
}

/// The probability of one _specific_ hit/miss sequence that reduces to `distr`,
/// e.g., for a pool with capacities `[3, 2, 2]` and a distribution `[2, 0, 0]`,
/// this is `Pr[H H M | M M | M M]`.
pub fn event_probability(pool: &DicePool, distr: &Distribution) -> Result<f64, Error> {
    pool.check_distribution(distr)?;
    Ok(event_probability_unchecked(pool, distr))
}

fn arrangement_weight_with(
    pool: &DicePool,
    distr: &Distribution,
    ctxt: &mut Context,
) -> Result<BigUint, Error> {
    pool.groups()
        .iter()
        .zip(distr.as_slice())
        .try_fold(BigUint::one(), |acc, (group, &hits)| -> Result<_, Error> {
            Ok(acc * ctxt.group_weight(group.capacity(), hits)?)
        })
}

/// The number of distinct hit/miss sequences that reduce to `distr`.
///
/// For example, capacities `[3, 2, 2]` and distribution `[2, 0, 0]` has
/// `3 * 1 * 1 = 3` arrangements:
///
/// ```text
/// [H H M | M M | M M]
/// [H M H | M M | M M]
/// [M H H | M M | M M]
/// ```
pub fn arrangement_weight(pool: &DicePool, distr: &Distribution) -> Result<BigUint, Error> {
    pool.check_distribution(distr)?;
    arrangement_weight_with(pool, distr, &mut Context::new())
}

/// A distribution along with its arrangement weight and event probability.
#[derive(Clone, Debug)]
pub struct ScoredDistribution {
    pub distr: Distribution,
    pub weight: BigUint,
    pub p_event: f64,
}

impl ScoredDistribution {
    /// `weight * p_event`, i.e., Pr[the pool rolls `distr`]
    pub fn probability(&self) -> f64 {
        // weights are bounded by `MAX_POOL_DICE choose (MAX_POOL_DICE / 2)`,
        // which fits in an f64.
        self.weight.to_f64().unwrap_or(f64::INFINITY) * self.p_event
    }
}

/// Enumerate and score every distribution of exactly `hits` hits.
pub fn scored_distributions(
    pool: &DicePool,
    hits: i64,
    ctxt: &mut Context,
) -> Result<Vec<ScoredDistribution>, Error> {
    let distrs = enumerate_distributions(&pool.capacities(), hits, ctxt.max_distributions)?;
    ctxt.distributions_explored += distrs.len() as u64;

    distrs
        .into_iter()
        .map(|distr| -> Result<_, Error> {
            let weight = arrangement_weight_with(pool, &distr, ctxt)?;
            let p_event = event_probability_unchecked(pool, &distr);
            Ok(ScoredDistribution {
                distr,
                weight,
                p_event,
            })
        })
        .collect()
}

/////////////////
// Aggregation //
/////////////////

/// Pr[the pool rolls exactly `hits` hits]
pub fn hits_probability_with(pool: &DicePool, hits: i64, ctxt: &mut Context) -> Result<f64, Error> {
    let scored = scored_distributions(pool, hits, ctxt)?;

    let p = scored.iter().fold(0.0, |p, scored| {
        let p_distr = scored.probability();
        trace!(
            "hits_probability: {} weight: {}, p_event: {}, p: {}",
            scored.distr,
            scored.weight,
            scored.p_event,
            p_distr
        );
        p + p_distr
    });

    debug!(
        "hits_probability: pool: {pool}, hits: {hits}, distributions: {}, p: {p}",
        scored.len()
    );

    Ok(p.min(1.0))
}

/// Pr[the pool rolls at least `min_hits` hits]
pub fn min_hits_probability_with(
    pool: &DicePool,
    min_hits: i64,
    ctxt: &mut Context,
) -> Result<f64, Error> {
    let max_hits = i64::from(pool.total_dice());

    if min_hits > max_hits {
        return Ok(0.0);
    }

    let mut p = 0.0;
    for hits in cmp::max(min_hits, 0)..=max_hits {
        p += hits_probability_with(pool, hits, ctxt)?;
    }

    debug!("min_hits_probability: pool: {pool}, min hits: {min_hits}, p: {p}");

    Ok(p.min(1.0))
}

//////////////
// Hits PMF //
//////////////

/// The full probability mass function over the number of hits a pool can roll,
/// indexed by hit count.
#[derive(Clone, Debug, PartialEq)]
pub struct HitsPmf(Array1<f64>);

impl HitsPmf {
    #[inline]
    pub fn max_hits(&self) -> u32 {
        (self.0.len() - 1) as u32
    }

    #[inline]
    pub fn view(&self) -> ArrayView1<f64> {
        self.0.view()
    }

    /// Pr[hits = `hits`]
    pub fn p_exactly(&self, hits: i64) -> f64 {
        match checked_hit_count(hits, self.max_hits()) {
            Ok(hits) => self.0[hits as usize],
            Err(_) => 0.0,
        }
    }

    /// Pr[hits >= `hits`]
    pub fn p_at_least(&self, hits: i64) -> f64 {
        let start = cmp::max(hits, 0) as usize;
        if start >= self.0.len() {
            return 0.0;
        }
        // sum in increasing hit order, same as `min_hits_probability_with`.
        let p = self.0.iter().skip(start).sum::<f64>();
        p.min(1.0)
    }

    /// `survival[h] = Pr[hits >= h]`
    pub fn survival(&self) -> Array1<f64> {
        (0..self.0.len())
            .map(|hits| self.p_at_least(hits as i64))
            .collect()
    }

    pub fn total_mass(&self) -> f64 {
        self.0.sum()
    }

    pub fn expected_hits(&self) -> f64 {
        self.0
            .iter()
            .enumerate()
            .map(|(hits, &p_hits)| (hits as f64) * p_hits)
            .sum()
    }

    pub fn is_normalized(&self) -> bool {
        relative_eq!(1.0, self.total_mass(), epsilon = 1.0e-9)
    }
}

impl From<Vec<f64>> for HitsPmf {
    /// `pmf[h]` = Pr[hits = h]. `pmf` must not be empty.
    fn from(pmf: Vec<f64>) -> Self {
        debug_assert!(!pmf.is_empty());
        Self(Array1::from_vec(pmf))
    }
}

/// Compute Pr[hits = h] for every `h` the pool can roll.
pub fn hits_pmf(pool: &DicePool, ctxt: &mut Context) -> Result<HitsPmf, Error> {
    time!("hits_pmf", {
        let pmf = (0..=i64::from(pool.total_dice()))
            .map(|hits| hits_probability_with(pool, hits, ctxt))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HitsPmf::from(pmf))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{dice::prop::arb_pool, num_combinations, GroupSpec};
    use approx::assert_relative_eq;
    use claim::{assert_err, assert_gt};
    use proptest::prelude::*;

    fn niters(n: u32) -> ProptestConfig {
        ProptestConfig::with_cases(n)
    }

    fn pool(faces: u32, groups: &[(i64, i64)]) -> DicePool {
        let specs = groups
            .iter()
            .map(|&(threshold, capacity)| GroupSpec::new(threshold, capacity))
            .collect::<Vec<_>>();
        DicePool::new(faces, &specs).unwrap()
    }

    // roll the dice one at a time, convolving each Bernoulli trial into the
    // running hits distribution.
    fn hits_pmf_ref(pool: &DicePool) -> Vec<f64> {
        let mut pmf = vec![1.0];
        for (idx, group) in pool.groups().iter().enumerate() {
            let p_hit = pool.p_hit(idx);
            for _ in 0..group.capacity() {
                let mut next = vec![0.0; pmf.len() + 1];
                for (hits, &p) in pmf.iter().enumerate() {
                    next[hits] += p * (1.0 - p_hit);
                    next[hits + 1] += p * p_hit;
                }
                pmf = next;
            }
        }
        pmf
    }

    #[test]
    fn test_event_probability() {
        let pool = pool(6, &[(1, 3), (2, 2), (3, 2)]);
        let distr = Distribution::from(vec![2, 0, 0]);

        let expected = (1.0_f64 / 6.0).powi(2)
            * (5.0 / 6.0)
            * (2.0_f64 / 3.0).powi(2)
            * (1.0_f64 / 2.0).powi(2);
        assert_relative_eq!(expected, event_probability(&pool, &distr).unwrap());

        assert_err!(event_probability(&pool, &Distribution::from(vec![4, 0, 0])));
    }

    #[test]
    fn test_arrangement_weight() {
        let pool = pool(6, &[(1, 3), (2, 2), (3, 2)]);

        let weight = |hits: Vec<u32>| arrangement_weight(&pool, &Distribution::from(hits));

        assert_eq!(Ok(BigUint::from(3_u32)), weight(vec![2, 0, 0]));
        assert_eq!(Ok(BigUint::from(1_u32)), weight(vec![0, 0, 0]));
        assert_eq!(Ok(BigUint::from(3_u32 * 2 * 2)), weight(vec![1, 1, 1]));
        assert_err!(weight(vec![0, 3, 0]));
        assert_err!(weight(vec![0, 0]));
    }

    #[test]
    fn test_hits_pmf() {
        let mut ctxt = Context::new();
        let pmf = hits_pmf(&pool(6, &[(3, 2)]), &mut ctxt).unwrap();

        assert_eq!(2, pmf.max_hits());
        assert_relative_eq!(0.25, pmf.p_exactly(0));
        assert_relative_eq!(0.5, pmf.p_exactly(1));
        assert_relative_eq!(0.25, pmf.p_exactly(2));
        assert_relative_eq!(0.0, pmf.p_exactly(3));
        assert_relative_eq!(0.0, pmf.p_exactly(-1));

        assert_relative_eq!(1.0, pmf.p_at_least(-2));
        assert_relative_eq!(0.75, pmf.p_at_least(1));
        assert_relative_eq!(0.0, pmf.p_at_least(3));
        // past the end is a plain zero, not the empty sum's -0.0
        assert!(pmf.p_at_least(3).is_sign_positive());
        assert!(pmf.p_at_least(100).is_sign_positive());

        assert_eq!(ndarray::array![1.0, 0.75, 0.25], pmf.survival());
        assert_relative_eq!(1.0, pmf.expected_hits());
        assert!(pmf.is_normalized());
        // one way to spread each hit count over a single group
        assert_eq!(3, ctxt.distributions_explored());
    }

    #[test]
    fn test_context_limit() {
        let pool = pool(6, &[(2, 2), (3, 2), (4, 2)]);

        let mut ctxt = Context::with_max_distributions(6);
        assert_eq!(
            Err(Error::ResourceExhausted { limit: 6 }),
            hits_probability_with(&pool, 3, &mut ctxt)
        );
        assert_eq!(
            Err(Error::ResourceExhausted { limit: 6 }),
            min_hits_probability_with(&pool, 0, &mut ctxt)
        );

        // fewer distributions at the tails
        assert!(hits_probability_with(&pool, 1, &mut ctxt).is_ok());

        ctxt.set_max_distributions(None);
        assert!(hits_probability_with(&pool, 3, &mut ctxt).is_ok());
    }

    #[test]
    fn test_weight_cache() {
        let pool = pool(6, &[(2, 3), (3, 3), (4, 3)]);

        let mut cold = Context::new();
        let mut warm = Context::new();
        hits_pmf(&pool, &mut warm).unwrap();

        for hits in 0..=9 {
            assert_eq!(
                hits_probability_with(&pool, hits, &mut cold).unwrap(),
                hits_probability_with(&pool, hits, &mut warm).unwrap(),
            );
        }

        // only (3, 0..=3) weights are ever needed
        assert_eq!(4, warm.weight_cache().cache_size());
        assert_gt!(warm.weight_cache().cache_hit_rate(), 0.5);
    }

    #[test]
    fn test_large_pool_matches_convolution() {
        let mut ctxt = Context::new();

        let pool1 = pool(6, &[(1, 4), (2, 2), (3, 12), (4, 8)]);
        let pmf_ref = hits_pmf_ref(&pool1);
        let p_ref = pmf_ref.iter().skip(10).sum::<f64>();
        assert_relative_eq!(
            p_ref,
            min_hits_probability_with(&pool1, 10, &mut ctxt).unwrap(),
            epsilon = 1.0e-9
        );

        let pool2 = pool(6, &[(2, 50), (3, 18), (4, 6)]);
        let pmf_ref = hits_pmf_ref(&pool2);
        let p_ref = pmf_ref.iter().skip(30).sum::<f64>();
        assert_relative_eq!(
            p_ref,
            min_hits_probability_with(&pool2, 30, &mut ctxt).unwrap(),
            epsilon = 1.0e-9
        );
    }

    #[test]
    fn test_pmf_properties() {
        proptest!(niters(200), |(pool in arb_pool(4, 5))| {
            let mut ctxt = Context::new();
            let pmf = hits_pmf(&pool, &mut ctxt).unwrap();

            // normalized
            prop_assert!(pmf.is_normalized());
            prop_assert!(relative_eq!(
                1.0,
                min_hits_probability_with(&pool, 0, &mut ctxt).unwrap(),
                epsilon = 1.0e-9
            ));

            // agrees with rolling one die at a time
            for (p, p_ref) in pmf.view().iter().zip(hits_pmf_ref(&pool)) {
                prop_assert!(relative_eq!(p_ref, *p, epsilon = 1.0e-9));
            }

            // "at least" only gets harder
            let max_hits = i64::from(pool.total_dice());
            let mut prev = 1.0;
            for min_hits in 0..=(max_hits + 1) {
                let p = min_hits_probability_with(&pool, min_hits, &mut ctxt).unwrap();
                prop_assert!(p <= prev);
                prop_assert!((0.0..=1.0).contains(&p));
                prev = p;
            }
        });
    }

    #[test]
    fn test_arrangement_weights_sum_to_combinations() {
        proptest!(niters(200), |(pool in arb_pool(4, 5))| {
            let total_dice = pool.total_dice();
            let mut ctxt = Context::new();

            for hits in 0..=total_dice {
                let total_weight = scored_distributions(&pool, hits.into(), &mut ctxt)
                    .unwrap()
                    .into_iter()
                    .fold(BigUint::from(0_u32), |acc, scored| acc + scored.weight);

                prop_assert_eq!(num_combinations(total_dice, hits), total_weight);
            }
        });
    }
}
