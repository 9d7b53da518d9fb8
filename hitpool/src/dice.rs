use crate::{enumerate::Distribution, Error, DEFAULT_FACES};
use claim::debug_assert_le;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Past this many dice the arrangement weights (`n choose k`) can no longer be
/// represented by an `f64`.
pub const MAX_POOL_DICE: u32 = 1000;

///////////////
// GroupSpec //
///////////////

/// A caller-supplied dice group: `capacity` dice that each hit when they roll
/// at or under `threshold`. Kept signed so that nonsense values are reported
/// rather than being unrepresentable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupSpec {
    pub threshold: i64,
    pub capacity: i64,
}

impl GroupSpec {
    pub const fn new(threshold: i64, capacity: i64) -> Self {
        Self {
            threshold,
            capacity,
        }
    }
}

impl fmt::Display for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.threshold, self.capacity)
    }
}

///////////
// Group //
///////////

/// A validated [`GroupSpec`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    threshold: u32,
    capacity: u32,
}

impl Group {
    #[inline]
    pub fn threshold(self) -> u32 {
        self.threshold
    }

    #[inline]
    pub fn capacity(self) -> u32 {
        self.capacity
    }
}

//////////////
// DicePool //
//////////////

/// An ordered, validated collection of dice groups. Group order is
/// significant and never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DicePool {
    faces: u32,
    groups: Vec<Group>,
}

impl DicePool {
    pub fn new(faces: u32, specs: &[GroupSpec]) -> Result<Self, Error> {
        if faces == 0 {
            return Err(Error::Validation(
                "dice need at least one face".to_string(),
            ));
        }

        let mut groups = Vec::with_capacity(specs.len());
        let mut total_dice: u64 = 0;

        for (idx, spec) in specs.iter().enumerate() {
            if spec.capacity < 0 {
                return Err(Error::Validation(format!(
                    "group {idx} ({spec}): capacity can't be negative"
                )));
            }
            if spec.threshold < 0 || spec.threshold > i64::from(faces) {
                return Err(Error::Validation(format!(
                    "group {idx} ({spec}): threshold must be in the range [0, {faces}]"
                )));
            }

            total_dice += spec.capacity as u64;
            if total_dice > u64::from(MAX_POOL_DICE) {
                return Err(Error::Validation(format!(
                    "too many dice in pool! expected <= {MAX_POOL_DICE}"
                )));
            }

            groups.push(Group {
                threshold: spec.threshold as u32,
                capacity: spec.capacity as u32,
            });
        }

        Ok(Self { faces, groups })
    }

    /// A pool of standard six-sided dice.
    pub fn d6(specs: &[GroupSpec]) -> Result<Self, Error> {
        Self::new(DEFAULT_FACES, specs)
    }

    #[inline]
    pub fn faces(&self) -> u32 {
        self.faces
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[inline]
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn capacities(&self) -> Vec<u32> {
        self.groups.iter().map(|group| group.capacity).collect()
    }

    /// The number of dice in the pool, which is also the most hits it can roll.
    pub fn total_dice(&self) -> u32 {
        self.groups.iter().map(|group| group.capacity).sum()
    }

    /// Pr[a single die in group `idx` hits]
    #[inline]
    pub fn p_hit(&self, idx: usize) -> f64 {
        let threshold = self.groups[idx].threshold;
        debug_assert_le!(threshold, self.faces);
        f64::from(threshold) / f64::from(self.faces)
    }

    pub fn to_specs(&self) -> Vec<GroupSpec> {
        self.groups
            .iter()
            .map(|group| GroupSpec::new(group.threshold.into(), group.capacity.into()))
            .collect()
    }

    /// Ensure `distr` assigns a hit count to every group without overfilling
    /// any of them.
    pub fn check_distribution(&self, distr: &Distribution) -> Result<(), Error> {
        if distr.len() != self.groups.len() {
            return Err(Error::Validation(format!(
                "distribution {} has {} groups, but the pool has {}",
                distr,
                distr.len(),
                self.groups.len()
            )));
        }

        let overfull = self
            .groups
            .iter()
            .zip(distr.as_slice())
            .position(|(group, &hits)| hits > group.capacity);

        match overfull {
            Some(idx) => Err(Error::Validation(format!(
                "distribution {} puts {} hits in group {idx}, which only holds {} dice",
                distr,
                distr.as_slice()[idx],
                self.groups[idx].capacity
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use itertools::Itertools;
        let pieces = self
            .groups
            .iter()
            .map(|group| format!("{}:{}", group.threshold, group.capacity))
            .join(", ");
        write!(f, "d{} [{}]", self.faces, pieces)
    }
}

cfg_test! {
    pub mod prop {
        use super::*;
        use proptest::{collection::vec, prelude::*};

        /// Small pools of up to `max_groups` groups with up to `max_capacity`
        /// dice each.
        pub fn arb_pool(max_groups: usize, max_capacity: i64) -> impl Strategy<Value = DicePool> {
            (1_u32..=8).prop_flat_map(move |faces| {
                let group = (0..=i64::from(faces), 0..=max_capacity)
                    .prop_map(|(threshold, capacity)| GroupSpec::new(threshold, capacity));

                vec(group, 0..=max_groups).prop_map(move |specs| {
                    DicePool::new(faces, &specs).expect("generated pool is always valid")
                })
            })
        }
    }
}
