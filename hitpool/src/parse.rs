use crate::dice::GroupSpec;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/////////////////////
// parse::GroupSpec //
/////////////////////

impl FromStr for GroupSpec {
    type Err = String;

    // 3:2 (threshold:capacity)

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (threshold_str, capacity_str) = s.split_once(':').ok_or_else(|| {
            format!(
                "invalid group string '{}': expected format '<threshold>:<capacity>'",
                s
            )
        })?;

        let threshold = threshold_str.trim().parse::<i64>().map_err(|err| {
            format!(
                "failed to parse group threshold: '{}', error: {}",
                threshold_str, err
            )
        })?;
        let capacity = capacity_str.trim().parse::<i64>().map_err(|err| {
            format!(
                "failed to parse group capacity: '{}', error: {}",
                capacity_str, err
            )
        })?;

        Ok(GroupSpec::new(threshold, capacity))
    }
}

//////////////////////
// parse::GroupList //
//////////////////////

/// An ordered list of dice groups, written like `[3:2, 1:1]`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList(Vec<GroupSpec>);

impl GroupList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[GroupSpec] {
        &self.0
    }
}

impl Default for GroupList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<GroupSpec> for GroupList {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = GroupSpec>,
    {
        Self(Vec::from_iter(iter))
    }
}

impl FromStr for GroupList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.trim_start_matches('[');
        let s = s.trim_end_matches(']');

        // `3 : 2` -> `3:2`, so whitespace only ever separates groups
        let s = s.split(':').map(str::trim).join(":");

        let splitters = &[',', ' ', '\n', '\t'];

        s.split(splitters)
            .filter(|s| !s.is_empty())
            .map(GroupSpec::from_str)
            .collect()
    }
}

impl fmt::Display for GroupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pieces = self.0.iter().map(|spec| spec.to_string()).join(", ");
        write!(f, "[{}]", pieces)
    }
}

impl fmt::Debug for GroupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
