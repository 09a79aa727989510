use ahash::RandomState;
use alloc::string::{String, ToString};
use hashbrown::HashMap;

use core::str::FromStr;

use crate::{
    StatisticKind,
    error::{Error, Result},
};

const SAMPLE_STDDEV: &[&str] = &[
    "stddev_samp",
    "stddev_sample",
    "stdev_samp",
    "stdev_sample",
    "stddev",
    "stdev",
    "std_dev",
    "standard_deviation",
];

const POPULATION_STDDEV: &[&str] = &[
    "stddev_pop",
    "stddev_population",
    "stdev_pop",
    "stdev_population",
];

const SAMPLE_VARIANCE: &[&str] = &[
    "variance_samp",
    "variance_sample",
    "var_samp",
    "var_sample",
    "variance",
    "var",
];

const POPULATION_VARIANCE: &[&str] = &[
    "variance_pop",
    "variance_population",
    "var_pop",
    "var_population",
];

impl StatisticKind {
    /// Returns the SQL-style names a host exposes this statistic under
    ///
    /// The first entry is the canonical [`name`](StatisticKind::name).
    /// Matching against these names is ASCII case-insensitive.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::SampleStddev => SAMPLE_STDDEV,
            Self::PopulationStddev => POPULATION_STDDEV,
            Self::SampleVariance => SAMPLE_VARIANCE,
            Self::PopulationVariance => POPULATION_VARIANCE,
        }
    }
}

impl FromStr for StatisticKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StatisticKind::ALL
            .into_iter()
            .find(|kind| kind.aliases().iter().any(|a| a.eq_ignore_ascii_case(s)))
            .ok_or_else(|| Error::UnknownStatistic(s.to_string()))
    }
}

/// Lookup table from function names to statistic kinds.
///
/// Built from every kind's [`aliases`](StatisticKind::aliases) and open to
/// host-specific additions. Names are stored lower-cased, so resolution
/// ignores ASCII case.
#[derive(Debug, Clone)]
pub struct AliasTable {
    names: HashMap<String, StatisticKind, RandomState>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasTable {
    /// Creates a table holding the built-in aliases of all four statistics
    pub fn new() -> Self {
        let mut names = HashMap::with_hasher(RandomState::default());
        for kind in StatisticKind::ALL {
            for alias in kind.aliases() {
                names.insert((*alias).to_string(), kind);
            }
        }
        Self { names }
    }

    /// Registers an extra name for a statistic
    ///
    /// # Returns
    ///
    /// * `Option<StatisticKind>` - The kind the name previously resolved to, if any
    pub fn insert(&mut self, name: &str, kind: StatisticKind) -> Option<StatisticKind> {
        self.names.insert(name.to_ascii_lowercase(), kind)
    }

    /// Resolves a function name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<StatisticKind> {
        self.names.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Resolves a function name, ignoring ASCII case
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownStatistic`] if no statistic is registered under `name`
    pub fn resolve(&self, name: &str) -> Result<StatisticKind> {
        self.get(name)
            .ok_or_else(|| Error::UnknownStatistic(name.to_string()))
    }

    /// Returns the number of registered names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name is registered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns an iterator over the registered `(name, kind)` pairs, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, StatisticKind)> {
        self.names.iter().map(|(name, &kind)| (name.as_str(), kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_aliases_resolve() {
        let table = AliasTable::new();
        assert_eq!(table.len(), 22);
        for kind in StatisticKind::ALL {
            assert_eq!(kind.aliases()[0], kind.name());
            for alias in kind.aliases() {
                assert_eq!(table.get(alias), Some(kind));
            }
        }
    }

    #[test]
    fn resolution_ignores_case() {
        let table = AliasTable::new();
        assert_eq!(table.get("STDDEV"), Some(StatisticKind::SampleStddev));
        assert_eq!(
            table.get("Var_Pop"),
            Some(StatisticKind::PopulationVariance)
        );
        assert_eq!(
            "VARIANCE".parse::<StatisticKind>(),
            Ok(StatisticKind::SampleVariance)
        );
        assert_eq!(
            "Stdev_Population".parse::<StatisticKind>(),
            Ok(StatisticKind::PopulationStddev)
        );
    }

    #[test]
    fn unknown_names_fail() {
        let table = AliasTable::new();
        assert_eq!(table.get("median"), None);
        assert_eq!(
            table.resolve("median"),
            Err(Error::UnknownStatistic("median".to_string()))
        );
        assert_eq!(
            "stddev_".parse::<StatisticKind>(),
            Err(Error::UnknownStatistic("stddev_".to_string()))
        );
    }

    #[test]
    fn custom_alias() {
        let mut table = AliasTable::new();
        assert_eq!(table.insert("SD", StatisticKind::SampleStddev), None);
        assert_eq!(table.resolve("sd"), Ok(StatisticKind::SampleStddev));
        assert_eq!(
            table.insert("var", StatisticKind::PopulationVariance),
            Some(StatisticKind::SampleVariance)
        );
        assert_eq!(table.len(), 23);
        assert_eq!(
            table
                .iter()
                .filter(|(_, k)| *k == StatisticKind::PopulationVariance)
                .count(),
            5
        );
    }
}
