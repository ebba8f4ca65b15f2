// Identifier catalog: the distinct players, teams, or tracks in a dataset.

use std::collections::BTreeSet;

use crate::error::StatsError;
use crate::record::{Dataset, Dimension};

/// Sorted, lower-cased distinct values of one dimension of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    dimension: Dimension,
    values: Vec<String>,
}

impl Catalog {
    /// Scan every record and collect the lower-cased values along
    /// `dimension`. Blank cells are skipped.
    pub fn build(dataset: &Dataset, dimension: Dimension) -> Self {
        let values: BTreeSet<String> = dataset
            .records()
            .iter()
            .map(|r| r.field(dimension))
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self {
            dimension,
            values: values.into_iter().collect(),
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.values.binary_search(&key).is_ok()
    }

    /// Ok if `name` is known, otherwise the validation error for this
    /// dimension carrying the full catalog.
    pub fn require(&self, name: &str) -> Result<(), StatsError> {
        if self.contains(name) {
            return Ok(());
        }
        let name = name.to_string();
        let valid = self.values.clone();
        Err(match self.dimension {
            Dimension::Player => StatsError::UnknownPlayer { name, valid },
            Dimension::Team => StatsError::UnknownTeam { name, valid },
            Dimension::Track => StatsError::UnknownTrack { name, valid },
        })
    }
}

/// Lower-cased distinct values along `dimension`, ascending.
pub fn list_values(dataset: &Dataset, dimension: Dimension) -> Vec<String> {
    Catalog::build(dataset, dimension).into_values()
}

/// Distinct values along `dimension` in their ingested casing, ascending.
///
/// Unlike [`list_values`], names differing only in case are listed
/// separately.
pub fn display_values(dataset: &Dataset, dimension: Dimension) -> Vec<String> {
    let values: BTreeSet<&str> = dataset
        .records()
        .iter()
        .map(|r| r.field(dimension))
        .filter(|v| !v.is_empty())
        .collect();
    values.into_iter().map(str::to_string).collect()
}

/// Validate `name` against the catalog of `dimension` in one call.
pub fn require(dataset: &Dataset, dimension: Dimension, name: &str) -> Result<(), StatsError> {
    Catalog::build(dataset, dimension).require(name)
}
