//! Population counters and summaries.

use crate::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of live members of one species, with a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    name: String,
    count: usize,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn increment(&mut self) {
        self.count += 1;
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Per-species head count at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub counts: BTreeMap<Species, usize>,
}

impl PopulationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a species, zero when it was never seen
    pub fn count(&self, species: Species) -> usize {
        self.counts.get(&species).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of species with at least one living member
    pub fn living_species(&self) -> usize {
        self.counts.values().filter(|&&count| count > 0).count()
    }

    pub fn is_viable(&self) -> bool {
        self.living_species() > 1
    }
}

impl fmt::Display for PopulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (species, count) in &self.counts {
            write!(f, "{}: {} ", species.label(), count)?;
        }
        Ok(())
    }
}
