//! Lazily computed head counts of the field.

use crate::grid::Grid;
use eco_core::{Counter, Error, PopulationSummary, Result, Species};
use std::collections::BTreeMap;

/// Per-species counters over a grid.
///
/// Counts are not maintained as animals come and go. Once invalidated with
/// [`FieldStats::reset`] they are recomputed from a full grid scan the next
/// time anything is read.
#[derive(Debug, Clone)]
pub struct FieldStats {
    counters: BTreeMap<Species, Counter>,
    counts_valid: bool,
}

impl FieldStats {
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
            counts_valid: true,
        }
    }

    /// Zero every known counter and mark the counts stale
    pub fn reset(&mut self) {
        self.counts_valid = false;
        for counter in self.counters.values_mut() {
            counter.reset();
        }
    }

    /// Count one more animal of `species`, creating its counter on first sight
    pub fn increment(&mut self, species: Species) {
        self.counters
            .entry(species)
            .or_insert_with(|| Counter::new(species.label()))
            .increment();
    }

    /// Mark the counts as complete
    pub fn finalize(&mut self) {
        self.counts_valid = true;
    }

    pub fn is_valid(&self) -> bool {
        self.counts_valid
    }

    /// Live members of `species`. Fails for a species that has never been
    /// counted on this field.
    pub fn count(&mut self, grid: &Grid, species: Species) -> Result<usize> {
        self.ensure_counts(grid);
        self.counters
            .get(&species)
            .map(Counter::count)
            .ok_or_else(|| Error::NotFound(format!("no counter for species {species}")))
    }

    /// More than one species still has living members
    pub fn is_viable(&mut self, grid: &Grid) -> bool {
        self.ensure_counts(grid);
        self.counters
            .values()
            .filter(|counter| counter.count() > 0)
            .count()
            > 1
    }

    pub fn summary(&mut self, grid: &Grid) -> PopulationSummary {
        self.ensure_counts(grid);
        PopulationSummary {
            counts: self
                .counters
                .iter()
                .map(|(species, counter)| (*species, counter.count()))
                .collect(),
        }
    }

    /// Text such as `"Rabbit: 12 Fox: 3 "`
    pub fn population_details(&mut self, grid: &Grid) -> String {
        self.ensure_counts(grid);
        let mut details = String::new();
        for counter in self.counters.values() {
            details.push_str(&format!("{}: {} ", counter.name(), counter.count()));
        }
        details
    }

    fn ensure_counts(&mut self, grid: &Grid) {
        if !self.counts_valid {
            self.generate_counts(grid);
        }
    }

    fn generate_counts(&mut self, grid: &Grid) {
        self.reset();
        for (_, occupant) in grid.occupants() {
            self.increment(occupant.species);
        }
        self.finalize();
    }
}

impl Default for FieldStats {
    fn default() -> Self {
        Self::new()
    }
}
