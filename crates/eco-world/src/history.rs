//! Population over time, as a chart of the run would plot it.

use eco_core::{PopulationSummary, Species};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: u64,
    pub population: PopulationSummary,
}

/// The most recent `capacity` population summaries, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl PopulationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, step: u64, population: PopulationSummary) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry { step, population });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    /// `(step, count)` points for one species
    pub fn series(&self, species: Species) -> Vec<(u64, usize)> {
        self.entries
            .iter()
            .map(|entry| (entry.step, entry.population.count(species)))
            .collect()
    }

    /// Largest head count of any species in the window, for scaling a plot
    pub fn peak(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|entry| entry.population.counts.values().copied())
            .max()
            .unwrap_or(0)
    }
}
