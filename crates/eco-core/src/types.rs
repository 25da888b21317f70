//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of an animal, unique within one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out animal identifiers in creation order.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> AnimalId {
        let id = AnimalId(self.next);
        self.next += 1;
        id
    }
}

/// A (row, column) location in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: i32,
    pub col: i32,
}

impl Coordinate {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Chebyshev (king-move) distance to another coordinate
    pub fn chebyshev_distance(&self, other: &Coordinate) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Row in the upper 16 bits, column in the lower ones. Unique for any
    /// field narrower than 65536 columns.
    fn packed(&self) -> i32 {
        (self.row << 16).wrapping_add(self.col)
    }
}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.packed().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// The two species living in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Prey
    Rabbit,
    /// Predator
    Fox,
}

impl Species {
    pub fn label(&self) -> &'static str {
        match self {
            Species::Rabbit => "Rabbit",
            Species::Fox => "Fox",
        }
    }

    pub fn is_prey(&self) -> bool {
        matches!(self, Species::Rabbit)
    }

    pub fn all() -> [Species; 2] {
        [Species::Rabbit, Species::Fox]
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a grid cell holds: the animal's handle plus its species, so that
/// grid scans never need to look the animal up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: AnimalId,
    pub species: Species,
}

impl Occupant {
    pub fn new(id: AnimalId, species: Species) -> Self {
        Self { id, species }
    }
}
