//! Simulation engine.
//!
//! This module implements the rectangular field where foxes hunt rabbits,
//! and the step driver that advances it.

pub mod animal;
pub mod grid;
pub mod history;
pub mod population;
pub mod rng;
pub mod simulation;
pub mod statistics;

pub use animal::{Animal, DeathCause, Habitat, Kind, Rules};
pub use grid::{FieldSnapshot, Grid};
pub use history::{HistoryEntry, PopulationHistory};
pub use rng::Randomizer;
pub use simulation::Simulator;
pub use statistics::FieldStats;
