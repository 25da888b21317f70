//! Random seeding of the initial population.

use crate::animal::{Animal, Habitat};
use eco_core::{AnimalId, Coordinate, PopulationConfig, Species};
use rand::Rng;
use tracing::debug;

/// Clear the field and scatter foxes and rabbits over it, cell by cell.
///
/// Each cell gets a fox with `fox_creation_probability`; failing that, a
/// rabbit with `rabbit_creation_probability`; otherwise it stays empty.
/// Returns the new animals in placement order.
pub fn populate(habitat: &mut Habitat<'_>, config: &PopulationConfig) -> Vec<AnimalId> {
    habitat.grid.clear();
    let mut roster = Vec::new();

    for row in 0..habitat.grid.rows() {
        for col in 0..habitat.grid.cols() {
            let species = if habitat.rng.gen::<f64>() <= config.fox_creation_probability {
                Species::Fox
            } else if habitat.rng.gen::<f64>() <= config.rabbit_creation_probability {
                Species::Rabbit
            } else {
                continue;
            };

            let animal =
                Animal::with_random_age(habitat.ids.allocate(), species, habitat.rules, habitat.rng);
            roster.push(habitat.add(animal, Coordinate::new(row, col)));
        }
    }

    debug!(
        population = roster.len(),
        rows = habitat.grid.rows(),
        cols = habitat.grid.cols(),
        "Field populated"
    );

    roster
}
