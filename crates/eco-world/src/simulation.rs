//! Step driver: owns the field and advances it one tick at a time.

use crate::animal::{Animal, Habitat, Rules};
use crate::grid::{FieldSnapshot, Grid};
use crate::history::PopulationHistory;
use crate::population;
use crate::rng::Randomizer;
use crate::statistics::FieldStats;
use eco_core::{
    AnimalId, Coordinate, IdAllocator, PopulationSummary, Result, SimulationConfig, Species,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

pub struct Simulator {
    config: SimulationConfig,
    rules: Rules,
    grid: Grid,
    animals: HashMap<AnimalId, Animal>,
    // Acting order; newborns are appended at the end of each step
    roster: Vec<AnimalId>,
    ids: IdAllocator,
    rng: Randomizer,
    stats: FieldStats,
    history: PopulationHistory,
    step: u64,
}

impl Simulator {
    /// Build a simulator and seed its field. Non-positive field dimensions
    /// are replaced by the default size (with a warning).
    pub fn new(mut config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        config.field = config.field.validated();

        let mut sim = Self {
            rules: Rules::from_config(&config),
            grid: Grid::new(config.field.rows, config.field.cols),
            animals: HashMap::new(),
            roster: Vec::new(),
            ids: IdAllocator::new(),
            rng: Randomizer::new(config.random),
            stats: FieldStats::new(),
            history: PopulationHistory::new(config.run.history_capacity),
            step: 0,
            config,
        };
        sim.reset();

        Ok(sim)
    }

    /// Run a long simulation from the current state
    pub fn run_long_simulation(&mut self) -> u64 {
        let completed = self.simulate(self.config.run.long_run_steps);
        info!(
            completed = completed,
            step = self.step,
            "Long simulation finished"
        );
        completed
    }

    /// Run up to `steps` ticks, stopping as soon as the field is no longer
    /// viable. Returns the number of ticks run.
    pub fn simulate(&mut self, steps: u64) -> u64 {
        self.simulate_while(steps, |_| true)
    }

    /// Like [`Simulator::simulate`], but also asks `keep_going` before each
    /// tick so a caller can stop a run between ticks.
    pub fn simulate_while<F>(&mut self, steps: u64, mut keep_going: F) -> u64
    where
        F: FnMut(&Simulator) -> bool,
    {
        let mut completed = 0;
        while completed < steps && self.is_viable() && keep_going(self) {
            self.simulate_one_step();
            completed += 1;
        }

        let viable = self.is_viable();
        debug!(
            requested = steps,
            completed = completed,
            step = self.step,
            viable = viable,
            "Simulation run finished"
        );

        completed
    }

    /// Advance one tick: every animal alive at the start acts once, in
    /// roster order, then the young born during the tick join the roster.
    #[instrument(level = "debug", skip(self), fields(step = self.step + 1))]
    pub fn simulate_one_step(&mut self) {
        self.step += 1;

        let roster = std::mem::take(&mut self.roster);
        let mut survivors = Vec::with_capacity(roster.len());
        let mut newborns = Vec::new();

        for id in roster {
            let Some(mut animal) = self.animals.remove(&id) else {
                continue;
            };
            if animal.is_alive() {
                let mut habitat = Habitat {
                    grid: &mut self.grid,
                    animals: &mut self.animals,
                    rng: &mut self.rng,
                    ids: &mut self.ids,
                    rules: &self.rules,
                };
                animal.act(&mut habitat, &mut newborns);
            }
            if animal.is_alive() {
                self.animals.insert(id, animal);
                survivors.push(id);
            }
        }

        let births = newborns.len();
        survivors.extend(newborns);

        // Animals eaten after their own turn, or eaten as newborns
        self.animals.retain(|_, animal| animal.is_alive());
        let animals = &self.animals;
        survivors.retain(|id| animals.contains_key(id));
        self.roster = survivors;

        self.stats.reset();
        let summary = self.stats.summary(&self.grid);
        debug!(
            step = self.step,
            births = births,
            population = self.roster.len(),
            rabbits = summary.count(Species::Rabbit),
            foxes = summary.count(Species::Fox),
            "Step complete"
        );
        self.history.record(self.step, summary);
    }

    /// Back to step zero with a freshly seeded field. The randomizer is not
    /// rewound; see [`Simulator::reset_randomizer`].
    pub fn reset(&mut self) {
        self.step = 0;
        self.roster.clear();
        self.animals.clear();
        self.history.clear();

        let mut habitat = Habitat {
            grid: &mut self.grid,
            animals: &mut self.animals,
            rng: &mut self.rng,
            ids: &mut self.ids,
            rules: &self.rules,
        };
        self.roster = population::populate(&mut habitat, &self.config.population);
        self.stats.reset();

        info!(
            population = self.roster.len(),
            rows = self.grid.rows(),
            cols = self.grid.cols(),
            "Simulation reset"
        );
    }

    /// Rewind the random number stream to its seed
    pub fn reset_randomizer(&mut self) {
        self.rng.reset();
        debug!(seed = self.rng.seed(), "Randomizer reset");
    }

    /// Put a newborn animal on an empty cell and add it to the roster
    pub fn spawn(&mut self, species: Species, location: Coordinate) -> AnimalId {
        assert!(
            self.grid.is_free(location),
            "cannot spawn {species} on occupied cell {location}"
        );
        let animal = Animal::newborn(self.ids.allocate(), species, &self.rules.fox_diet);
        let mut habitat = Habitat {
            grid: &mut self.grid,
            animals: &mut self.animals,
            rng: &mut self.rng,
            ids: &mut self.ids,
            rules: &self.rules,
        };
        let id = habitat.add(animal, location);
        self.roster.push(id);
        self.stats.reset();
        id
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        self.grid.snapshot()
    }

    /// More than one species is still alive
    pub fn is_viable(&mut self) -> bool {
        self.stats.is_viable(&self.grid)
    }

    pub fn population_summary(&mut self) -> PopulationSummary {
        self.stats.summary(&self.grid)
    }

    /// Text such as `"Rabbit: 12 Fox: 3 "`
    pub fn population_details(&mut self) -> String {
        self.stats.population_details(&self.grid)
    }

    pub fn count(&mut self, species: Species) -> Result<usize> {
        self.stats.count(&self.grid, species)
    }

    pub fn history(&self) -> &PopulationHistory {
        &self.history
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(&id)
    }

    /// Living animals in acting order
    pub fn animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.roster.iter().filter_map(|id| self.animals.get(id))
    }

    pub fn population(&self) -> usize {
        self.roster.len()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
