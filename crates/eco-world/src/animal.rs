//! Animal life cycle and the per-species behaviour rules.

use crate::grid::Grid;
use crate::rng::Randomizer;
use eco_core::{
    AnimalId, Coordinate, FoxDiet, IdAllocator, Occupant, SimulationConfig, Species,
    SpeciesConfig,
};
use rand::Rng;
use std::collections::HashMap;
use tracing::trace;

/// Constants for both species, looked up by the shared life cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub rabbit: SpeciesConfig,
    pub fox: SpeciesConfig,
    pub fox_diet: FoxDiet,
}

impl Rules {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            rabbit: config.rabbit,
            fox: config.fox,
            fox_diet: config.fox_diet,
        }
    }

    pub fn species(&self, species: Species) -> &SpeciesConfig {
        match species {
            Species::Rabbit => &self.rabbit,
            Species::Fox => &self.fox,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// Everything an animal touches while acting. The acting animal itself is
/// never in `animals` while it acts.
pub struct Habitat<'a> {
    pub grid: &'a mut Grid,
    pub animals: &'a mut HashMap<AnimalId, Animal>,
    pub rng: &'a mut Randomizer,
    pub ids: &'a mut IdAllocator,
    pub rules: &'a Rules,
}

impl Habitat<'_> {
    /// Put a new animal on the field and register it
    pub fn add(&mut self, mut animal: Animal, location: Coordinate) -> AnimalId {
        let id = animal.id;
        animal.set_location(self.grid, location);
        self.animals.insert(id, animal);
        id
    }

    fn adjacent_locations(&mut self, location: Coordinate) -> Vec<Coordinate> {
        self.grid.adjacent_locations(location, &mut *self.rng)
    }

    fn free_adjacent_location(&mut self, location: Coordinate) -> Option<Coordinate> {
        self.grid.free_adjacent_location(location, &mut *self.rng)
    }
}

/// Species-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Rabbit,
    Fox {
        /// Steps left before starving
        food_level: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Overcrowding,
    Eaten,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::OldAge => "old_age",
            DeathCause::Starvation => "starvation",
            DeathCause::Overcrowding => "overcrowding",
            DeathCause::Eaten => "eaten",
        }
    }
}

/// An animal in the simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    id: AnimalId,
    kind: Kind,
    age: u32,
    location: Option<Coordinate>,
    death: Option<DeathCause>,
}

impl Animal {
    /// A newborn: age zero, and a fox starts with a full rabbit's worth of food.
    pub fn newborn(id: AnimalId, species: Species, diet: &FoxDiet) -> Self {
        let kind = match species {
            Species::Rabbit => Kind::Rabbit,
            Species::Fox => Kind::Fox {
                food_level: diet.rabbit_food_value,
            },
        };
        Self {
            id,
            kind,
            age: 0,
            location: None,
            death: None,
        }
    }

    /// An animal for the initial population, with a random age below the
    /// species' maximum (and a random food level for a fox).
    pub fn with_random_age(
        id: AnimalId,
        species: Species,
        rules: &Rules,
        rng: &mut Randomizer,
    ) -> Self {
        let age = rng.gen_range(0..rules.species(species).max_age);
        let kind = match species {
            Species::Rabbit => Kind::Rabbit,
            Species::Fox => Kind::Fox {
                food_level: rng.gen_range(0..rules.fox_diet.rabbit_food_value),
            },
        };
        Self {
            id,
            kind,
            age,
            location: None,
            death: None,
        }
    }

    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn species(&self) -> Species {
        match self.kind {
            Kind::Rabbit => Species::Rabbit,
            Kind::Fox { .. } => Species::Fox,
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn food_level(&self) -> Option<i32> {
        match self.kind {
            Kind::Fox { food_level } => Some(food_level),
            Kind::Rabbit => None,
        }
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    pub fn cause_of_death(&self) -> Option<DeathCause> {
        self.death
    }

    #[cfg(test)]
    pub(crate) fn set_food_level(&mut self, level: i32) {
        self.kind = Kind::Fox { food_level: level };
    }

    /// One step of life: age, get hungrier (foxes), breed, then hunt or move.
    /// An animal with nowhere to go dies of overcrowding.
    pub fn act(&mut self, habitat: &mut Habitat<'_>, newborns: &mut Vec<AnimalId>) {
        assert!(self.is_alive(), "animal {} acted after dying", self.id);

        self.increment_age(habitat);
        if self.is_alive() && matches!(self.kind, Kind::Fox { .. }) {
            self.increment_hunger(habitat);
        }
        if !self.is_alive() {
            return;
        }

        self.give_birth(habitat, newborns);

        let Some(location) = self.location else {
            return;
        };
        let food = match self.kind {
            Kind::Fox { .. } => self.find_food(habitat, location),
            Kind::Rabbit => None,
        };
        let destination = food.or_else(|| habitat.free_adjacent_location(location));

        match destination {
            Some(next) => self.set_location(habitat.grid, next),
            None => self.die(habitat.grid, DeathCause::Overcrowding),
        }
    }

    fn increment_age(&mut self, habitat: &mut Habitat<'_>) {
        self.age += 1;
        if self.age > habitat.rules.species(self.species()).max_age {
            self.die(habitat.grid, DeathCause::OldAge);
        }
    }

    fn increment_hunger(&mut self, habitat: &mut Habitat<'_>) {
        if let Kind::Fox { food_level } = &mut self.kind {
            *food_level -= 1;
            if *food_level <= 0 {
                self.die(habitat.grid, DeathCause::Starvation);
            }
        }
    }

    /// Kill every live rabbit next to this fox. Each kill is eaten (capped at
    /// the maximum food level) and the last one visited is where the fox goes.
    fn find_food(
        &mut self,
        habitat: &mut Habitat<'_>,
        location: Coordinate,
    ) -> Option<Coordinate> {
        let diet = habitat.rules.fox_diet;
        let mut target = None;

        for next in habitat.adjacent_locations(location) {
            let Some(occupant) = habitat.grid.get(next) else {
                continue;
            };
            if !occupant.species.is_prey() {
                continue;
            }
            let Some(rabbit) = habitat.animals.get_mut(&occupant.id) else {
                continue;
            };
            if !rabbit.is_alive() {
                continue;
            }

            rabbit.die(habitat.grid, DeathCause::Eaten);
            if let Kind::Fox { food_level } = &mut self.kind {
                *food_level = (*food_level + diet.rabbit_food_value).min(diet.max_food_level);
            }
            trace!(
                fox_id = %self.id,
                rabbit_id = %occupant.id,
                row = next.row,
                col = next.col,
                food_level = ?self.food_level(),
                "Fox ate a rabbit"
            );
            target = Some(next);
        }

        target
    }

    fn give_birth(&mut self, habitat: &mut Habitat<'_>, newborns: &mut Vec<AnimalId>) {
        let Some(location) = self.location else {
            return;
        };
        let species = self.species();
        let births = self.breed(habitat.rules.species(species), habitat.rng);

        for _ in 0..births {
            let Some(free) = habitat.free_adjacent_location(location) else {
                continue;
            };
            let young = Animal::newborn(habitat.ids.allocate(), species, &habitat.rules.fox_diet);
            let young_id = habitat.add(young, free);
            trace!(
                parent_id = %self.id,
                offspring_id = %young_id,
                species = %species,
                row = free.row,
                col = free.col,
                "Animal born"
            );
            newborns.push(young_id);
        }
    }

    /// Number of births this step; zero unless old enough and the breeding
    /// draw succeeds.
    fn breed(&self, rules: &SpeciesConfig, rng: &mut Randomizer) -> u32 {
        let draw: f64 = rng.gen();
        if self.age >= rules.breeding_age
            && draw <= rules.breeding_probability
            && rules.max_litter_size > 0
        {
            rng.gen_range(0..rules.max_litter_size)
        } else {
            0
        }
    }

    fn set_location(&mut self, grid: &mut Grid, next: Coordinate) {
        if let Some(previous) = self.location {
            grid.clear_at(previous);
        }
        grid.place(Occupant::new(self.id, self.species()), next);
        self.location = Some(next);
    }

    fn die(&mut self, grid: &mut Grid, cause: DeathCause) {
        if let Some(location) = self.location.take() {
            grid.clear_at(location);
        }
        self.death = Some(cause);
        trace!(
            animal_id = %self.id,
            species = %self.species(),
            age = self.age,
            cause = cause.as_str(),
            "Animal died"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct World {
        grid: Grid,
        animals: HashMap<AnimalId, Animal>,
        rng: Randomizer,
        ids: IdAllocator,
        rules: Rules,
    }

    impl World {
        fn new(rows: i32, cols: i32) -> Self {
            Self {
                grid: Grid::new(rows, cols),
                animals: HashMap::new(),
                rng: Randomizer::seeded(7),
                ids: IdAllocator::new(),
                rules: Rules::default(),
            }
        }

        fn spawn(&mut self, species: Species, location: Coordinate) -> AnimalId {
            let animal = Animal::newborn(self.ids.allocate(), species, &self.rules.fox_diet);
            self.habitat().add(animal, location)
        }

        fn habitat(&mut self) -> Habitat<'_> {
            Habitat {
                grid: &mut self.grid,
                animals: &mut self.animals,
                rng: &mut self.rng,
                ids: &mut self.ids,
                rules: &self.rules,
            }
        }

        /// Take an animal out, let it act, and put it back like the driver does.
        fn act(&mut self, id: AnimalId) -> Vec<AnimalId> {
            let mut animal = self.animals.remove(&id).unwrap();
            let mut newborns = Vec::new();
            animal.act(&mut self.habitat(), &mut newborns);
            self.animals.insert(id, animal);
            newborns
        }

        fn set_age(&mut self, id: AnimalId, age: u32) {
            self.animals.get_mut(&id).unwrap().age = age;
        }

        fn set_food(&mut self, id: AnimalId, level: i32) {
            self.animals.get_mut(&id).unwrap().kind = Kind::Fox { food_level: level };
        }
    }

    fn no_breeding(config: &mut SpeciesConfig) {
        config.breeding_probability = 0.0;
    }

    #[test]
    fn test_newborn_state() {
        let rules = Rules::default();
        let rabbit = Animal::newborn(AnimalId(0), Species::Rabbit, &rules.fox_diet);
        assert_eq!(rabbit.age(), 0);
        assert!(rabbit.is_alive());
        assert_eq!(rabbit.food_level(), None);

        let fox = Animal::newborn(AnimalId(1), Species::Fox, &rules.fox_diet);
        assert_eq!(fox.food_level(), Some(9));
        assert_eq!(fox.species(), Species::Fox);
    }

    #[test]
    fn test_random_age_is_bounded() {
        let rules = Rules::default();
        let mut rng = Randomizer::seeded(3);
        for i in 0..200 {
            let fox = Animal::with_random_age(AnimalId(i), Species::Fox, &rules, &mut rng);
            assert!(fox.age() < rules.fox.max_age);
            let food = fox.food_level().unwrap();
            assert!((0..rules.fox_diet.rabbit_food_value).contains(&food));

            let rabbit = Animal::with_random_age(AnimalId(i), Species::Rabbit, &rules, &mut rng);
            assert!(rabbit.age() < rules.rabbit.max_age);
        }
    }

    #[test]
    fn test_rabbit_moves_and_ages() {
        let mut world = World::new(5, 5);
        no_breeding(&mut world.rules.rabbit);
        let start = Coordinate::new(2, 2);
        let id = world.spawn(Species::Rabbit, start);

        world.act(id);

        let rabbit = &world.animals[&id];
        assert!(rabbit.is_alive());
        assert_eq!(rabbit.age(), 1);
        let now = rabbit.location().unwrap();
        assert_eq!(start.chebyshev_distance(&now), 1);
        assert!(world.grid.is_free(start));
        assert_eq!(world.grid.get(now).map(|o| o.id), Some(id));
    }

    #[test]
    fn test_dies_only_after_exceeding_max_age() {
        let mut world = World::new(5, 5);
        no_breeding(&mut world.rules.rabbit);
        let max_age = world.rules.rabbit.max_age;
        let id = world.spawn(Species::Rabbit, Coordinate::new(2, 2));

        world.set_age(id, max_age - 1);
        world.act(id);
        assert!(world.animals[&id].is_alive());
        assert_eq!(world.animals[&id].age(), max_age);

        world.act(id);
        let rabbit = &world.animals[&id];
        assert!(!rabbit.is_alive());
        assert_eq!(rabbit.cause_of_death(), Some(DeathCause::OldAge));
        assert_eq!(rabbit.location(), None);
        assert_eq!(world.grid.occupants().count(), 0);
    }

    #[test]
    fn test_overcrowding_on_single_cell() {
        let mut world = World::new(1, 1);
        world.rules.rabbit.breeding_probability = 1.0;
        let id = world.spawn(Species::Rabbit, Coordinate::new(0, 0));
        world.set_age(id, 10);

        let newborns = world.act(id);

        assert!(newborns.is_empty());
        let rabbit = &world.animals[&id];
        assert_eq!(rabbit.cause_of_death(), Some(DeathCause::Overcrowding));
        assert!(world.grid.is_free(Coordinate::new(0, 0)));
    }

    #[test]
    fn test_fox_starves_without_prey() {
        let mut world = World::new(5, 5);
        no_breeding(&mut world.rules.fox);
        let id = world.spawn(Species::Fox, Coordinate::new(2, 2));
        world.set_food(id, 1);

        world.act(id);

        let fox = &world.animals[&id];
        assert_eq!(fox.cause_of_death(), Some(DeathCause::Starvation));
        assert_eq!(fox.food_level(), Some(0));
        assert_eq!(world.grid.occupants().count(), 0);
    }

    #[test]
    fn test_fox_eats_adjacent_rabbit() {
        let mut world = World::new(3, 3);
        no_breeding(&mut world.rules.fox);
        let fox = world.spawn(Species::Fox, Coordinate::new(1, 1));
        let rabbit = world.spawn(Species::Rabbit, Coordinate::new(0, 0));
        world.set_food(fox, 5);

        world.act(fox);

        assert_eq!(world.animals[&rabbit].cause_of_death(), Some(DeathCause::Eaten));
        let fox = &world.animals[&fox];
        assert!(fox.is_alive());
        assert_eq!(fox.food_level(), Some(5 - 1 + 9));
        assert_eq!(fox.location(), Some(Coordinate::new(0, 0)));
        assert!(world.grid.is_free(Coordinate::new(1, 1)));
    }

    #[test]
    fn test_fox_food_is_capped() {
        let mut world = World::new(3, 3);
        no_breeding(&mut world.rules.fox);
        let fox = world.spawn(Species::Fox, Coordinate::new(1, 1));
        world.spawn(Species::Rabbit, Coordinate::new(2, 1));
        world.set_food(fox, 18);

        world.act(fox);

        assert_eq!(world.animals[&fox].food_level(), Some(20));
    }

    #[test]
    fn test_fox_eats_every_adjacent_rabbit_and_moves_to_last() {
        let mut world = World::new(3, 3);
        no_breeding(&mut world.rules.fox);
        let fox = world.spawn(Species::Fox, Coordinate::new(1, 1));
        let first = world.spawn(Species::Rabbit, Coordinate::new(0, 1));
        let second = world.spawn(Species::Rabbit, Coordinate::new(2, 1));
        world.set_food(fox, 5);

        world.act(fox);

        assert!(!world.animals[&first].is_alive());
        assert!(!world.animals[&second].is_alive());
        let fox = &world.animals[&fox];
        // 4 after hunger, +9 per rabbit, capped at 20
        assert_eq!(fox.food_level(), Some(20));
        let at = fox.location().unwrap();
        assert!(at == Coordinate::new(0, 1) || at == Coordinate::new(2, 1));
        assert_eq!(world.grid.occupants().count(), 1);
    }

    #[test]
    fn test_fox_moves_to_last_rabbit_in_shuffled_order() {
        let center = Coordinate::new(1, 1);
        let rabbits = [
            Coordinate::new(0, 0),
            Coordinate::new(1, 2),
            Coordinate::new(2, 2),
        ];

        for seed in 0..200 {
            let mut world = World::new(3, 3);
            world.rng = Randomizer::seeded(seed);
            no_breeding(&mut world.rules.fox);
            let fox = world.spawn(Species::Fox, center);
            for at in rabbits {
                world.spawn(Species::Rabbit, at);
            }

            // Replay the fox's draws: the breeding roll, then the shuffle
            let mut replay = world.rng.clone();
            let _: f64 = replay.gen();
            let visited: Vec<Coordinate> = world
                .grid
                .adjacent_locations(center, &mut replay)
                .into_iter()
                .filter(|at| rabbits.contains(at))
                .collect();
            assert_eq!(visited.len(), rabbits.len());

            world.act(fox);

            let fox = &world.animals[&fox];
            assert_eq!(fox.location(), visited.last().copied(), "seed {seed}");
            assert_ne!(visited.first(), visited.last());
        }
    }

    #[test]
    fn test_fox_ignores_other_foxes() {
        let mut world = World::new(1, 2);
        no_breeding(&mut world.rules.fox);
        let hunter = world.spawn(Species::Fox, Coordinate::new(0, 0));
        let other = world.spawn(Species::Fox, Coordinate::new(0, 1));

        world.act(hunter);

        assert!(world.animals[&other].is_alive());
        assert_eq!(
            world.animals[&hunter].cause_of_death(),
            Some(DeathCause::Overcrowding)
        );
    }

    #[test]
    fn test_breeding_places_young_next_to_parent() {
        let mut world = World::new(9, 9);
        world.rules.rabbit.breeding_probability = 1.0;
        world.rules.rabbit.max_litter_size = 9;
        world.rules.rabbit.max_age = 1000;
        let parent = world.spawn(Species::Rabbit, Coordinate::new(4, 4));
        world.set_age(parent, 10);

        let mut born = Vec::new();
        for _ in 0..10 {
            let before = world.animals[&parent].location().unwrap();
            let newborns = world.act(parent);
            for id in &newborns {
                let young = &world.animals[id];
                assert_eq!(young.age(), 0);
                assert_eq!(young.species(), Species::Rabbit);
                let at = young.location().unwrap();
                assert_eq!(before.chebyshev_distance(&at), 1);
            }
            born.extend(newborns);
            if !world.animals[&parent].is_alive() {
                break;
            }
        }

        assert!(!born.is_empty());
    }

    #[test]
    fn test_too_young_to_breed() {
        let mut world = World::new(5, 5);
        world.rules.rabbit.breeding_probability = 1.0;
        let id = world.spawn(Species::Rabbit, Coordinate::new(2, 2));

        // Age 1 after the first act, below the breeding age of 5
        assert!(world.act(id).is_empty());
    }

    #[test]
    #[should_panic(expected = "acted after dying")]
    fn test_dead_animal_cannot_act() {
        let mut world = World::new(1, 1);
        let id = world.spawn(Species::Rabbit, Coordinate::new(0, 0));
        world.act(id);
        assert!(!world.animals[&id].is_alive());
        world.act(id);
    }
}
