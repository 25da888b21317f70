//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::warn;

/// Field dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of rows (the field's depth)
    pub rows: i32,
    /// Number of columns (the field's width)
    pub cols: i32,
}

impl FieldConfig {
    pub const DEFAULT_ROWS: i32 = 80;
    pub const DEFAULT_COLS: i32 = 120;

    /// Replace non-positive dimensions with the default size.
    pub fn validated(self) -> Self {
        if self.rows <= 0 || self.cols <= 0 {
            warn!(
                requested_rows = self.rows,
                requested_cols = self.cols,
                default_rows = Self::DEFAULT_ROWS,
                default_cols = Self::DEFAULT_COLS,
                "Field dimensions must be positive, using the default size"
            );
            return Self::default();
        }
        self
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_ROWS,
            cols: Self::DEFAULT_COLS,
        }
    }
}

/// Life-cycle constants shared by every member of one species
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Age at which an animal may start to breed
    pub breeding_age: u32,
    /// Oldest age an animal can reach; it dies once its age exceeds this
    pub max_age: u32,
    /// Chance of breeding on any one step (0.0 to 1.0)
    pub breeding_probability: f64,
    /// Exclusive upper bound of a litter's size
    pub max_litter_size: u32,
}

impl SpeciesConfig {
    pub fn rabbit() -> Self {
        Self {
            breeding_age: 5,
            max_age: 40,
            breeding_probability: 0.12,
            max_litter_size: 4,
        }
    }

    pub fn fox() -> Self {
        Self {
            breeding_age: 15,
            max_age: 150,
            breeding_probability: 0.08,
            max_litter_size: 2,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.max_age == 0 {
            return Err(Error::Validation(format!("{name}: max_age must be positive")));
        }
        check_probability(&format!("{name}.breeding_probability"), self.breeding_probability)
    }
}

/// Species settings as read from a file; absent fields fall back to the
/// species' own defaults rather than a shared one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpeciesOverrides {
    breeding_age: Option<u32>,
    max_age: Option<u32>,
    breeding_probability: Option<f64>,
    max_litter_size: Option<u32>,
}

impl SpeciesOverrides {
    fn apply(self, base: SpeciesConfig) -> SpeciesConfig {
        SpeciesConfig {
            breeding_age: self.breeding_age.unwrap_or(base.breeding_age),
            max_age: self.max_age.unwrap_or(base.max_age),
            breeding_probability: self.breeding_probability.unwrap_or(base.breeding_probability),
            max_litter_size: self.max_litter_size.unwrap_or(base.max_litter_size),
        }
    }
}

fn rabbit_config<'de, D>(deserializer: D) -> std::result::Result<SpeciesConfig, D::Error>
where
    D: Deserializer<'de>,
{
    SpeciesOverrides::deserialize(deserializer).map(|o| o.apply(SpeciesConfig::rabbit()))
}

fn fox_config<'de, D>(deserializer: D) -> std::result::Result<SpeciesConfig, D::Error>
where
    D: Deserializer<'de>,
{
    SpeciesOverrides::deserialize(deserializer).map(|o| o.apply(SpeciesConfig::fox()))
}

/// Feeding constants for foxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoxDiet {
    /// Steps a fox can go on after eating one rabbit
    pub rabbit_food_value: i32,
    /// Food level at which a fox is full
    pub max_food_level: i32,
}

impl Default for FoxDiet {
    fn default() -> Self {
        Self {
            rabbit_food_value: 9,
            max_food_level: 20,
        }
    }
}

/// Probabilities used when seeding the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Chance that any given cell starts with a fox
    pub fox_creation_probability: f64,
    /// Chance that a cell without a fox starts with a rabbit
    pub rabbit_creation_probability: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            fox_creation_probability: 0.02,
            rabbit_creation_probability: 0.08,
        }
    }
}

/// Random number source configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Seed of the shared generator
    pub seed: u64,
    /// Draw from one seeded, resettable generator. When false every draw
    /// uses fresh entropy and runs are not reproducible.
    pub shared: bool,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            seed: 1111,
            shared: true,
        }
    }
}

/// Settings for driving a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Steps run by the driver
    pub steps: u64,
    /// Length of a "long" run
    pub long_run_steps: u64,
    /// Pause between steps (milliseconds)
    pub step_delay_ms: u64,
    /// Log a population summary every this many steps (0 disables)
    pub report_interval: u64,
    /// Number of most recent steps kept in the population history
    pub history_capacity: usize,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 4000,
            long_run_steps: 4000,
            step_delay_ms: 0,
            report_interval: 100,
            history_capacity: 500,
            otel_endpoint: None,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub field: FieldConfig,
    pub population: PopulationConfig,
    #[serde(deserialize_with = "rabbit_config")]
    pub rabbit: SpeciesConfig,
    #[serde(deserialize_with = "fox_config")]
    pub fox: SpeciesConfig,
    pub fox_diet: FoxDiet,
    pub random: RandomConfig,
    pub run: RunConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            population: PopulationConfig::default(),
            rabbit: SpeciesConfig::rabbit(),
            fox: SpeciesConfig::fox(),
            fox_diet: FoxDiet::default(),
            random: RandomConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the values the engine cannot work with. Field dimensions are not
    /// checked here; see [`FieldConfig::validated`].
    pub fn validate(&self) -> Result<()> {
        self.rabbit.validate("rabbit")?;
        self.fox.validate("fox")?;
        check_probability(
            "population.fox_creation_probability",
            self.population.fox_creation_probability,
        )?;
        check_probability(
            "population.rabbit_creation_probability",
            self.population.rabbit_creation_probability,
        )?;
        if self.fox_diet.rabbit_food_value <= 0 {
            return Err(Error::Validation(
                "fox_diet.rabbit_food_value must be positive".to_string(),
            ));
        }
        if self.fox_diet.max_food_level < self.fox_diet.rabbit_food_value {
            return Err(Error::Validation(
                "fox_diet.max_food_level must be at least rabbit_food_value".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = SimulationConfig::default();
        assert_eq!(config.field.rows, 80);
        assert_eq!(config.field.cols, 120);
        assert_eq!(config.rabbit.max_age, 40);
        assert_eq!(config.fox.breeding_age, 15);
        assert_eq!(config.fox_diet.rabbit_food_value, 9);
        assert_eq!(config.random.seed, 1111);
        assert_eq!(config.run.long_run_steps, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_dimensions_fall_back_to_default() {
        let field = FieldConfig { rows: 0, cols: 10 }.validated();
        assert_eq!(field, FieldConfig::default());

        let field = FieldConfig { rows: 5, cols: -3 }.validated();
        assert_eq!(field, FieldConfig::default());

        let field = FieldConfig { rows: 5, cols: 7 }.validated();
        assert_eq!(field, FieldConfig { rows: 5, cols: 7 });
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{ "field": { "rows": 20 }, "random": { "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.field.rows, 20);
        assert_eq!(config.field.cols, 120);
        assert_eq!(config.random.seed, 7);
        assert!(config.random.shared);
        assert_eq!(config.fox, SpeciesConfig::fox());
    }

    #[test]
    fn test_partial_species_keeps_its_own_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{ "fox": { "max_age": 200 }, "rabbit": { "max_litter_size": 6 } }"#,
        )
        .unwrap();
        assert_eq!(config.fox.max_age, 200);
        assert_eq!(config.fox.breeding_age, 15);
        assert_eq!(config.fox.breeding_probability, 0.08);
        assert_eq!(config.fox.max_litter_size, 2);
        assert_eq!(config.rabbit.max_litter_size, 6);
        assert_eq!(config.rabbit.max_age, 40);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = SimulationConfig::default();
        config.population.rabbit_creation_probability = 1.5;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));

        let mut config = SimulationConfig::default();
        config.fox.breeding_probability = -0.1;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_diet() {
        let mut config = SimulationConfig::default();
        config.fox_diet.rabbit_food_value = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.fox_diet.max_food_level = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = SimulationConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.rabbit, config.rabbit);
        assert_eq!(parsed.population, config.population);
    }
}
