//! Configuration constants and runtime settings for the evolution simulator
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// GENOME SETTINGS
// ============================================================================

/// Inclusive range for the size gene
pub const SIZE_RANGE: (f32, f32) = (0.1, 10.0);

/// Inclusive range for the speed gene
pub const SPEED_RANGE: (f32, f32) = (0.1, 10.0);

/// Inclusive range for the appetite gene
pub const APPETITE_RANGE: (f32, f32) = (0.1, 1.0);

/// Value of every gene for creatures spawned without parents
pub const DEFAULT_GENE_VALUE: f32 = 1.0;

/// Mutation rate: percent chance per gene to mutate at birth
pub const MUTATION_RATE: f32 = 10.0;

/// Mutation strength: a mutated gene is scaled by a factor within ±this percent
pub const MUTATION_STRENGTH: f32 = 20.0;

// ============================================================================
// SPAWN SETTINGS
// ============================================================================

/// Number of creatures spawned by `initialize`
pub const INITIAL_CREATURE_COUNT: usize = 30;

/// Number of food items spawned by `initialize`
pub const INITIAL_FOOD_COUNT: usize = 100;

/// Probability per tick that one food item spawns
pub const FOOD_SPAWN_RATE: f32 = 0.15;

/// Distance from the world edges kept clear when placing initial creatures
pub const CREATURE_SPAWN_MARGIN: f32 = 50.0;

/// Distance from the world edges kept clear when placing food
pub const FOOD_SPAWN_MARGIN: f32 = 20.0;

/// Offspring land within ±this distance of the parents' midpoint on each axis
pub const OFFSPRING_JITTER: f32 = 10.0;

// ============================================================================
// METABOLISM & TIMING
// ============================================================================

/// Nominal simulation rate baked into the energy drain
pub const TICKS_PER_SECOND: f32 = 60.0;

/// Energy drained per simulated second for a creature with size 1 and speed 1
pub const BASE_CONSUMPTION: f32 = 1.0;

/// Lower bound of the randomized lifespan, in ticks
pub const MIN_LIFESPAN: u32 = 1000;

/// Upper bound (exclusive) of the randomized lifespan, in ticks
pub const MAX_LIFESPAN: u32 = 3000;

/// Ticks a creature must wait after reproducing before it can mate again
pub const REPRODUCTION_COOLDOWN: u32 = 200;

/// Fraction of its own max energy each parent spends on reproduction
pub const REPRODUCTION_COST: f32 = 0.3;

/// Parents must hold strictly more than this fraction of their max energy
pub const REPRODUCTION_ENERGY_THRESHOLD: f32 = 0.5;

/// Energy gained from eating one food item
pub const FOOD_ENERGY: f32 = 5.0;

/// Ticks after birth during which a reproduced creature counts as a newborn
pub const NEWBORN_TICKS: u32 = 120;

// ============================================================================
// BEHAVIOR THRESHOLDS
// ============================================================================

/// At or below this energy fraction a creature only looks for food
pub const HUNGER_THRESHOLD: f32 = 0.3;

/// At or above this energy fraction a creature only looks for a mate
pub const MATING_THRESHOLD: f32 = 0.7;

/// How far a hungry creature can see food
pub const HUNGER_SEARCH_RADIUS: f32 = 200.0;

/// Extra distance beyond touching at which two creatures can mate
pub const MATING_REACH: f32 = 20.0;

// ============================================================================
// BODY & MOVEMENT
// ============================================================================

/// Radius of a creature before its size gene is added
pub const BASE_CREATURE_RADIUS: f32 = 5.0;

/// Radius added per unit of (scaled) size
pub const RADIUS_PER_SIZE: f32 = 4.0;

/// Radius of a food item
pub const FOOD_RADIUS: f32 = 3.0;

/// Velocity multiplier applied every tick
pub const FRICTION: f32 = 0.95;

/// Maximum random change to each velocity component while wandering
pub const WANDER_JITTER: f32 = 0.1;

// ============================================================================
// WORLD SCALING
// ============================================================================

/// Global multiplier on creature speed
pub const CREATURE_SPEED: f32 = 1.0;

/// Global multiplier on creature size (affects radius only)
pub const CREATURE_SIZE: f32 = 1.0;

/// Max energy per unit of size
pub const BASE_ENERGY: f32 = 10.0;

/// Simulation ticks per rendered frame
pub const GAME_SPEED: f32 = 1.0;

// ============================================================================
// DRIVER SETTINGS
// ============================================================================

/// Rendered frames per second the headless driver aims for
pub const FRAME_RATE: f64 = 60.0;

/// Interval in seconds between stats log lines
pub const STATS_REPORT_INTERVAL: f32 = 5.0;

/// Default world width
pub const WORLD_WIDTH: f32 = 800.0;

/// Default world height
pub const WORLD_HEIGHT: f32 = 600.0;

/// Errors raised while loading a settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable simulation parameters.
///
/// Every field can be changed between ticks through [`crate::World::configure`].
/// Missing keys in a settings file fall back to the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_creatures: usize,
    pub initial_food: usize,
    /// Probability per tick that one food item spawns
    pub food_spawn_rate: f32,
    /// Optional cap on the number of food items alive at once
    pub max_food: Option<usize>,
    /// Ticks a food item survives uneaten; `None` means it never expires
    pub food_lifetime: Option<u32>,
    pub food_energy: f32,
    pub base_consumption: f32,
    pub game_speed: f32,
    pub creature_speed: f32,
    pub creature_size: f32,
    pub base_energy: f32,
    /// Percent chance per gene
    pub mutation_rate: f32,
    /// Percent deviation of the mutation factor
    pub mutation_strength: f32,
    /// Food search radius while hungry; `None` searches the whole world
    pub hunger_search_radius: Option<f32>,
    /// Mate search radius while eager to mate; `None` searches the whole world
    pub mate_search_radius: Option<f32>,
    /// Backfill the population with fresh creatures when it drops below this
    pub population_floor: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_creatures: INITIAL_CREATURE_COUNT,
            initial_food: INITIAL_FOOD_COUNT,
            food_spawn_rate: FOOD_SPAWN_RATE,
            max_food: None,
            food_lifetime: None,
            food_energy: FOOD_ENERGY,
            base_consumption: BASE_CONSUMPTION,
            game_speed: GAME_SPEED,
            creature_speed: CREATURE_SPEED,
            creature_size: CREATURE_SIZE,
            base_energy: BASE_ENERGY,
            mutation_rate: MUTATION_RATE,
            mutation_strength: MUTATION_STRENGTH,
            hunger_search_radius: Some(HUNGER_SEARCH_RADIUS),
            mate_search_radius: None,
            population_floor: None,
        }
    }
}

impl SimulationConfig {
    /// Parse settings from TOML. Values are sanitized before being returned.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Read settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Clamp every value into a range the simulation can run with.
    ///
    /// NaN collapses to the lower bound.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.food_spawn_rate = unit(self.food_spawn_rate);
        self.food_energy = non_negative(self.food_energy);
        self.base_consumption = non_negative(self.base_consumption);
        self.game_speed = non_negative(self.game_speed);
        self.creature_speed = non_negative(self.creature_speed);
        self.creature_size = non_negative(self.creature_size);
        self.base_energy = non_negative(self.base_energy);
        self.mutation_rate = percent(self.mutation_rate);
        self.mutation_strength = percent(self.mutation_strength);
        self.hunger_search_radius = self.hunger_search_radius.map(non_negative);
        self.mate_search_radius = self.mate_search_radius.map(non_negative);
        self
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

fn unit(value: f32) -> f32 {
    non_negative(value).min(1.0)
}

fn percent(value: f32) -> f32 {
    non_negative(value).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            "initial_creatures = 12\nfood_spawn_rate = 0.3\nmax_food = 250\n",
        )
        .unwrap();

        assert_eq!(config.initial_creatures, 12);
        assert_eq!(config.food_spawn_rate, 0.3);
        assert_eq!(config.max_food, Some(250));
        assert_eq!(config.initial_food, INITIAL_FOOD_COUNT);
        assert_eq!(config.base_energy, BASE_ENERGY);
        assert_eq!(config.hunger_search_radius, Some(HUNGER_SEARCH_RADIUS));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = SimulationConfig {
            food_spawn_rate: 4.0,
            game_speed: -2.0,
            creature_speed: -1.0,
            mutation_rate: 150.0,
            mutation_strength: f32::NAN,
            hunger_search_radius: Some(-5.0),
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.food_spawn_rate, 1.0);
        assert_eq!(config.game_speed, 0.0);
        assert_eq!(config.creature_speed, 0.0);
        assert_eq!(config.mutation_rate, 100.0);
        assert_eq!(config.mutation_strength, 0.0);
        assert_eq!(config.hunger_search_radius, Some(0.0));
    }

    #[test]
    fn test_bundled_settings_match_defaults() {
        let config = SimulationConfig::from_toml_str(include_str!("../darwin.toml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let result = SimulationConfig::from_toml_str("initial_creatures = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SimulationConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
