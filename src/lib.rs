pub mod config;
pub mod creature;
pub mod driver;
pub mod food;
pub mod genome;
pub mod history;
pub mod world;

pub use config::{ConfigError, SimulationConfig};
pub use creature::{Creature, CreatureId, CreatureState, Target};
pub use driver::{Simulation, SimulationPlugin};
pub use food::{Food, FoodId};
pub use genome::{Gene, Genome, MutationParams};
pub use history::{TraitHistory, TraitSample};
pub use world::{Counters, StatsSnapshot, TraitAverages, World};
