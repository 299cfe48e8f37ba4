use crate::config::*;
use crate::food::FoodId;
use crate::genome::{Genome, round2};
use bevy::math::Vec2;
use rand::Rng;

/// Stable identity of a creature within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureId(pub u64);

/// What the creature is currently trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatureState {
    #[default]
    SeekingFood,
    Mating,
}

/// The entity a creature is heading toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Food(FoodId),
    Mate(CreatureId),
}

/// World-level multipliers that feed the derived body attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyScale {
    pub creature_speed: f32,
    pub creature_size: f32,
    pub base_energy: f32,
}

impl Default for BodyScale {
    fn default() -> Self {
        Self {
            creature_speed: CREATURE_SPEED,
            creature_size: CREATURE_SIZE,
            base_energy: BASE_ENERGY,
        }
    }
}

impl From<&SimulationConfig> for BodyScale {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            creature_speed: config.creature_speed,
            creature_size: config.creature_size,
            base_energy: config.base_energy,
        }
    }
}

/// A creature with energy, age and a genome
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    pub id: CreatureId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub genome: Genome,
    pub radius: f32,
    pub max_speed: f32,
    pub max_energy: f32,
    pub energy: f32,
    pub age: u32,
    pub max_age: u32,
    pub reproduction_cooldown: u32,
    pub state: CreatureState,
    pub target: Option<Target>,
    pub born_from_reproduction: bool,
    pub has_mutation: bool,
    /// Set when the creature died this tick; dropped when the world compacts
    pub(crate) removed: bool,
}

impl Creature {
    /// Spawn a creature with the default genome
    pub fn new<R: Rng + ?Sized>(
        id: CreatureId,
        position: Vec2,
        scale: BodyScale,
        rng: &mut R,
    ) -> Self {
        Self::with_genome(id, position, Genome::default(), scale, rng)
    }

    /// Spawn a creature with a given genome, at half of its max energy
    pub fn with_genome<R: Rng + ?Sized>(
        id: CreatureId,
        position: Vec2,
        genome: Genome,
        scale: BodyScale,
        rng: &mut R,
    ) -> Self {
        let mut creature = Self {
            id,
            position,
            velocity: Vec2::ZERO,
            genome,
            radius: 0.0,
            max_speed: 0.0,
            max_energy: 0.0,
            energy: 0.0,
            age: 0,
            max_age: rng.gen_range(MIN_LIFESPAN..MAX_LIFESPAN),
            reproduction_cooldown: 0,
            state: CreatureState::SeekingFood,
            target: None,
            born_from_reproduction: false,
            has_mutation: false,
            removed: false,
        };
        creature.apply_world_parameters(scale);
        creature.energy = creature.max_energy / 2.0;
        creature
    }

    /// Spawn the offspring of two parents
    pub fn offspring<R: Rng + ?Sized>(
        id: CreatureId,
        position: Vec2,
        genome: Genome,
        has_mutation: bool,
        scale: BodyScale,
        rng: &mut R,
    ) -> Self {
        let mut child = Self::with_genome(id, position, genome, scale, rng);
        child.born_from_reproduction = true;
        child.has_mutation = has_mutation;
        child
    }

    /// Recompute radius, top speed and energy capacity from the genome and
    /// the world multipliers. Energy above the new capacity is dropped.
    pub fn apply_world_parameters(&mut self, scale: BodyScale) {
        self.radius =
            BASE_CREATURE_RADIUS + (scale.creature_size * self.genome.size) * RADIUS_PER_SIZE;
        // size >= 0.1 by construction, so the division is safe
        self.max_speed = scale.creature_speed * self.genome.speed * (1.0 / self.genome.size);
        self.max_energy = self.genome.size * scale.base_energy;
        self.energy = self.energy.min(self.max_energy);
    }

    pub fn energy_percent(&self) -> f32 {
        if self.max_energy > 0.0 {
            self.energy / self.max_energy
        } else {
            0.0
        }
    }

    /// Age by one tick, pay the energy drain and count down the cooldown
    pub fn metabolize(&mut self, base_consumption: f32) {
        self.age += 1;
        let drain = base_consumption * self.genome.speed * self.genome.size * (1.0 / TICKS_PER_SECOND);
        self.energy = round2(self.energy - drain).min(self.max_energy);
        self.reproduction_cooldown = self.reproduction_cooldown.saturating_sub(1);
    }

    pub fn should_die(&self) -> bool {
        self.age > self.max_age || self.energy <= 0.0
    }

    pub fn is_alive(&self) -> bool {
        !self.removed
    }

    /// Has enough energy to reproduce
    pub fn has_mating_energy(&self) -> bool {
        self.energy > self.max_energy * REPRODUCTION_ENERGY_THRESHOLD
    }

    /// Eligible to be picked as someone's mate
    pub fn is_available_mate(&self) -> bool {
        self.is_alive() && self.has_mating_energy() && self.reproduction_cooldown == 0
    }

    /// Reproduced creatures stay newborns for `newborn_ticks` after birth
    pub fn is_newborn(&self, newborn_ticks: u32) -> bool {
        self.born_from_reproduction && self.age < newborn_ticks
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.distance_to(point) <= self.radius
    }

    /// Point straight at `target` at full speed. Leaves velocity alone when
    /// already on top of it.
    pub fn move_toward(&mut self, target: Vec2) {
        let delta = target - self.position;
        let distance = delta.length();
        if distance > 0.0 {
            self.velocity = delta / distance * self.max_speed;
        }
    }

    /// Nudge the velocity randomly, capped at max speed
    pub fn wander<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.velocity.x += rng.gen_range(-WANDER_JITTER..=WANDER_JITTER);
        self.velocity.y += rng.gen_range(-WANDER_JITTER..=WANDER_JITTER);
        self.velocity = self.velocity.clamp_length_max(self.max_speed);
    }

    /// Integrate position and apply friction
    pub fn step(&mut self) {
        self.position += self.velocity;
        self.velocity *= FRICTION;
    }

    /// Keep the body inside `[0, width] x [0, height]`, bouncing off the edges
    pub fn check_boundaries(&mut self, width: f32, height: f32) {
        if self.position.x - self.radius < 0.0 {
            self.position.x = self.radius;
            self.velocity.x = self.velocity.x.abs();
        }
        if self.position.x + self.radius > width {
            self.position.x = width - self.radius;
            self.velocity.x = -self.velocity.x.abs();
        }
        if self.position.y - self.radius < 0.0 {
            self.position.y = self.radius;
            self.velocity.y = self.velocity.y.abs();
        }
        if self.position.y + self.radius > height {
            self.position.y = height - self.radius;
            self.velocity.y = -self.velocity.y.abs();
        }
    }

    pub fn feed(&mut self, amount: f32) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    /// Pay the energy cost of reproducing and start the cooldown
    pub fn pay_reproduction_cost(&mut self) {
        self.energy -= self.max_energy * REPRODUCTION_COST;
        self.reproduction_cooldown = REPRODUCTION_COOLDOWN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn creature_at(position: Vec2) -> Creature {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Creature::new(CreatureId(0), position, BodyScale::default(), &mut rng)
    }

    #[test]
    fn test_derived_attributes_follow_genome() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let scale = BodyScale {
            creature_speed: 2.0,
            creature_size: 1.5,
            base_energy: 10.0,
        };
        let creature = Creature::with_genome(
            CreatureId(0),
            Vec2::ZERO,
            Genome::new(2.0, 3.0, 0.5),
            scale,
            &mut rng,
        );
        assert_eq!(creature.radius, 5.0 + 1.5 * 2.0 * 4.0);
        assert_eq!(creature.max_speed, 2.0 * 3.0 / 2.0);
        assert_eq!(creature.max_energy, 20.0);
        assert_eq!(creature.energy, 10.0);
        assert!((MIN_LIFESPAN..MAX_LIFESPAN).contains(&creature.max_age));
    }

    #[test]
    fn test_lowering_base_energy_clamps_energy() {
        let mut creature = creature_at(Vec2::ZERO);
        creature.energy = 9.0;
        creature.apply_world_parameters(BodyScale {
            base_energy: 4.0,
            ..Default::default()
        });
        assert_eq!(creature.max_energy, 4.0);
        assert_eq!(creature.energy, 4.0);
    }

    #[test]
    fn test_metabolize_drains_and_counts_down() {
        let mut creature = creature_at(Vec2::ZERO);
        creature.reproduction_cooldown = 1;
        creature.metabolize(1.0);
        assert_eq!(creature.age, 1);
        assert_eq!(creature.energy, 4.98);
        assert_eq!(creature.reproduction_cooldown, 0);

        creature.metabolize(1.0);
        assert_eq!(creature.reproduction_cooldown, 0);
    }

    #[test]
    fn test_move_toward_zero_distance_keeps_velocity() {
        let mut creature = creature_at(Vec2::new(50.0, 50.0));
        creature.velocity = Vec2::new(0.3, -0.2);
        creature.move_toward(Vec2::new(50.0, 50.0));
        assert_eq!(creature.velocity, Vec2::new(0.3, -0.2));
    }

    #[test]
    fn test_move_toward_snaps_heading() {
        let mut creature = creature_at(Vec2::new(0.0, 0.0));
        creature.move_toward(Vec2::new(30.0, 40.0));
        assert!((creature.velocity - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_wander_respects_max_speed() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut creature = creature_at(Vec2::new(50.0, 50.0));
        for _ in 0..500 {
            creature.wander(&mut rng);
            assert!(creature.velocity.length() <= creature.max_speed + 1e-5);
        }
    }

    #[test]
    fn test_step_applies_friction() {
        let mut creature = creature_at(Vec2::new(10.0, 10.0));
        creature.velocity = Vec2::new(1.0, 0.0);
        creature.step();
        assert_eq!(creature.position, Vec2::new(11.0, 10.0));
        assert!((creature.velocity.x - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_feed_is_capped() {
        let mut creature = creature_at(Vec2::ZERO);
        creature.energy = 8.0;
        creature.feed(FOOD_ENERGY);
        assert_eq!(creature.energy, creature.max_energy);
    }

    #[test]
    fn test_newborn_window() {
        let mut creature = creature_at(Vec2::ZERO);
        assert!(!creature.is_newborn(NEWBORN_TICKS));
        creature.born_from_reproduction = true;
        assert!(creature.is_newborn(NEWBORN_TICKS));
        creature.age = NEWBORN_TICKS;
        assert!(!creature.is_newborn(NEWBORN_TICKS));
    }
}
