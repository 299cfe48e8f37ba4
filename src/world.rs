//! The world owns every creature and food item and advances them one tick
//! at a time.
//!
//! A tick runs four phases in a fixed order:
//!
//! 1. creatures age, pay their drain, die or decide/move/bounce
//! 2. food ages (and expires when a lifetime is configured)
//! 3. creatures touching food eat at most one item each
//! 4. new food may spawn
//!
//! Creatures are visited from the back of the list to the front. Deaths only
//! mark the creature; the list is compacted once the phase is over, so an
//! index taken during the phase stays valid until then.

use crate::config::*;
use crate::creature::{BodyScale, Creature, CreatureId, CreatureState, Target};
use crate::food::{Food, FoodId};
use crate::genome::{Genome, MutationParams};
use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Running totals of population events since the last `initialize`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub total_reproductions: u64,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_mutations: u64,
    /// Creatures added by the population floor rather than born
    pub total_backfilled: u64,
}

/// Mean gene values across the live population
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraitAverages {
    pub size: f32,
    pub speed: f32,
    pub appetite: f32,
}

/// Everything a stats panel needs, captured at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub tick: u64,
    pub population: usize,
    pub food: usize,
    pub counters: Counters,
    pub averages: TraitAverages,
}

/// What a creature chose to do during the decision phase
#[derive(Debug, Clone, Copy)]
enum Action {
    SeekFood { id: FoodId, position: Vec2 },
    PursueMate { index: usize },
    Wander { state: CreatureState },
}

/// A bounded plane holding the creature and food populations.
pub struct World {
    width: f32,
    height: f32,
    config: SimulationConfig,
    creatures: Vec<Creature>,
    food: Vec<Food>,
    running: bool,
    counters: Counters,
    tick: u64,
    next_id: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Create an empty, paused world. Call [`World::initialize`] to populate it.
    pub fn new(width: f32, height: f32, config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(width, height, config, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rng(width: f32, height: f32, config: SimulationConfig, rng: ChaCha8Rng) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            config: config.sanitized(),
            creatures: Vec::new(),
            food: Vec::new(),
            running: false,
            counters: Counters::default(),
            tick: 0,
            next_id: 0,
            rng,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    /// Direct access for tools and tests. Call [`World::apply_world_parameters`]
    /// after changing a genome.
    pub fn creatures_mut(&mut self) -> &mut [Creature] {
        &mut self.creatures
    }

    pub fn food(&self) -> &[Food] {
        &self.food
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Ticks executed since the last `initialize`
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Change settings between ticks. Values are clamped and every live
    /// creature's body is recomputed.
    pub fn configure(&mut self, edit: impl FnOnce(&mut SimulationConfig)) {
        let mut config = self.config.clone();
        edit(&mut config);
        self.config = config.sanitized();
        self.apply_world_parameters();
    }

    /// Recompute derived attributes of every creature from the current multipliers
    pub fn apply_world_parameters(&mut self) {
        let scale = BodyScale::from(&self.config);
        for creature in &mut self.creatures {
            creature.apply_world_parameters(scale);
        }
    }

    /// Reset to the configured initial population. The random source and the
    /// running flag are left as they are.
    pub fn initialize(&mut self) {
        self.creatures.clear();
        self.food.clear();
        self.counters = Counters::default();
        self.tick = 0;

        for _ in 0..self.config.initial_creatures {
            let position = self.random_position(CREATURE_SPAWN_MARGIN);
            self.spawn_creature(position, Genome::default());
        }
        for _ in 0..self.config.initial_food {
            self.spawn_food();
        }
        self.apply_world_parameters();

        info!(
            "World initialized: {}x{}, {} creatures, {} food",
            self.width,
            self.height,
            self.creatures.len(),
            self.food.len()
        );
    }

    /// Add a creature with the given genome. It does not count as a birth.
    pub fn spawn_creature(&mut self, position: Vec2, genome: Genome) -> CreatureId {
        let id = self.next_creature_id();
        let scale = BodyScale::from(&self.config);
        let creature = Creature::with_genome(id, position, genome, scale, &mut self.rng);
        self.creatures.push(creature);
        id
    }

    /// Add one food item at a random position away from the edges
    pub fn spawn_food(&mut self) -> FoodId {
        let position = self.random_position(FOOD_SPAWN_MARGIN);
        self.spawn_food_at(position)
    }

    pub fn spawn_food_at(&mut self, position: Vec2) -> FoodId {
        let id = FoodId(self.next_id);
        self.next_id += 1;
        self.food.push(Food::new(id, position));
        id
    }

    /// Advance the simulation by one tick. Does nothing while paused.
    pub fn update(&mut self) {
        if !self.running {
            return;
        }
        self.tick += 1;

        let had_creatures = !self.creatures.is_empty();
        self.update_creatures();
        self.update_food();
        self.resolve_feeding();
        self.spawn_food_stochastically();
        self.enforce_population_floor();

        if had_creatures && self.creatures.is_empty() {
            warn!("Population went extinct at tick {}", self.tick);
        }
    }

    /// Run one rendered frame's worth of ticks according to `game_speed`.
    ///
    /// The whole part of the speed is run outright and the fractional part is
    /// run as one extra tick with that probability. Returns how many ticks ran.
    pub fn advance_frame(&mut self) -> u32 {
        if !self.running {
            return 0;
        }
        let speed = self.config.game_speed.max(0.0);
        let whole = speed.floor();
        let fraction = f64::from(speed - whole);

        let mut ticks = whole as u32;
        if fraction > 0.0 && self.rng.gen_bool(fraction) {
            ticks += 1;
        }
        for _ in 0..ticks {
            self.update();
        }
        ticks
    }

    /// Mean of each gene over the live population (all zero when empty)
    pub fn average_traits(&self) -> TraitAverages {
        let count = self.creatures.len();
        if count == 0 {
            return TraitAverages::default();
        }
        let total = self
            .creatures
            .iter()
            .fold(TraitAverages::default(), |acc, creature| TraitAverages {
                size: acc.size + creature.genome.size,
                speed: acc.speed + creature.genome.speed,
                appetite: acc.appetite + creature.genome.appetite,
            });
        let count = count as f32;
        TraitAverages {
            size: total.size / count,
            speed: total.speed / count,
            appetite: total.appetite / count,
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            tick: self.tick,
            population: self.creatures.len(),
            food: self.food.len(),
            counters: self.counters,
            averages: self.average_traits(),
        }
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|creature| creature.id == id)
    }

    /// The creature whose body covers `point`, preferring the closest centre
    pub fn creature_at(&self, point: Vec2) -> Option<&Creature> {
        let mut closest: Option<(&Creature, f32)> = None;

        for creature in &self.creatures {
            if creature.contains_point(point) {
                let distance = creature.distance_to(point);
                match closest {
                    None => closest = Some((creature, distance)),
                    Some((_, closest_dist)) if distance < closest_dist => {
                        closest = Some((creature, distance));
                    }
                    _ => {}
                }
            }
        }

        closest.map(|(creature, _)| creature)
    }

    /// Mate the creatures at `first` and `second`.
    ///
    /// Both must hold more than half of their max energy, otherwise nothing
    /// changes and `None` is returned. On success the child is appended to the
    /// creature list, both parents pay the reproduction cost and start their
    /// cooldown.
    pub fn reproduce(&mut self, first: usize, second: usize) -> Option<CreatureId> {
        if first == second || first >= self.creatures.len() || second >= self.creatures.len() {
            return None;
        }
        let (a, b) = (&self.creatures[first], &self.creatures[second]);
        if !a.has_mating_energy() || !b.has_mating_energy() {
            return None;
        }

        let mut genome = a.genome.crossover(&b.genome);
        let params = MutationParams::new(self.config.mutation_rate, self.config.mutation_strength);
        let has_mutation = genome.mutate(params, &mut self.rng);

        let midpoint = (a.position + b.position) / 2.0;
        let jitter = Vec2::new(
            self.rng.gen_range(-OFFSPRING_JITTER..=OFFSPRING_JITTER),
            self.rng.gen_range(-OFFSPRING_JITTER..=OFFSPRING_JITTER),
        );

        let id = self.next_creature_id();
        let scale = BodyScale::from(&self.config);
        let child = Creature::offspring(id, midpoint + jitter, genome, has_mutation, scale, &mut self.rng);
        debug!("Creature {:?} born ({})", id, child.genome);
        self.creatures.push(child);

        self.counters.total_births += 1;
        self.counters.total_reproductions += 1;
        if has_mutation {
            self.counters.total_mutations += 1;
        }

        self.creatures[first].pay_reproduction_cost();
        self.creatures[second].pay_reproduction_cost();
        Some(id)
    }

    fn next_creature_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_id);
        self.next_id += 1;
        id
    }

    fn random_position(&mut self, margin: f32) -> Vec2 {
        let span_x = (self.width - 2.0 * margin).max(0.0);
        let span_y = (self.height - 2.0 * margin).max(0.0);
        let margin_x = margin.min(self.width / 2.0);
        let margin_y = margin.min(self.height / 2.0);
        Vec2::new(
            margin_x + self.rng.gen_range(0.0..=span_x),
            margin_y + self.rng.gen_range(0.0..=span_y),
        )
    }

    fn update_creatures(&mut self) {
        let count = self.creatures.len();
        for index in (0..count).rev() {
            if !self.creatures[index].is_alive() {
                continue;
            }

            let creature = &mut self.creatures[index];
            creature.metabolize(self.config.base_consumption);
            if creature.should_die() {
                creature.removed = true;
                self.counters.total_deaths += 1;
                debug!("Creature {:?} died at age {}", creature.id, creature.age);
                continue;
            }

            let action = self.decide(index);
            self.perform(index, action);

            let (width, height) = (self.width, self.height);
            let creature = &mut self.creatures[index];
            creature.step();
            creature.check_boundaries(width, height);
        }
        self.creatures.retain(Creature::is_alive);
    }

    fn decide(&self, index: usize) -> Action {
        let creature = &self.creatures[index];
        let energy_percent = creature.energy_percent();

        if energy_percent <= HUNGER_THRESHOLD {
            return match self.nearest_food(creature.position, self.config.hunger_search_radius) {
                Some((food, _)) => Action::SeekFood {
                    id: food.id,
                    position: food.position,
                },
                None => Action::Wander {
                    state: CreatureState::SeekingFood,
                },
            };
        }

        if energy_percent >= MATING_THRESHOLD {
            if creature.reproduction_cooldown > 0 {
                return Action::Wander {
                    state: CreatureState::Mating,
                };
            }
            return match self.nearest_mate(index, self.config.mate_search_radius) {
                Some((mate, _)) => Action::PursueMate { index: mate },
                None => Action::Wander {
                    state: CreatureState::Mating,
                },
            };
        }

        // Appetite trades off distance to food against distance to a mate
        let appetite = creature.genome.appetite;
        let closest_food = self.nearest_food(creature.position, None);
        let closest_mate = self.nearest_mate(index, None);
        let food_drive = closest_food.map_or(f32::INFINITY, |(_, distance)| distance * appetite);
        let mate_drive = closest_mate.map_or(f32::INFINITY, |(_, distance)| distance * (1.0 / appetite));

        match (closest_food, closest_mate) {
            (Some((food, _)), _) if food_drive <= mate_drive => Action::SeekFood {
                id: food.id,
                position: food.position,
            },
            (_, Some((mate, _))) if mate_drive < food_drive && creature.reproduction_cooldown == 0 => {
                Action::PursueMate { index: mate }
            }
            _ => Action::Wander {
                state: CreatureState::SeekingFood,
            },
        }
    }

    fn perform(&mut self, index: usize, action: Action) {
        match action {
            Action::SeekFood { id, position } => {
                let creature = &mut self.creatures[index];
                creature.state = CreatureState::SeekingFood;
                creature.target = Some(Target::Food(id));
                creature.move_toward(position);
            }
            Action::PursueMate { index: mate } => {
                let (mate_id, mate_position, mate_radius) = {
                    let mate = &self.creatures[mate];
                    (mate.id, mate.position, mate.radius)
                };
                let creature = &mut self.creatures[index];
                creature.state = CreatureState::Mating;
                creature.target = Some(Target::Mate(mate_id));

                let reach = creature.radius + mate_radius + MATING_REACH;
                let in_reach = creature.distance_to(mate_position) < reach;
                // A refused attempt keeps closing in instead of coasting
                if !in_reach || self.reproduce(index, mate).is_none() {
                    self.creatures[index].move_toward(mate_position);
                }
            }
            Action::Wander { state } => {
                let creature = &mut self.creatures[index];
                creature.state = state;
                creature.target = None;
                creature.wander(&mut self.rng);
            }
        }
    }

    /// Closest food to `from`, optionally within `radius`. Ties keep the
    /// earlier item.
    fn nearest_food(&self, from: Vec2, radius: Option<f32>) -> Option<(&Food, f32)> {
        let limit = radius.unwrap_or(f32::INFINITY);
        let mut closest: Option<(&Food, f32)> = None;
        for food in &self.food {
            let distance = from.distance(food.position);
            if distance >= limit {
                continue;
            }
            if closest.is_none_or(|(_, best)| distance < best) {
                closest = Some((food, distance));
            }
        }
        closest
    }

    /// Index of the closest available mate for the creature at `index`
    fn nearest_mate(&self, index: usize, radius: Option<f32>) -> Option<(usize, f32)> {
        let from = self.creatures[index].position;
        let limit = radius.unwrap_or(f32::INFINITY);
        let mut closest: Option<(usize, f32)> = None;
        for (other, candidate) in self.creatures.iter().enumerate() {
            if other == index || !candidate.is_available_mate() {
                continue;
            }
            let distance = from.distance(candidate.position);
            if distance >= limit {
                continue;
            }
            if closest.is_none_or(|(_, best)| distance < best) {
                closest = Some((other, distance));
            }
        }
        closest
    }

    fn update_food(&mut self) {
        let lifetime = self.config.food_lifetime;
        self.food.retain_mut(|food| food.update(lifetime));
    }

    fn resolve_feeding(&mut self) {
        let gain = self.config.food_energy;
        for index in (0..self.creatures.len()).rev() {
            let creature = &self.creatures[index];
            let eaten = self.food.iter().rposition(|food| {
                creature.distance_to(food.position) < creature.radius + food.radius
            });
            if let Some(food_index) = eaten {
                self.food.remove(food_index);
                self.creatures[index].feed(gain);
            }
        }
    }

    fn spawn_food_stochastically(&mut self) {
        let roll = self.rng.gen_bool(f64::from(self.config.food_spawn_rate));
        let below_cap = self.config.max_food.is_none_or(|cap| self.food.len() < cap);
        if roll && below_cap {
            self.spawn_food();
        }
    }

    fn enforce_population_floor(&mut self) {
        let Some(floor) = self.config.population_floor else {
            return;
        };
        let missing = floor.saturating_sub(self.creatures.len());
        if missing == 0 {
            return;
        }
        for _ in 0..missing {
            let position = self.random_position(CREATURE_SPAWN_MARGIN);
            self.spawn_creature(position, Genome::default());
        }
        self.counters.total_backfilled += missing as u64;
        info!("Backfilled {} creatures to hold the population floor of {}", missing, floor);
    }
}
