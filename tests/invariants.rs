use bevy::math::Vec2;
use darwin_world::creature::BodyScale;
use darwin_world::{Creature, CreatureId, Gene, Genome, MutationParams, SimulationConfig, World};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn busy_config() -> SimulationConfig {
    SimulationConfig {
        initial_creatures: 40,
        initial_food: 150,
        food_spawn_rate: 0.5,
        mutation_rate: 50.0,
        mutation_strength: 40.0,
        ..Default::default()
    }
}

fn assert_world_invariants(world: &World, initial_creatures: usize) {
    for creature in world.creatures() {
        assert!(creature.energy >= 0.0, "negative energy {}", creature.energy);
        assert!(
            creature.energy <= creature.max_energy,
            "energy {} above max {}",
            creature.energy,
            creature.max_energy
        );
        assert!(creature.genome.is_valid(), "genome out of range: {}", creature.genome);
    }
    let counters = world.counters();
    assert_eq!(
        counters.total_births as i64 - counters.total_deaths as i64,
        world.creatures().len() as i64 - initial_creatures as i64,
        "bookkeeping diverged at tick {}",
        world.tick()
    );
}

#[test]
fn test_invariants_hold_every_tick() {
    let config = busy_config();
    let initial = config.initial_creatures;
    let mut world = World::new(800.0, 600.0, config, 2024);
    world.initialize();
    world.start();

    for _ in 0..1_000 {
        world.update();
        assert_world_invariants(&world, initial);
    }
}

#[test]
fn test_same_seed_same_history() {
    let run = |seed: u64| {
        let mut world = World::new(800.0, 600.0, busy_config(), seed);
        world.initialize();
        world.start();
        for _ in 0..500 {
            world.advance_frame();
        }
        world
    };

    let first = run(77);
    let second = run(77);
    assert_eq!(first.tick(), second.tick());
    assert_eq!(first.creatures(), second.creatures());
    assert_eq!(first.food(), second.food());
    assert_eq!(first.counters(), second.counters());

    let other = run(78);
    assert_ne!(first.creatures(), other.creatures());
}

#[test]
fn test_mutation_never_escapes_range_at_the_edge() {
    let mut rng = ChaCha8Rng::seed_from_u64(10_000);
    let params = MutationParams::new(100.0, 100.0);

    let mut top = Genome::new(10.0, 10.0, 1.0);
    let mut bottom = Genome::new(0.1, 0.1, 0.1);
    for _ in 0..10_000 {
        top.mutate(params, &mut rng);
        bottom.mutate(params, &mut rng);
        assert!(top.is_valid(), "{top}");
        assert!(bottom.is_valid(), "{bottom}");
        assert!(top.size <= 10.0 && top.speed <= 10.0 && top.appetite <= 1.0);
        assert!(bottom.size >= 0.1 && bottom.speed >= 0.1 && bottom.appetite >= 0.1);
    }
}

#[test]
fn test_boundary_reflection() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let (width, height) = (800.0, 600.0);

    let mut east = Creature::new(CreatureId(0), Vec2::new(795.0, 300.0), BodyScale::default(), &mut rng);
    east.velocity = Vec2::new(5.0, 0.0);
    east.step();
    east.check_boundaries(width, height);
    assert_eq!(east.position.x, width - east.radius);
    assert!(east.velocity.x < 0.0);

    let mut north_west = Creature::new(CreatureId(1), Vec2::new(4.0, 3.0), BodyScale::default(), &mut rng);
    north_west.velocity = Vec2::new(-2.0, -3.0);
    north_west.step();
    north_west.check_boundaries(width, height);
    assert_eq!(north_west.position, Vec2::splat(north_west.radius));
    assert!(north_west.velocity.x > 0.0);
    assert!(north_west.velocity.y > 0.0);

    let mut south = Creature::new(CreatureId(2), Vec2::new(400.0, 595.0), BodyScale::default(), &mut rng);
    south.velocity = Vec2::new(0.5, 4.0);
    south.step();
    south.check_boundaries(width, height);
    assert_eq!(south.position.y, height - south.radius);
    assert!(south.velocity.y < 0.0);
    assert!(south.velocity.x > 0.0);
}

prop_compose! {
    fn arb_genome()(
        size in 0.1f32..=10.0,
        speed in 0.1f32..=10.0,
        appetite in 0.1f32..=1.0
    ) -> Genome {
        Genome::new(size, speed, appetite)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_crossover_is_parental_mean(a in arb_genome(), b in arb_genome()) {
        let child = a.crossover(&b);
        for gene in Gene::ALL {
            let mean = (a.get(gene) + b.get(gene)) / 2.0;
            prop_assert!((child.get(gene) - mean).abs() <= 0.005 + 1e-5,
                "{} = {} but mean is {}", gene, child.get(gene), mean);
        }
        prop_assert!(child.is_valid());
    }

    #[test]
    fn test_mutation_stays_in_range(
        genome in arb_genome(),
        rate in 0.0f32..=100.0,
        strength in 0.0f32..=100.0,
        seed in any::<u64>()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut mutated = genome;
        let hit = mutated.mutate(MutationParams::new(rate, strength), &mut rng);
        prop_assert!(mutated.is_valid());
        if !hit {
            prop_assert_eq!(mutated, genome);
        }
    }

    #[test]
    fn test_wander_is_bounded_by_max_speed(
        genome in arb_genome(),
        vx in -20.0f32..20.0,
        vy in -20.0f32..20.0,
        seed in any::<u64>()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut creature = Creature::with_genome(
            CreatureId(0), Vec2::new(100.0, 100.0), genome, BodyScale::default(), &mut rng,
        );
        creature.velocity = Vec2::new(vx, vy);
        creature.wander(&mut rng);
        prop_assert!(creature.velocity.length() <= creature.max_speed * 1.0001);
    }

    #[test]
    fn test_boundaries_keep_body_inside(
        x in -50.0f32..850.0,
        y in -50.0f32..650.0,
        vx in -20.0f32..20.0,
        vy in -20.0f32..20.0
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut creature = Creature::new(CreatureId(0), Vec2::new(x, y), BodyScale::default(), &mut rng);
        creature.velocity = Vec2::new(vx, vy);
        creature.step();
        creature.check_boundaries(800.0, 600.0);
        prop_assert!(creature.position.x >= creature.radius);
        prop_assert!(creature.position.x <= 800.0 - creature.radius);
        prop_assert!(creature.position.y >= creature.radius);
        prop_assert!(creature.position.y <= 600.0 - creature.radius);
    }
}
