use crate::config::*;
use crate::history::TraitHistory;
use crate::world::World;
use bevy::prelude::*;

/// The simulation session, shared with whatever renders or reports on it
#[derive(Resource)]
pub struct Simulation {
    pub world: World,
    pub history: TraitHistory,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self {
            world,
            history: TraitHistory::new(),
        }
    }

    /// Re-initialize the world and forget the recorded history
    pub fn restart(&mut self) {
        self.world.initialize();
        self.history.clear();
    }

    pub fn toggle_running(&mut self) {
        if self.world.is_running() {
            self.world.pause();
        } else {
            self.world.start();
        }
    }
}

/// Timer for the periodic stats log line
#[derive(Resource)]
pub struct StatsReportTimer(pub Timer);

/// Builds an initialized world and drives it once per frame
pub struct SimulationPlugin {
    pub width: f32,
    pub height: f32,
    pub config: SimulationConfig,
    pub seed: u64,
    pub start_running: bool,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            config: SimulationConfig::default(),
            seed: 0,
            start_running: true,
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let mut world = World::new(self.width, self.height, self.config.clone(), self.seed);
        world.initialize();
        if self.start_running {
            world.start();
        }

        app.insert_resource(Simulation::new(world))
            .insert_resource(StatsReportTimer(Timer::from_seconds(
                STATS_REPORT_INTERVAL,
                TimerMode::Repeating,
            )))
            .add_systems(
                Update,
                (advance_world.run_if(simulation_running), report_stats).chain(),
            );
    }
}

/// Run condition: the world is not paused
pub fn simulation_running(simulation: Res<Simulation>) -> bool {
    simulation.world.is_running()
}

/// System to run this frame's ticks and sample the trait averages
pub fn advance_world(mut simulation: ResMut<Simulation>) {
    let Simulation { world, history } = &mut *simulation;
    if world.advance_frame() > 0 {
        history.record(world);
    }
}

/// System to log a stats line at a fixed interval
pub fn report_stats(
    time: Res<Time>,
    mut timer: ResMut<StatsReportTimer>,
    simulation: Res<Simulation>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        let stats = simulation.world.stats();
        info!(
            "tick {} | creatures {} | food {} | births {} | deaths {} | mutations {} | avg size {:.2} speed {:.2} appetite {:.2}",
            stats.tick,
            stats.population,
            stats.food,
            stats.counters.total_births,
            stats.counters.total_deaths,
            stats.counters.total_mutations,
            stats.averages.size,
            stats.averages.speed,
            stats.averages.appetite,
        );
    }
}
