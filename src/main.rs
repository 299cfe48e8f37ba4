use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use darwin_world::config::*;
use darwin_world::driver::{Simulation, SimulationPlugin};
use std::path::PathBuf;
use std::time::Duration;

/// Headless evolution ecology simulator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML settings file; missing keys use the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random source
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = WORLD_WIDTH)]
    width: f32,

    #[arg(long, default_value_t = WORLD_HEIGHT)]
    height: f32,

    /// Override the ticks-per-frame multiplier from the settings
    #[arg(long)]
    speed: Option<f32>,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u32>,

    /// Start with the simulation paused; only useful with a frame budget
    #[arg(long, requires = "frames")]
    paused: bool,
}

/// Frames left before the app exits
#[derive(Resource)]
struct FrameBudget(u32);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(speed) = args.speed {
        config.game_speed = speed;
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
        Duration::from_secs_f64(1.0 / FRAME_RATE),
    )))
    .add_plugins(LogPlugin::default())
    .add_plugins(SimulationPlugin {
        width: args.width,
        height: args.height,
        config: config.sanitized(),
        seed: args.seed,
        start_running: !args.paused,
    });

    if let Some(frames) = args.frames {
        app.insert_resource(FrameBudget(frames))
            .add_systems(Last, stop_when_budget_spent);
    }

    app.run();
    Ok(())
}

/// System to exit once the frame budget is spent, logging the final stats
fn stop_when_budget_spent(
    mut budget: ResMut<FrameBudget>,
    simulation: Res<Simulation>,
    mut exit: EventWriter<AppExit>,
) {
    budget.0 = budget.0.saturating_sub(1);
    if budget.0 == 0 {
        let stats = simulation.world.stats();
        info!(
            "Finished at tick {}: {} creatures, {} births, {} deaths, {} mutations",
            stats.tick,
            stats.population,
            stats.counters.total_births,
            stats.counters.total_deaths,
            stats.counters.total_mutations,
        );
        exit.send(AppExit::Success);
    }
}
