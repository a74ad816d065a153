use anyhow::Result;
use clap::Parser;
use log::info;

use city_traffic::simulation::{demo_city, AgentKind, SimConfig, SpawnConfig, World};

#[derive(Parser)]
#[command(name = "city_traffic")]
#[command(about = "Headless city traffic simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "200")]
    ticks: u64,

    /// Seed for agent order, spawn points and destinations
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Ticks between spawn evaluations
    #[arg(long, default_value = "10")]
    spawn_interval: u32,

    /// Maximum number of cars on the map
    #[arg(long, default_value = "10")]
    max_cars: usize,

    /// Maximum number of pedestrians on the map
    #[arg(long, default_value = "10")]
    max_pedestrians: usize,

    /// Cars placed before the first tick
    #[arg(long, default_value = "0")]
    initial_cars: usize,

    /// Pedestrians placed before the first tick
    #[arg(long, default_value = "0")]
    initial_pedestrians: usize,

    /// Log a summary every this many ticks (0 disables)
    #[arg(long, default_value = "50")]
    report_every: u64,

    /// Print the terminal map with each summary
    #[arg(long)]
    map: bool,
}

impl Cli {
    fn sim_config(&self, base_spawn: SpawnConfig) -> SimConfig {
        SimConfig {
            seed: self.seed,
            initial_cars: self.initial_cars,
            initial_pedestrians: self.initial_pedestrians,
            spawn: SpawnConfig {
                interval: self.spawn_interval,
                max_cars: self.max_cars,
                max_pedestrians: self.max_pedestrians,
                ..base_spawn
            },
            ..SimConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    info!("Running city traffic simulation in headless mode...");
    info!("Ticks: {}, Seed: {}", cli.ticks, cli.seed);

    let city = demo_city();
    let config = cli.sim_config(city.spawn_config(SpawnConfig::default()));
    let mut world = World::build(city.width, city.height, &city.entities, config)?;

    if cli.map {
        world.draw_map();
    }

    for _ in 0..cli.ticks {
        world.step()?;

        let tick = world.tick_count();
        if cli.report_every > 0 && tick % cli.report_every == 0 {
            info!(
                "--- After tick {}: {} cars, {} pedestrians on the map ---",
                tick,
                world.live_count(AgentKind::Car),
                world.live_count(AgentKind::Pedestrian)
            );
            if cli.map {
                world.draw_map();
            }
        }
    }

    world.stats().log_summary();
    if cli.map {
        world.print_summary();
    }
    Ok(())
}
