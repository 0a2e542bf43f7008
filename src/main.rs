use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use gps_toll::simulation::{SimConfig, SimWorld};

#[derive(Parser)]
#[command(name = "gps_toll")]
#[command(about = "GPS toll zone simulation")]
struct Cli {
    /// TOML file with simulation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of simulation ticks to run (overrides the config file)
    #[arg(long)]
    ticks: Option<u32>,

    /// Distance in km each vehicle covers per tick (overrides the config file)
    #[arg(long)]
    speed: Option<f64>,

    /// Radius every toll zone center is buffered by (overrides the config file)
    #[arg(long)]
    buffer_radius: Option<f64>,

    /// Replace the default vehicles with this many randomly placed ones
    #[arg(long)]
    random_vehicles: Option<u32>,

    /// Seed for the random vehicles
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Print every payment alert after the run
    #[arg(long)]
    alerts: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.horizon_ticks = ticks;
    }
    if let Some(speed) = cli.speed {
        config.speed_km_per_tick = speed;
    }
    if let Some(radius) = cli.buffer_radius {
        config.buffer_radius = radius;
    }

    let mut world = match cli.random_vehicles {
        Some(count) => SimWorld::create_random_world(config, cli.seed, count)?,
        None => SimWorld::create_default_world_with_config(config)?,
    };

    println!("Running toll simulation in headless mode...");
    println!(
        "Ticks: {}, Speed: {} km/tick, Buffer radius: {}",
        world.config.horizon_ticks, world.config.speed_km_per_tick, world.config.buffer_radius
    );
    println!();

    let outcome = world.run();
    info!("Run finished after {} ticks", outcome.ticks_run);

    world.print_summary();
    println!();

    if cli.alerts {
        println!("=== Payment Alerts ===");
        println!("{}", world.alerts().render());
        println!();
    }

    let report = world.report();
    println!("=== Final State ===");
    print!("{}", report.render_table());
    let totals = report.totals();
    println!(
        "Vehicles: {}, Total distance: {:.2} km, Total toll: {:.2}",
        totals.vehicles, totals.distance_traveled, totals.toll_incurred
    );

    Ok(())
}
