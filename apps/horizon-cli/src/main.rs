use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use horizon_common::{Observer, ObserverId};
use horizon_kernel::{ConsoleVariables, LodHintRecorder, Scene};
use horizon_stream::session::{ONLY_UPDATE_CLOSE_OBJECTS, REPLACE_DISCARDED_WITH_REFERENCE};
use horizon_stream::{
    RegionCoord, SessionHooks, Spiral, StreamConfig, StreamingController, TickHistory,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "horizon-cli", about = "CLI tool for horizon streaming")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Walk an observer through the world and report streaming activity
    Simulate {
        /// YAML stream config (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "300")]
        ticks: u64,
        /// Observer movement per tick as "X,Z" in world units
        #[arg(long, default_value = "0,0", value_parser = parse_velocity)]
        velocity: Vec2,
        /// Override the placement seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the spiral visit order around a region
    Spiral {
        /// Ring limit (rings 1..rings are walked after the center)
        #[arg(short, long, default_value = "3")]
        rings: i32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: i32,
    },
}

/// Outcome of a simulated walk.
#[derive(Debug, Serialize)]
struct SimulationSummary {
    ticks: u64,
    final_region: Option<RegionCoord>,
    live_regions: usize,
    live_objects: usize,
    regions_populated: usize,
    regions_evicted: usize,
    objects_spawned: u64,
    objects_destroyed: usize,
    tick_avg_us: u128,
    tick_max_us: u128,
    toggles_restored: bool,
}

fn parse_velocity(s: &str) -> Result<Vec2, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z, got {s:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad X: {e}"))?;
    let z: f32 = z.trim().parse().map_err(|e| format!("bad Z: {e}"))?;
    Ok(Vec2::new(x, z))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("horizon-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", horizon_stream::crate_info());
            let config = StreamConfig::default();
            println!(
                "defaults: retention_radius={}, region_size=({}, {}), occluders_per_region={}, seed={}",
                config.retention_radius,
                config.region_size.x,
                config.region_size.y,
                config.occluders_per_region,
                config.seed
            );
        }
        Commands::Simulate {
            config,
            ticks,
            velocity,
            seed,
            json,
        } => {
            let mut config = match config {
                Some(path) => StreamConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => StreamConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            let summary = simulate(config, ticks, velocity)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Simulated {} ticks, final region {:?}",
                    summary.ticks, summary.final_region
                );
                println!(
                    "Live: {} regions, {} objects",
                    summary.live_regions, summary.live_objects
                );
                println!(
                    "Totals: {} regions populated, {} evicted, {} objects spawned, {} destroyed",
                    summary.regions_populated,
                    summary.regions_evicted,
                    summary.objects_spawned,
                    summary.objects_destroyed
                );
                println!(
                    "Tick time: avg {}us, max {}us",
                    summary.tick_avg_us, summary.tick_max_us
                );
                println!(
                    "Session toggles restored: {}",
                    if summary.toggles_restored { "OK" } else { "MISMATCH" }
                );
            }
        }
        Commands::Spiral { rings, x, z } => {
            let center = RegionCoord::new(x, z);
            for (i, (coord, ring)) in Spiral::new(center, rings).enumerate() {
                println!("{i:>4}  ring {ring:>2}  ({:>4}, {:>4})", coord.x, coord.z);
            }
        }
    }

    Ok(())
}

fn simulate(mut config: StreamConfig, ticks: u64, velocity: Vec2) -> anyhow::Result<SimulationSummary> {
    let ground = config.ground_template.get_or_insert_with(|| "ground".into()).clone();
    let occluder = config
        .occluder_template
        .get_or_insert_with(|| "occluder".into())
        .clone();

    let scene = Scene::new()
        .with_template(ground, Vec3::ONE)
        .with_template(occluder, Vec3::splat(100.0));
    let vars = ConsoleVariables::new()
        .with(REPLACE_DISCARDED_WITH_REFERENCE, false)
        .with(ONLY_UPDATE_CLOSE_OBJECTS, false);
    let hooks = SessionHooks::default()
        .with_lod(LodHintRecorder::new())
        .with_settings(vars.clone());

    let mut controller = StreamingController::new(config, scene, hooks)?;
    let mut history = TickHistory::new(usize::try_from(ticks).unwrap_or(usize::MAX));

    for t in 0..ticks {
        let position = Vec3::new(velocity.x * t as f32, 0.0, velocity.y * t as f32);
        let stats = controller.tick(Some(&Observer::new(ObserverId(0), position)));
        history.record(stats);
    }

    let summary = SimulationSummary {
        ticks,
        final_region: controller.current_region(),
        live_regions: controller.grid().len(),
        live_objects: controller.backend().object_count(),
        regions_populated: history.regions_populated(),
        regions_evicted: history.regions_evicted(),
        objects_spawned: controller.backend().spawned_total(),
        objects_destroyed: controller.backend().destroyed_in_log(),
        tick_avg_us: history.average_time().as_micros(),
        tick_max_us: history.max_time().as_micros(),
        toggles_restored: false,
    };

    drop(controller);
    let toggles_restored = vars.get(REPLACE_DISCARDED_WITH_REFERENCE) == Some(false)
        && vars.get(ONLY_UPDATE_CLOSE_OBJECTS) == Some(false);
    tracing::debug!(toggles_restored, "session torn down");

    Ok(SimulationSummary {
        toggles_restored,
        ..summary
    })
}
