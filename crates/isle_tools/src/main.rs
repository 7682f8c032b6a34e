//! Isle development tools.
//!
//! # Usage
//!
//! ```bash
//! # Preview a map with its spawned units
//! cargo run -p isle_tools -- generate --seed 12345
//!
//! # Check a thousand seeds in parallel
//! cargo run -p isle_tools -- sweep --start-seed 0 --count 1000
//!
//! # Order every unit to a tile and step ten seconds
//! cargo run -p isle_tools -- simulate --seed 12345 --ticks 600 --target 40.5,36.5
//!
//! # Check a config file
//! cargo run -p isle_tools -- validate configs/default.ron
//! ```
//!
//! Reports go to stdout, logs to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use isle_core::config::GameConfig;
use isle_core::map_generation::MapConfig;
use isle_core::math::Vec2;
use isle_core::simulation::Simulation;
use isle_tools::ascii::{render_map, MapStats};
use isle_tools::simulate::{parse_point, run_move_order, DEFAULT_TICK_DT};
use isle_tools::sweep::run_sweep;
use isle_tools::validate::validate_config_file;
use isle_tools::{Result, ToolError};

#[derive(Parser)]
#[command(name = "isle-tools")]
#[command(about = "Development tools for the island prototype")]
#[command(version)]
struct Cli {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a map, spawn units and print an ASCII preview
    Generate {
        /// Map seed
        #[arg(long, default_value = "12345")]
        seed: u32,

        /// Map width in tiles
        #[arg(long, default_value = "72")]
        cols: u32,

        /// Map height in tiles
        #[arg(long, default_value = "72")]
        rows: u32,

        /// Units to spawn
        #[arg(long, default_value = "6")]
        units: u32,
    },

    /// Generate many maps in parallel and check generator guarantees
    Sweep {
        /// First seed
        #[arg(long, default_value = "0")]
        start_seed: u32,

        /// Number of seeds
        #[arg(long, default_value = "100")]
        count: u32,

        /// Map width in tiles
        #[arg(long, default_value = "72")]
        cols: u32,

        /// Map height in tiles
        #[arg(long, default_value = "72")]
        rows: u32,
    },

    /// Order every unit to a tile and run headless ticks
    Simulate {
        /// Map seed
        #[arg(long, default_value = "12345")]
        seed: u32,

        /// Ticks to run
        #[arg(long, default_value = "600")]
        ticks: u32,

        /// Seconds per tick
        #[arg(long, default_value_t = DEFAULT_TICK_DT)]
        dt: f64,

        /// Move target in world tiles, as X,Y
        #[arg(long, value_parser = parse_target)]
        target: Vec2,

        /// Base config file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a RON game config
    Validate {
        /// Path to the config file
        path: PathBuf,
    },
}

fn parse_target(text: &str) -> std::result::Result<Vec2, String> {
    parse_point(text).map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn generate(seed: u32, cols: u32, rows: u32, units: u32) -> Result<()> {
    let mut config = GameConfig::default();
    config.map = MapConfig::new(cols, rows).with_seed(seed);
    config.units.count = units;
    let sim = Simulation::new(config)?;

    print!("{}", render_map(sim.grid(), sim.units()));
    println!("{}", MapStats::measure(sim.grid(), sim.units()));
    Ok(())
}

fn sweep(start_seed: u32, count: u32, cols: u32, rows: u32) -> Result<()> {
    let base = MapConfig::new(cols, rows);
    let problems = base.validate();
    if !problems.is_empty() {
        return Err(isle_core::error::GameError::InvalidConfig(problems).into());
    }

    let summary = run_sweep(&base, start_seed, count);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if summary.passed() {
        Ok(())
    } else {
        Err(ToolError::SweepFailed {
            failures: summary.failures,
            maps: summary.maps,
        })
    }
}

fn simulate(
    seed: u32,
    ticks: u32,
    dt: f64,
    target: Vec2,
    config: Option<&Path>,
) -> Result<()> {
    let mut config = match config {
        Some(path) => validate_config_file(path)?,
        None => GameConfig::default(),
    };
    config.map.seed = seed;

    let report = run_move_order(config, target, ticks, dt)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Generate {
            seed,
            cols,
            rows,
            units,
        } => generate(seed, cols, rows, units),
        Commands::Sweep {
            start_seed,
            count,
            cols,
            rows,
        } => sweep(start_seed, count, cols, rows),
        Commands::Simulate {
            seed,
            ticks,
            dt,
            target,
            config,
        } => simulate(seed, ticks, dt, target, config.as_deref()),
        Commands::Validate { path } => {
            tracing::info!("Validating config: {}", path.display());
            validate_config_file(&path).map(|_| tracing::info!("Validation passed"))
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
