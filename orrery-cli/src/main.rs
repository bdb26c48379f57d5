mod orrery_app;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use orrery_core::{
    build_bodies, load_ephemeris, validate_target_date, OrreryConfig, Selection, SimulationClock,
};
use orrery_app::OrreryApp;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "orrery.toml";

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Orrery - N-body simulation of the solar system", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./orrery.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Initial-conditions file, overrides the config
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Bodies to simulate: inner, outer or all
    #[arg(short, long, global = true)]
    selection: Option<Selection>,

    /// Log filter, e.g. `debug` or `orrery_core=trace` (default: $RUST_LOG or info)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive viewer
    View,
    /// Integrate to a date without a window and print the body positions
    Jump {
        /// Target date as YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result = load_config(&cli).and_then(|config| match &cli.command {
        Commands::View => cmd_view(config),
        Commands::Jump { date } => cmd_jump(config, date),
    });
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> Result<OrreryConfig> {
    let mut config = match &cli.config {
        Some(path) => OrreryConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => OrreryConfig::load(DEFAULT_CONFIG)?,
        None => OrreryConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.data.ephemeris = data.clone();
    }
    if let Some(selection) = cli.selection {
        config.data.selection = selection;
    }
    Ok(config)
}

fn cmd_view(config: OrreryConfig) -> Result<()> {
    let projection = config.view.projection()?;
    let ephemeris = load_ephemeris(&config.data.ephemeris)?;
    let (bodies, date) = build_bodies(&ephemeris, config.data.selection);
    info!(bodies = bodies.len(), %date, "starting viewer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Orrery")
            .with_inner_size([config.view.width as f32, config.view.height as f32])
            .with_resizable(false),
        ..Default::default()
    };
    eframe::run_native(
        "Orrery",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(OrreryApp::new(config, projection, bodies, date)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))
}

fn cmd_jump(config: OrreryConfig, date: &str) -> Result<()> {
    let target = match date.split('-').collect::<Vec<_>>().as_slice() {
        [year, month, day] => validate_target_date(year, month, day)?,
        _ => bail!("Date must be given as YYYY-MM-DD"),
    };

    let ephemeris = load_ephemeris(&config.data.ephemeris)?;
    let (bodies, start) = build_bodies(&ephemeris, config.data.selection);
    let mut clock = SimulationClock::new(
        bodies,
        start,
        config.clock_params(),
        config.animation.rel_history_length,
    );

    clock.start_fast_forward(target)?;
    let report = clock
        .wait_for_fast_forward()?
        .context("fast-forward did not start")?;
    println!("{} ({} days from {})", report.date, report.steps, start);

    let rows = clock
        .with_state(|state| {
            state
                .bodies
                .iter()
                .map(|b| (b.name.clone(), b.position))
                .collect::<Vec<_>>()
        })
        .context("simulation state is unavailable")?;
    for (name, position) in rows {
        println!(
            "{:<8} x = {:+.6} AU  y = {:+.6} AU  z = {:+.6} AU",
            name, position.x, position.y, position.z
        );
    }

    Ok(())
}
