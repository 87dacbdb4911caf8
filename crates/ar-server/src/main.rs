//! Server binary for the AutoRealm simulation core.

mod commands;
mod content;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "autorealm",
    about = "AutoRealm: authoritative simulation server for a persistent RPG world",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tick loop and periodic persistence until interrupted
    Serve {
        /// Directory holding items.json, monsters.json, maps.json, missions.json
        #[arg(short, long, default_value = "content")]
        content_dir: PathBuf,

        /// Directory the player snapshot is written to
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// RNG seed for combat, loot and AI rolls
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Milliseconds between ticks
        #[arg(long, default_value = "50")]
        tick_ms: u64,

        /// Seconds between player snapshots
        #[arg(long, default_value = "10")]
        save_interval_secs: u64,

        /// Map new players start on
        #[arg(long, default_value = "map_castle_1")]
        start_map: String,

        /// Stop on its own after this many seconds
        #[arg(long)]
        run_for_secs: Option<f64>,
    },

    /// Load the content tables and report dangling references
    Check {
        /// Directory holding the content tables
        #[arg(short, long, default_value = "content")]
        content_dir: PathBuf,

        /// Fail when any reference is dangling
        #[arg(long)]
        strict: bool,
    },

    /// List the players in the saved snapshot
    Players {
        /// Directory the player snapshot lives in
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            content_dir,
            data_dir,
            seed,
            tick_ms,
            save_interval_secs,
            start_map,
            run_for_secs,
        } => commands::serve::run(commands::serve::ServeOptions {
            content_dir,
            data_dir,
            seed,
            tick: Duration::from_millis(tick_ms),
            save_interval: Duration::from_secs(save_interval_secs),
            start_map,
            run_for: run_for_secs.map(Duration::from_secs_f64),
        }),
        Commands::Check {
            content_dir,
            strict,
        } => commands::check::run(&content_dir, strict),
        Commands::Players { data_dir } => commands::players::run(&data_dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
