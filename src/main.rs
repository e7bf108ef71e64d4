//! Wargrid CLI - inspect scenarios, plan moves and forecast attacks.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use wargrid::Point;

/// Wargrid - a deterministic tactical-map core
#[derive(Parser, Debug)]
#[command(name = "wargrid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rule overrides (JSON); defaults apply to missing fields
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every tile a unit can reach this turn
    Reach {
        /// Scenario file (JSON)
        #[arg(required = true)]
        scenario: PathBuf,

        /// Unit position as X,Y
        #[arg(short, long, value_parser = cli::parse_point)]
        unit: Point,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Drag a route through successive destinations
    Route {
        /// Scenario file (JSON)
        #[arg(required = true)]
        scenario: PathBuf,

        /// Unit position as X,Y
        #[arg(short, long, value_parser = cli::parse_point)]
        unit: Point,

        /// Destinations in drag order, each X,Y
        #[arg(short, long, required = true, value_parser = cli::parse_point)]
        to: Vec<Point>,

        /// Carry out the final route
        #[arg(long)]
        commit: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Forecast and resolve an attack
    Forecast {
        /// Scenario file (JSON)
        #[arg(required = true)]
        scenario: PathBuf,

        /// Attacker position as X,Y
        #[arg(short, long, value_parser = cli::parse_point)]
        attacker: Point,

        /// Tile the attacker fires from (default: where it stands)
        #[arg(long, value_parser = cli::parse_point)]
        from: Option<Point>,

        /// Defender position as X,Y
        #[arg(short, long, value_parser = cli::parse_point)]
        target: Point,

        /// Luck seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Load a scenario and check board invariants
    Validate {
        /// Scenario file (JSON)
        #[arg(required = true)]
        scenario: PathBuf,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_env("WARGRID_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let result = cli::load_rules(args.rules.as_deref()).and_then(|rules| match args.command {
        Commands::Reach {
            scenario,
            unit,
            format,
        } => cli::reach::execute(&scenario, unit, format),

        Commands::Route {
            scenario,
            unit,
            to,
            commit,
            format,
        } => cli::route::execute(&scenario, unit, &to, commit, &rules, format),

        Commands::Forecast {
            scenario,
            attacker,
            from,
            target,
            seed,
            format,
        } => cli::forecast::execute(&scenario, attacker, from, target, seed, rules, format),

        Commands::Validate { scenario } => cli::validate::execute(&scenario),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
