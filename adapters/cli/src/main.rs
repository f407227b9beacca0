#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that prepares the deck and series plan of a
//! Wisconsin Card Sorting run.

mod export;
mod settings;
mod stimuli;

use std::{fs, io::Write, path::PathBuf};

use anyhow::{Context, Result};
use card_sort_report::write_report;
use card_sort_session::Session;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{export::PlanDocument, settings::Settings};

/// Prepares the deck and series plan of a Wisconsin Card Sorting run.
#[derive(Debug, Parser)]
#[command(name = "card-sort", version, about)]
struct Cli {
    /// TOML file with `[experiment]`, `[stimuli]` and `seed` settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Folder holding the single-figure card images.
    #[arg(long, value_name = "DIR")]
    singles: Option<PathBuf>,

    /// Folder holding the double-figure card images.
    #[arg(long, value_name = "DIR")]
    doubles: Option<PathBuf>,

    /// Seed that makes the run reproducible; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving the plain-text diagnostic report.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// File receiving the JSON plan; standard output when omitted.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Logs every allocated deck.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.singles,
        cli.doubles,
        cli.seed,
    );
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(seed, "preparing experiment");

    let (singles, doubles) =
        stimuli::load_collections(&settings.singles_dir, &settings.doubles_dir, seed)?;
    info!(
        singles = singles.len(),
        doubles = doubles.len(),
        "stimuli loaded"
    );

    let mut events = Vec::new();
    let plan = Session::new(settings.experiment, singles, doubles, seed)
        .and_then(|session| session.run(&mut events))
        .context("failed to prepare the experiment plan")?;
    debug!(events = events.len(), "allocation trace recorded");

    if let Some(directory) = &cli.report_dir {
        let written = write_report(&plan, directory)?;
        info!(
            files = written.len(),
            directory = %directory.display(),
            "diagnostic report written"
        );
    }

    let json = PlanDocument::new(plan).encode()?;
    match &cli.json {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write plan to {}", path.display()))?;
            info!(path = %path.display(), "plan written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write plan to standard output")?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
