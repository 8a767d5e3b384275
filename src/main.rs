use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing::debug;

mod cli;
mod config;
mod emit;
mod error;
mod header;
mod io;
mod mesh;
mod profile;
mod state;

use cli::get_args;
use emit::SolutionEmitter;
use io::open_mesh_writer;
use state::ProfileScanner;

fn main() -> Result<()> {
    let config = get_args();
    init_logging(config.verbose);
    debug!("{:?}", config);

    let input = File::open(&config.profile_path)
        .with_context(|| format!("Failed to open profile file: {:?}", config.profile_path))?;

    // Both outputs exist from the start, even when no profile is selected
    let mesh = open_mesh_writer(config.format, &config.mesh_path)?;
    let index = File::create(&config.index_path)
        .with_context(|| format!("Failed to create index file: {:?}", config.index_path))?;
    let mut stations = match &config.stations_path {
        Some(path) => Some(io::csv::create_csv_writer(path)?),
        None => None,
    };

    let mesh_label = config.mesh_path.display().to_string();
    let mut emitter = SolutionEmitter::new(
        mesh,
        BufWriter::new(index),
        &mesh_label,
        config.base_date,
        config.fudge,
    );

    let pb = if config.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} solutions written ({msg})")?,
    );

    let mut scanner = ProfileScanner::new(
        BufReader::new(input),
        config.range,
        config.units.to_meters(),
        config.flush_last,
    );
    for profile in scanner.by_ref() {
        let profile = profile
            .with_context(|| format!("Failed to read {:?}", config.profile_path))?;
        let record = emitter.emit(&profile)?;
        if let Some(wtr) = stations.as_mut() {
            io::csv::write_profile_rows(wtr, &profile, record.solution)?;
        }
        pb.set_message(record.name);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let written = emitter.solutions_written();
    emitter.finish()?;
    if let Some(mut wtr) = stations {
        wtr.flush().context("Failed to flush station CSV")?;
    }

    println!(
        "Read {} profile records; wrote {} solutions to {} (index {})",
        scanner.profiles_seen(),
        written,
        mesh_label,
        config.index_path.display()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("profile2mesh={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}
