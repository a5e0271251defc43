mod acquisition;
mod config;
mod pulse;

use anyhow::{Context, Result};
use clap::Parser;
use config::SimulationConfig;
use pulsecal_common::init_tracer;
use rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Path to the JSON file describing the run
    #[clap(long)]
    config: PathBuf,

    /// File to write the run to, the .json extension is added if absent
    #[clap(long)]
    output: PathBuf,

    /// Seed for the random number generator, if absent the run is not reproducible
    #[clap(long, env = "PULSE_SIMULATOR_SEED")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _tracer = init_tracer!(LevelFilter::INFO);

    let config = SimulationConfig::load(&cli.config)
        .with_context(|| format!("Cannot load config {}", cli.config.display()))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!(
        "Acquiring {} pulses on channel {}",
        config.pulse_count, config.scope_channel
    );
    let (mut file, statistics) = acquisition::acquire(&config, &cli.output, &mut rng)?;
    acquisition::write_metadata(&mut file, &config, &statistics)?;
    file.save()?;

    info!(
        "{} pulses saved to {} ({} lost)",
        statistics.stored,
        file.path().display(),
        statistics.lost
    );
    Ok(())
}
