mod parameters;
mod processing;
mod report;
mod timer;

use anyhow::Result;
use clap::Parser;
use parameters::{MeasurementOptions, Mode};
use pulsecal_common::init_tracer;
use tracing::{info_span, level_filters::LevelFilter};

// cargo run --bin pulse-analyser -- params --data-dir ./results --channels 13,21,72
// cargo run --bin pulse-analyser -- --polarity negative histograms --channels 13 --output-dir ./results/plots

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(flatten)]
    options: MeasurementOptions,

    #[command(subcommand)]
    mode: Mode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _tracer = init_tracer!(LevelFilter::INFO);

    let span = match cli.mode {
        Mode::Params(_) => info_span!("Params"),
        Mode::Histograms(_) => info_span!("Histograms"),
        Mode::Jitter(_) => info_span!("Jitter"),
        Mode::PlotPulses(_) => info_span!("PlotPulses"),
    };
    let _guard = span.enter();

    match &cli.mode {
        Mode::Params(parameters) => processing::params(parameters, &cli.options),
        Mode::Histograms(parameters) => processing::histograms(parameters, &cli.options),
        Mode::Jitter(parameters) => processing::jitter(parameters, &cli.options),
        Mode::PlotPulses(parameters) => processing::plot_pulses(parameters, &cli.options),
    }
}
