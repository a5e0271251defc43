use anyhow::{Error, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pulsecal_common::{Channel, LedChannel};
use pulsecal_waveform_metrics::{
    BatchSettings, Interpolation, Polarity, PolarityHeuristic, WaveformBatch, WaveformResult,
};
use std::{path::PathBuf, str::FromStr};

/// A comma separated list of LED channels, e.g. `13,21,72`.
#[derive(Default, Debug, Clone)]
pub(crate) struct ChannelList(pub(crate) Vec<LedChannel>);

impl FromStr for ChannelList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(LedChannel::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if channels.is_empty() {
            Err(anyhow!("Expected at least one channel, got '{s}'"))
        } else {
            Ok(ChannelList(channels))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum PolarityChoice {
    /// Detect the polarity of each batch
    #[default]
    Auto,
    Positive,
    Negative,
}

/// Options controlling how every batch is measured.
#[derive(Clone, Debug, Args)]
pub(crate) struct MeasurementOptions {
    /// Pulse polarity, or `auto` to classify each batch
    #[clap(long, value_enum, default_value_t = PolarityChoice::Auto, global = true)]
    pub(crate) polarity: PolarityChoice,

    /// Pulse inspected when classifying the polarity of a batch
    #[clap(long, default_value = "1", global = true)]
    pub(crate) polarity_row: usize,

    /// Classify polarity by majority vote over this many pulses, instead of a single pulse
    #[clap(long, global = true)]
    pub(crate) majority_vote: Option<usize>,

    /// Reproduce the crossing times of the earlier analysis scripts
    #[clap(long, global = true)]
    pub(crate) legacy_interpolation: bool,

    /// Do not subtract each pulse's baseline when loading
    #[clap(long, global = true)]
    pub(crate) raw: bool,
}

impl MeasurementOptions {
    pub(crate) fn heuristic(&self) -> PolarityHeuristic {
        match self.majority_vote {
            Some(sample_size) => PolarityHeuristic::MajorityVote { sample_size },
            None => PolarityHeuristic::RepresentativeRow {
                row: self.polarity_row,
            },
        }
    }

    pub(crate) fn interpolation(&self) -> Interpolation {
        if self.legacy_interpolation {
            Interpolation::Legacy
        } else {
            Interpolation::Linear
        }
    }

    pub(crate) fn correct_offset(&self) -> bool {
        !self.raw
    }

    /// Settings used to measure `batch`.
    pub(crate) fn settings(&self, batch: &WaveformBatch) -> WaveformResult<BatchSettings> {
        let settings = match self.polarity {
            PolarityChoice::Auto => BatchSettings::detect(batch, self.heuristic())?,
            PolarityChoice::Positive => BatchSettings::new(Polarity::Positive),
            PolarityChoice::Negative => BatchSettings::new(Polarity::Negative),
        };
        Ok(settings.with_interpolation(self.interpolation()))
    }
}

/// Location of the runs recorded for each LED channel,
/// `<data-dir>/channel_<c>/<basename><i>.json`.
#[derive(Clone, Debug, Args)]
pub(crate) struct RunSelection {
    /// Directory holding one `channel_<c>` directory per LED channel
    #[clap(long, default_value = "./results")]
    pub(crate) data_dir: PathBuf,

    /// LED channels to analyse, comma separated
    #[clap(long)]
    pub(crate) channels: ChannelList,

    /// Prefix of the run files
    #[clap(long, default_value = "run_")]
    pub(crate) basename: String,

    /// Scope channel the pulses were recorded on
    #[clap(long, default_value = "1")]
    pub(crate) scope_channel: Channel,
}

impl RunSelection {
    pub(crate) fn channel_dir(&self, channel: LedChannel) -> PathBuf {
        self.data_dir.join(format!("channel_{channel}"))
    }
}

/// Size of the drawn plots in pixels.
#[derive(Clone, Debug, Args)]
pub(crate) struct PlotSize {
    #[clap(long, default_value = "800")]
    pub(crate) width: u32,

    #[clap(long, default_value = "600")]
    pub(crate) height: u32,
}

impl PlotSize {
    pub(crate) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct ParamsParameters {
    #[clap(flatten)]
    pub(crate) runs: RunSelection,
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct HistogramParameters {
    #[clap(flatten)]
    pub(crate) runs: RunSelection,

    /// Directory the plots and results are written to
    #[clap(long, default_value = "./results/plots")]
    pub(crate) output_dir: PathBuf,

    /// Also write the per-pulse values of each measurement as csv
    #[clap(long)]
    pub(crate) save_values: bool,

    #[clap(flatten)]
    pub(crate) size: PlotSize,
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct JitterParameters {
    #[clap(long)]
    pub(crate) file_a: PathBuf,

    #[clap(long, default_value = "1")]
    pub(crate) channel_a: Channel,

    #[clap(long)]
    pub(crate) file_b: PathBuf,

    #[clap(long, default_value = "2")]
    pub(crate) channel_b: Channel,
}

#[derive(Clone, Debug, Parser)]
pub(crate) struct PlotPulsesParameters {
    #[clap(long)]
    pub(crate) file: PathBuf,

    #[clap(long, default_value = "1")]
    pub(crate) channel: Channel,

    /// Number of pulses to draw
    #[clap(long, default_value = "10")]
    pub(crate) count: usize,

    #[clap(long, default_value = "pulses.svg")]
    pub(crate) output: PathBuf,

    /// Also write the drawn samples as `time,voltage` lines
    #[clap(long)]
    pub(crate) save_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) size: PlotSize,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Mode {
    #[clap(about = "Prints the standard parameters of every run of each channel.")]
    Params(ParamsParameters),
    #[clap(about = "Histograms the standard parameters per run and per channel.")]
    Histograms(HistogramParameters),
    #[clap(about = "Measures the timing jitter between two recorded channels.")]
    Jitter(JitterParameters),
    #[clap(about = "Draws the first pulses of a run.")]
    PlotPulses(PlotPulsesParameters),
}
