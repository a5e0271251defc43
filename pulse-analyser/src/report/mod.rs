//! Writing of text summaries, histograms, plots and results files.
mod save_to_file;
mod svg;

use anyhow::Result;
use pulsecal_common::{LedChannel, Real};
use pulsecal_waveform_metrics::{
    Histogram, Measurement, MeasurementKind, Polarity, TimeAxis, WaveformBatch,
};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::{File, create_dir_all},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub(crate) use save_to_file::SaveToFileFilter;

const DEFAULT_SIZE: (u32, u32) = (800, 600);
pub(crate) const RESULTS_FILE: &str = "results.json";
pub(crate) const EXAMPLE_PULSES_FILE: &str = "Pulses.svg";
/// Number of pulses drawn alongside the histograms.
pub(crate) const EXAMPLE_PULSES: usize = 10;

/// Where and how reports are drawn. Every render call writes and closes its own file.
#[derive(Clone, Debug)]
pub(crate) struct ReportContext {
    output_dir: PathBuf,
    size: (u32, u32),
}

impl ReportContext {
    pub(crate) fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_owned(),
            size: DEFAULT_SIZE,
        }
    }

    pub(crate) fn with_size(self, size: (u32, u32)) -> Self {
        Self { size, ..self }
    }

    /// `<output>/channel_<c>/`, holding the results of all runs merged.
    pub(crate) fn channel_dir(&self, channel: LedChannel) -> Result<PathBuf> {
        let dir = self.output_dir.join(format!("channel_{channel}"));
        create_dir_all(&dir)?;
        Ok(dir)
    }

    /// `<output>/channel_<c>/run_<n>/`.
    pub(crate) fn run_dir(&self, channel: LedChannel, run: usize) -> Result<PathBuf> {
        let dir = self.channel_dir(channel)?.join(format!("run_{run}"));
        create_dir_all(&dir)?;
        Ok(dir)
    }

    pub(crate) fn save_histogram(
        &self,
        histogram: &Histogram,
        kind: MeasurementKind,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(format!("{kind}.svg"));
        svg::save_histogram(histogram, &kind.label(), &path, self.size)?;
        debug!("Saved {}", path.display());
        Ok(path)
    }

    pub(crate) fn save_pulses(
        &self,
        axis: &TimeAxis,
        batch: &WaveformBatch,
        count: usize,
        title: &str,
        path: &Path,
    ) -> Result<()> {
        svg::save_pulses(axis, batch, count, title, path, self.size)
    }

    /// Draws the first few pulses of `batch` into `dir`.
    pub(crate) fn save_example_pulses(
        &self,
        axis: &TimeAxis,
        batch: &WaveformBatch,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(EXAMPLE_PULSES_FILE);
        let count = EXAMPLE_PULSES.min(batch.pulse_count());
        self.save_pulses(axis, batch, count, "Example pulses", &path)?;
        Ok(path)
    }
}

/// Mean and spread of one measurement, in display units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct MeasurementReport {
    pub(crate) mean: Real,
    pub(crate) std: Real,
    pub(crate) unit: &'static str,
}

impl MeasurementReport {
    pub(crate) fn new(kind: MeasurementKind, measurement: &Measurement) -> Self {
        let scale = kind.display_scale();
        Self {
            mean: measurement.mean * scale,
            std: measurement.std * scale,
            unit: kind.unit(),
        }
    }
}

/// Contents of a `results.json` file.
#[derive(Clone, Debug, Default, Serialize)]
pub(crate) struct RunReport {
    pub(crate) sources: Vec<PathBuf>,
    pub(crate) polarity: Option<Polarity>,
    pub(crate) pulse_count: usize,
    pub(crate) measurements: BTreeMap<String, MeasurementReport>,
    pub(crate) histograms: Vec<Histogram>,
    /// Measurements which could not be made, with the reason.
    pub(crate) failures: BTreeMap<String, String>,
}

impl RunReport {
    /// Records `measurement`, histogramming it and drawing the histogram into `dir`.
    pub(crate) fn add(
        &mut self,
        context: &ReportContext,
        kind: MeasurementKind,
        measurement: &Measurement,
        dir: &Path,
        save_values: bool,
    ) -> Result<()> {
        self.measurements
            .insert(kind.to_string(), MeasurementReport::new(kind, measurement));

        if save_values {
            let path = dir.join(format!("{kind}.csv"));
            let scale = kind.display_scale();
            measurement
                .values
                .iter()
                .enumerate()
                .map(|(pulse, value)| (pulse, value * scale))
                .save_to_file(&path)?;
        }

        match Histogram::from_measurement(&kind.to_string(), measurement, kind.display_scale()) {
            Ok(histogram) => {
                context.save_histogram(&histogram, kind, dir)?;
                self.histograms.push(histogram);
            }
            Err(e) => {
                warn!("{e}");
                self.failures.insert(kind.to_string(), e.to_string());
            }
        }
        Ok(())
    }

    pub(crate) fn add_failure(&mut self, kind: MeasurementKind, reason: String) {
        self.failures.insert(kind.to_string(), reason);
    }

    pub(crate) fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(RESULTS_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pulse-analyser-report-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn directories() {
        let context = ReportContext::new(&temp_dir("directories"));
        let run = context.run_dir(13, 2).unwrap();
        assert!(run.is_dir());
        assert!(run.ends_with("channel_13/run_2"));
        assert!(context.channel_dir(13).unwrap().ends_with("channel_13"));
    }

    #[test]
    fn measurement_units() {
        let measurement = Measurement::from_values(vec![1e-9, 3e-9]).unwrap();
        let report = MeasurementReport::new(MeasurementKind::Rise, &measurement);
        assert_approx_eq!(report.mean, 2.0);
        assert_approx_eq!(report.std, 1.0);
        assert_eq!(report.unit, "ns");
    }

    #[test]
    fn run_report() {
        let context = ReportContext::new(&temp_dir("run_report")).with_size((320, 240));
        let dir = context.run_dir(21, 0).unwrap();
        let mut report = RunReport::default();

        let spread = Measurement::from_values(vec![0.9, 1.0, 1.1, 1.0]).unwrap();
        report
            .add(&context, MeasurementKind::Peak, &spread, &dir, true)
            .unwrap();
        let constant = Measurement::from_values(vec![2e-9, 2e-9]).unwrap();
        report
            .add(&context, MeasurementKind::Width, &constant, &dir, false)
            .unwrap();

        assert!(dir.join("Peak.svg").is_file());
        assert!(dir.join("Peak.csv").is_file());
        assert!(!dir.join("Width.svg").exists());
        assert_eq!(report.histograms.len(), 1);
        assert_eq!(report.measurements.len(), 2);
        assert!(report.failures.contains_key("Width"));

        let path = report.save(&dir).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["histograms"][0]["name"], "Peak");
        assert_eq!(json["measurements"]["Width"]["unit"], "ns");
    }
}
