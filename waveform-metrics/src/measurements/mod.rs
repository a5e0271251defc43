//! Per-pulse measurements reduced to a mean and standard deviation over a batch.
//!
//! Thresholds are fractions of each pulse's own signed peak, so negative pulses
//! are measured against negative thresholds with the search direction flipped.
mod area;
mod fall;
mod jitter;
mod peak;
mod rise;
mod width;

use crate::{
    Interpolation, Measurement, Polarity, PolarityHeuristic, Real, TimeAxis, WaveformBatch,
    WaveformResult,
};
use ndarray::ArrayView1;
use pulsecal_common::NANOSECONDS_PER_SECOND;
use serde::Serialize;
use std::fmt;
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

pub use area::{calc_area, pulse_area};
pub use fall::{calc_fall, pulse_fall};
pub use jitter::{calc_jitter, cfd_time};
pub use peak::calc_peak;
pub use rise::{calc_rise, pulse_rise};
pub use width::{calc_width, pulse_width};

pub(crate) const LOW_FRACTION: Real = 0.1;
pub(crate) const HALF_FRACTION: Real = 0.5;
pub(crate) const HIGH_FRACTION: Real = 0.9;

/// Settings shared by every measurement of one batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSettings {
    pub polarity: Polarity,
    pub interpolation: Interpolation,
}

impl BatchSettings {
    pub fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            interpolation: Interpolation::default(),
        }
    }

    /// Classifies the polarity of `batch` with `heuristic`.
    pub fn detect(batch: &WaveformBatch, heuristic: PolarityHeuristic) -> WaveformResult<Self> {
        Ok(Self::new(Polarity::detect(batch, heuristic)?))
    }

    pub fn with_interpolation(self, interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            ..self
        }
    }
}

/// Applies `f` to every pulse, stopping at the first failure.
pub(crate) fn collect_pulses<F>(batch: &WaveformBatch, f: F) -> WaveformResult<Vec<Real>>
where
    F: Fn(ArrayView1<'_, Real>) -> WaveformResult<Real>,
{
    batch
        .pulses()
        .enumerate()
        .map(|(index, pulse)| f(pulse).inspect_err(|e| debug!("Pulse {index}: {e}")))
        .collect()
}

/// The quantities reported for every batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum MeasurementKind {
    Area,
    Rise,
    Fall,
    Width,
    Peak,
}

impl MeasurementKind {
    /// Factor applied to values before they are displayed.
    pub fn display_scale(self) -> Real {
        match self {
            MeasurementKind::Area | MeasurementKind::Peak => 1.0,
            MeasurementKind::Rise | MeasurementKind::Fall | MeasurementKind::Width => {
                NANOSECONDS_PER_SECOND
            }
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MeasurementKind::Area => "Vs",
            MeasurementKind::Rise | MeasurementKind::Fall | MeasurementKind::Width => "ns",
            MeasurementKind::Peak => "V",
        }
    }

    /// Axis label used when the measurement is plotted.
    pub fn label(self) -> String {
        match self {
            MeasurementKind::Area => format!("Integrated area ({})", self.unit()),
            MeasurementKind::Rise => format!("Rise time ({})", self.unit()),
            MeasurementKind::Fall => format!("Fall time ({})", self.unit()),
            MeasurementKind::Width => format!("Pulse width ({})", self.unit()),
            MeasurementKind::Peak => format!("Pulse height ({})", self.unit()),
        }
    }

    /// Runs this measurement over `batch`.
    pub fn measure(
        self,
        axis: &TimeAxis,
        batch: &WaveformBatch,
        settings: &BatchSettings,
    ) -> WaveformResult<Measurement> {
        match self {
            MeasurementKind::Area => calc_area(axis, batch),
            MeasurementKind::Rise => calc_rise(axis, batch, settings),
            MeasurementKind::Fall => calc_fall(axis, batch, settings),
            MeasurementKind::Width => calc_width(axis, batch, settings),
            MeasurementKind::Peak => calc_peak(batch, settings.polarity),
        }
    }
}

/// Every standard measurement of one batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub polarity: Polarity,
    pub area: Measurement,
    pub rise: Measurement,
    pub fall: Measurement,
    pub width: Measurement,
    pub peak: Measurement,
}

impl ParameterSummary {
    pub fn get(&self, kind: MeasurementKind) -> &Measurement {
        match kind {
            MeasurementKind::Area => &self.area,
            MeasurementKind::Rise => &self.rise,
            MeasurementKind::Fall => &self.fall,
            MeasurementKind::Width => &self.width,
            MeasurementKind::Peak => &self.peak,
        }
    }
}

impl fmt::Display for ParameterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = |m: &Measurement| (m.mean * NANOSECONDS_PER_SECOND, m.std * NANOSECONDS_PER_SECOND);
        let (fall, fall_std) = ns(&self.fall);
        let (rise, rise_std) = ns(&self.rise);
        let (width, width_std) = ns(&self.width);
        writeln!(
            f,
            "Area \t\t= {:.2e} +/- {:.2e} Vs",
            self.area.mean, self.area.std
        )?;
        writeln!(f, "Fall time \t= {fall:.2} +/- {fall_std:.2} ns")?;
        writeln!(f, "Rise time \t= {rise:.2} +/- {rise_std:.2} ns")?;
        writeln!(f, "Width \t\t= {width:.2} +/- {width_std:.2} ns")?;
        write!(
            f,
            "Peak \t\t= {:.2} +/- {:.2} V",
            self.peak.mean, self.peak.std
        )
    }
}

/// Computes area, rise, fall, width and peak of `batch` in one pass over the settings.
#[tracing::instrument(skip_all, fields(num_pulses = batch.pulse_count(), polarity = %settings.polarity))]
pub fn calc_params(
    axis: &TimeAxis,
    batch: &WaveformBatch,
    settings: &BatchSettings,
) -> WaveformResult<ParameterSummary> {
    Ok(ParameterSummary {
        polarity: settings.polarity,
        area: calc_area(axis, batch)?,
        rise: calc_rise(axis, batch, settings)?,
        fall: calc_fall(axis, batch, settings)?,
        width: calc_width(axis, batch, settings)?,
        peak: calc_peak(batch, settings.polarity)?,
    })
}
