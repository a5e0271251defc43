use crate::{MalformedBatchError, Real, TimeAxis, WaveformError, WaveformResult};
use ndarray::ArrayView1;
use std::fmt::Display;

/// The sample comparison used to locate a crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Samples strictly above the threshold.
    Rising,
    /// Samples strictly below the threshold.
    Falling,
}

impl Direction {
    pub fn test(self, value: Real, threshold: Real) -> bool {
        match self {
            Direction::Rising => value > threshold,
            Direction::Falling => value < threshold,
        }
    }
}

/// Which of the samples satisfying a [Direction] marks the crossing.
/// `FromEnd(0)` is the last such sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occurrence {
    FromStart(usize),
    FromEnd(usize),
}

impl Occurrence {
    pub const FIRST: Occurrence = Occurrence::FromStart(0);
    pub const LAST: Occurrence = Occurrence::FromEnd(0);

    fn select(self, indices: &[usize]) -> Option<usize> {
        match self {
            Occurrence::FromStart(n) => indices.get(n),
            Occurrence::FromEnd(n) => indices.iter().rev().nth(n),
        }
        .copied()
    }
}

/// Negative values count back from the last occurrence, so `-1` is the last.
impl From<isize> for Occurrence {
    fn from(value: isize) -> Self {
        if value >= 0 {
            Occurrence::FromStart(value.unsigned_abs())
        } else {
            Occurrence::FromEnd(value.unsigned_abs() - 1)
        }
    }
}

impl Display for Occurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Occurrence::FromStart(n) => write!(f, "{n}"),
            Occurrence::FromEnd(n) => write!(f, "-{}", n + 1),
        }
    }
}

/// How the crossing time is derived from the two samples either side of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// The straight line through both samples.
    #[default]
    Linear,
    /// The line of the same slope passing through zero volts at the earlier sample,
    /// kept to reproduce results published with the earlier analysis scripts.
    Legacy,
}

/// Describes a single threshold crossing search over one pulse.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdSearch {
    pub threshold: Real,
    pub direction: Direction,
    pub occurrence: Occurrence,
    /// Samples before this index are not searched.
    pub start: usize,
}

impl ThresholdSearch {
    pub fn new(threshold: Real, direction: Direction) -> Self {
        Self {
            threshold,
            direction,
            occurrence: Occurrence::FIRST,
            start: 0,
        }
    }

    pub fn with_occurrence(self, occurrence: Occurrence) -> Self {
        Self { occurrence, ..self }
    }

    pub fn starting_at(self, start: usize) -> Self {
        Self { start, ..self }
    }

    /// Returns the interpolated time, on `axis`, at which `pulse` crosses the threshold.
    pub fn interpolate(
        &self,
        axis: &TimeAxis,
        pulse: ArrayView1<'_, Real>,
        interpolation: Interpolation,
    ) -> WaveformResult<Real> {
        if pulse.len() != axis.len() {
            return Err(MalformedBatchError::PulseLength {
                len: pulse.len(),
                expected: axis.len(),
            }
            .into());
        }
        if self.start >= pulse.len() {
            return Err(MalformedBatchError::SearchStartOutOfRange {
                start: self.start,
                len: pulse.len(),
            }
            .into());
        }

        let indices = pulse
            .iter()
            .enumerate()
            .skip(self.start)
            .filter(|(_, value)| self.direction.test(**value, self.threshold))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let index_high =
            self.occurrence
                .select(&indices)
                .ok_or(WaveformError::NoCrossingFound {
                    threshold: self.threshold,
                    occurrence: self.occurrence,
                    found: indices.len(),
                })?;
        // There is no earlier sample within the searched region to interpolate from.
        if index_high == self.start {
            return Err(WaveformError::CrossingAtBoundary {
                threshold: self.threshold,
                index: index_high,
            });
        }
        let index_low = index_high - 1;

        let (value_low, value_high, time_low) = match (
            pulse.get(index_low),
            pulse.get(index_high),
            axis.get(index_low),
        ) {
            (Some(low), Some(high), Some(time)) => (*low, *high, time),
            _ => {
                return Err(MalformedBatchError::PulseLength {
                    len: pulse.len(),
                    expected: axis.len(),
                }
                .into());
            }
        };

        let dydx = (value_high - value_low) / axis.step();
        if dydx == 0.0 {
            return Err(WaveformError::FlatSegment {
                index_low,
                index_high,
            });
        }
        let intercept = match interpolation {
            Interpolation::Linear => value_low - dydx * time_low,
            Interpolation::Legacy => -dydx * time_low,
        };
        Ok((self.threshold - intercept) / dydx)
    }
}

/// Finds the linearly interpolated time at which `pulse` crosses `threshold`,
/// searching the whole pulse.
pub fn interpolate_threshold(
    axis: &TimeAxis,
    pulse: ArrayView1<'_, Real>,
    threshold: Real,
    direction: Direction,
    occurrence: Occurrence,
) -> WaveformResult<Real> {
    ThresholdSearch::new(threshold, direction)
        .with_occurrence(occurrence)
        .interpolate(axis, pulse, Interpolation::Linear)
}
