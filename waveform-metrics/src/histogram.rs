use crate::{Measurement, Real};
use serde::Serialize;
use thiserror::Error;

/// Half width of the histogram range, in standard deviations.
const RANGE_IN_STD: Real = 8.0;
/// Bins per standard deviation.
const BINS_PER_STD: Real = 5.0;

#[derive(Debug, Error, PartialEq)]
pub enum HistogramError {
    #[error("Cannot bin {name}: spread {spread} is not positive and finite")]
    DegenerateSpread { name: String, spread: Real },
}

/// A fixed width histogram of a [Measurement]'s values,
/// spanning eight standard deviations either side of the mean.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Histogram {
    pub name: String,
    pub min: Real,
    pub max: Real,
    pub bin_width: Real,
    pub counts: Vec<u64>,
    pub underflow: u64,
    pub overflow: u64,
    pub mean: Real,
    pub std: Real,
}

impl Histogram {
    /// Creates an empty histogram centred on `mean` with bins a fifth of `spread` wide.
    pub fn new(name: &str, mean: Real, spread: Real) -> Result<Self, HistogramError> {
        if !(spread.is_finite() && spread > 0.0 && mean.is_finite()) {
            return Err(HistogramError::DegenerateSpread {
                name: name.to_owned(),
                spread,
            });
        }
        let num_bins = (2.0 * RANGE_IN_STD * BINS_PER_STD) as usize;
        Ok(Self {
            name: name.to_owned(),
            min: mean - RANGE_IN_STD * spread,
            max: mean + RANGE_IN_STD * spread,
            bin_width: spread / BINS_PER_STD,
            counts: vec![0; num_bins],
            underflow: 0,
            overflow: 0,
            mean,
            std: spread,
        })
    }

    /// Bins the values of `measurement`, scaled by `scale`.
    pub fn from_measurement(
        name: &str,
        measurement: &Measurement,
        scale: Real,
    ) -> Result<Self, HistogramError> {
        let mut histogram = Self::new(name, measurement.mean * scale, measurement.std * scale)?;
        for value in &measurement.values {
            histogram.fill(value * scale);
        }
        Ok(histogram)
    }

    /// Bins are closed below and open above.
    pub fn fill(&mut self, value: Real) {
        if value < self.min {
            self.underflow += 1;
            return;
        }
        let bin = ((value - self.min) / self.bin_width).floor() as usize;
        match self.counts.get_mut(bin) {
            Some(count) => *count += 1,
            None => self.overflow += 1,
        }
    }

    pub fn bin_centre(&self, bin: usize) -> Real {
        self.min + (bin as Real + 0.5) * self.bin_width
    }

    /// Number of values within the range.
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or_default()
    }
}
