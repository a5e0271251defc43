use crate::{Real, TimeAxis, WaveformBatch};

pub(crate) const SAMPLE_TIME: Real = 0.5e-9;
pub(crate) const SAMPLES: usize = 200;

/// A piecewise linear pulse whose corners all lie on samples:
/// flat at zero until `rise_start`, ramping to `amplitude` at `rise_end`,
/// flat until `fall_start`, then ramping back to zero at `fall_end`.
#[derive(Clone, Copy)]
pub(crate) struct Trapezoid {
    pub(crate) amplitude: Real,
    pub(crate) rise_start: usize,
    pub(crate) rise_end: usize,
    pub(crate) fall_start: usize,
    pub(crate) fall_end: usize,
}

impl Default for Trapezoid {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            rise_start: 40,
            rise_end: 60,
            fall_start: 80,
            fall_end: 120,
        }
    }
}

impl Trapezoid {
    pub(crate) fn negative() -> Self {
        Self {
            amplitude: -1.0,
            ..Default::default()
        }
    }

    pub(crate) fn delayed(self, samples: usize) -> Self {
        Self {
            rise_start: self.rise_start + samples,
            rise_end: self.rise_end + samples,
            fall_start: self.fall_start + samples,
            fall_end: self.fall_end + samples,
            ..self
        }
    }

    pub(crate) fn value(&self, index: usize) -> Real {
        let i = index as Real;
        if index <= self.rise_start || index >= self.fall_end {
            0.0
        } else if index < self.rise_end {
            self.amplitude * (i - self.rise_start as Real)
                / (self.rise_end - self.rise_start) as Real
        } else if index <= self.fall_start {
            self.amplitude
        } else {
            self.amplitude * (self.fall_end as Real - i) / (self.fall_end - self.fall_start) as Real
        }
    }

    pub(crate) fn samples(&self) -> Vec<Real> {
        (0..SAMPLES).map(|i| self.value(i)).collect()
    }

    /// 10% to 90% of the leading ramp.
    pub(crate) fn rise_time(&self) -> Real {
        0.8 * (self.rise_end - self.rise_start) as Real * SAMPLE_TIME
    }

    /// 90% to 10% of the trailing ramp.
    pub(crate) fn fall_time(&self) -> Real {
        0.8 * (self.fall_end - self.fall_start) as Real * SAMPLE_TIME
    }

    /// Full width at half maximum.
    pub(crate) fn width(&self) -> Real {
        let half_rise = 0.5 * (self.rise_start + self.rise_end) as Real;
        let half_fall = 0.5 * (self.fall_start + self.fall_end) as Real;
        (half_fall - half_rise) * SAMPLE_TIME
    }

    pub(crate) fn area(&self) -> Real {
        let base = (self.fall_end - self.rise_start) as Real;
        let top = (self.fall_start - self.rise_end) as Real;
        0.5 * (base + top) * self.amplitude * SAMPLE_TIME
    }
}

pub(crate) fn axis() -> TimeAxis {
    TimeAxis::from_step(SAMPLES, SAMPLE_TIME).unwrap()
}

pub(crate) fn batch_of(pulses: &[Trapezoid]) -> WaveformBatch {
    WaveformBatch::from_rows(pulses.iter().map(Trapezoid::samples).collect(), &axis()).unwrap()
}

pub(crate) fn identical_batch(pulse: Trapezoid, count: usize) -> WaveformBatch {
    batch_of(&vec![pulse; count])
}
