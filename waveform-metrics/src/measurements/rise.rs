use super::{BatchSettings, HIGH_FRACTION, LOW_FRACTION, collect_pulses};
use crate::{Measurement, Real, ThresholdSearch, TimeAxis, WaveformBatch, WaveformResult};
use ndarray::ArrayView1;

/// Time taken by the leading edge to go from 10% to 90% of the peak.
pub fn pulse_rise(
    axis: &TimeAxis,
    pulse: ArrayView1<'_, Real>,
    settings: &BatchSettings,
) -> WaveformResult<Real> {
    let peak = settings.polarity.peak(pulse);
    let direction = settings.polarity.leading_edge();
    let low = ThresholdSearch::new(peak * LOW_FRACTION, direction).interpolate(
        axis,
        pulse,
        settings.interpolation,
    )?;
    let high = ThresholdSearch::new(peak * HIGH_FRACTION, direction).interpolate(
        axis,
        pulse,
        settings.interpolation,
    )?;
    Ok(high - low)
}

#[tracing::instrument(skip_all, fields(num_pulses = batch.pulse_count(), polarity = %settings.polarity))]
pub fn calc_rise(
    axis: &TimeAxis,
    batch: &WaveformBatch,
    settings: &BatchSettings,
) -> WaveformResult<Measurement> {
    batch.check_axis(axis)?;
    Measurement::from_values(collect_pulses(batch, |pulse| {
        pulse_rise(axis, pulse, settings)
    })?)
}
