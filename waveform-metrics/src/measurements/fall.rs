use super::{BatchSettings, HIGH_FRACTION, LOW_FRACTION, collect_pulses};
use crate::{
    MalformedBatchError, Measurement, Real, ThresholdSearch, TimeAxis, WaveformBatch,
    WaveformResult,
};
use ndarray::ArrayView1;

/// Time taken by the trailing edge to go from 90% to 10% of the peak.
/// Only samples from the peak onward are searched.
pub fn pulse_fall(
    axis: &TimeAxis,
    pulse: ArrayView1<'_, Real>,
    settings: &BatchSettings,
) -> WaveformResult<Real> {
    let peak = settings.polarity.peak(pulse);
    let peak_index =
        settings
            .polarity
            .peak_index(pulse)
            .ok_or(MalformedBatchError::PulseLength {
                len: pulse.len(),
                expected: axis.len(),
            })?;
    let direction = settings.polarity.trailing_edge();
    let high = ThresholdSearch::new(peak * HIGH_FRACTION, direction)
        .starting_at(peak_index)
        .interpolate(axis, pulse, settings.interpolation)?;
    let low = ThresholdSearch::new(peak * LOW_FRACTION, direction)
        .starting_at(peak_index)
        .interpolate(axis, pulse, settings.interpolation)?;
    Ok(low - high)
}

#[tracing::instrument(skip_all, fields(num_pulses = batch.pulse_count(), polarity = %settings.polarity))]
pub fn calc_fall(
    axis: &TimeAxis,
    batch: &WaveformBatch,
    settings: &BatchSettings,
) -> WaveformResult<Measurement> {
    batch.check_axis(axis)?;
    Measurement::from_values(collect_pulses(batch, |pulse| {
        pulse_fall(axis, pulse, settings)
    })?)
}
