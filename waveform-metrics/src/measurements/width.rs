use super::{BatchSettings, HALF_FRACTION, collect_pulses};
use crate::{
    Measurement, Occurrence, Real, ThresholdSearch, TimeAxis, WaveformBatch, WaveformResult,
};
use ndarray::ArrayView1;

/// Time between the first and last crossings of half the peak.
pub fn pulse_width(
    axis: &TimeAxis,
    pulse: ArrayView1<'_, Real>,
    settings: &BatchSettings,
) -> WaveformResult<Real> {
    let search = ThresholdSearch::new(
        settings.polarity.peak(pulse) * HALF_FRACTION,
        settings.polarity.leading_edge(),
    );
    let first = search
        .with_occurrence(Occurrence::FIRST)
        .interpolate(axis, pulse, settings.interpolation)?;
    let last = search
        .with_occurrence(Occurrence::LAST)
        .interpolate(axis, pulse, settings.interpolation)?;
    Ok(last - first)
}

#[tracing::instrument(skip_all, fields(num_pulses = batch.pulse_count(), polarity = %settings.polarity))]
pub fn calc_width(
    axis: &TimeAxis,
    batch: &WaveformBatch,
    settings: &BatchSettings,
) -> WaveformResult<Measurement> {
    batch.check_axis(axis)?;
    Measurement::from_values(collect_pulses(batch, |pulse| {
        pulse_width(axis, pulse, settings)
    })?)
}
