use crate::{Measurement, Polarity, WaveformBatch, WaveformResult};

#[tracing::instrument(skip_all, fields(num_pulses = batch.pulse_count(), polarity = %polarity))]
pub fn calc_peak(batch: &WaveformBatch, polarity: Polarity) -> WaveformResult<Measurement> {
    Measurement::from_values(batch.pulses().map(|pulse| polarity.peak(pulse)).collect())
}
