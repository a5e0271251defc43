use crate::{Real, threshold::Occurrence};
use thiserror::Error;

pub type WaveformResult<T> = Result<T, WaveformError>;

#[derive(Debug, Error)]
pub enum WaveformError {
    #[error(
        "No crossing of threshold {threshold} found: occurrence {occurrence} requested, {found} crossing samples found"
    )]
    NoCrossingFound {
        threshold: Real,
        occurrence: Occurrence,
        found: usize,
    },
    #[error("Crossing of threshold {threshold} at sample {index}, the first searched sample")]
    CrossingAtBoundary { threshold: Real, index: usize },
    #[error("Cannot interpolate over flat segment between samples {index_low} and {index_high}")]
    FlatSegment { index_low: usize, index_high: usize },
    #[error("Malformed Batch: {0}")]
    MalformedBatch(#[from] MalformedBatchError),
}

#[derive(Debug, Error, PartialEq)]
pub enum MalformedBatchError {
    #[error("Time axis has {0} samples, at least 2 required")]
    TimeAxisTooShort(usize),
    #[error("Time axis is not strictly increasing at sample {0}")]
    TimeAxisNotIncreasing(usize),
    #[error("Time axis is not uniform at sample {index}: step {step}, expected {expected}")]
    TimeAxisNotUniform {
        index: usize,
        step: Real,
        expected: Real,
    },
    #[error("Pulse {pulse} has {len} samples, expected {expected}")]
    RaggedPulse {
        pulse: usize,
        len: usize,
        expected: usize,
    },
    #[error("Pulse has {len} samples, time axis has {expected}")]
    PulseLength { len: usize, expected: usize },
    #[error("Batch has {pulses} pulses, at least {required} required")]
    TooFewPulses { pulses: usize, required: usize },
    #[error("Batches have different pulse counts: {first} and {second}")]
    PulseCountMismatch { first: usize, second: usize },
    #[error("Search start {start} is beyond the pulse length {len}")]
    SearchStartOutOfRange { start: usize, len: usize },
}
