use glob::{GlobError, PatternError};
use pulsecal_common::Channel;
use pulsecal_waveform_metrics::MalformedBatchError;
use std::path::PathBuf;
use thiserror::Error;

pub type WaveformStoreResult<T> = Result<T, WaveformStoreError>;

#[derive(Debug, Error)]
pub enum WaveformStoreError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Glob Pattern Error: {0}")]
    GlobPattern(#[from] PatternError),
    #[error("Glob Error: {0}")]
    Glob(#[from] GlobError),
    #[error("Time axis {key} missing from {path}")]
    MissingTimeform { key: String, path: PathBuf },
    #[error("Channel {channel} missing from {path}")]
    MissingChannel { channel: Channel, path: PathBuf },
    #[error("Malformed waveforms in {path}: {source}")]
    MalformedBatch {
        path: PathBuf,
        source: MalformedBatchError,
    },
}
