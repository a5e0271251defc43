//! Persistence of captured pulses.
//!
//! A run is stored as a single JSON document holding free-form metadata,
//! including the time axis of each scope channel under `timeform_<channel>`,
//! and the list of pulses captured on each channel.
mod error;
mod file;
mod reader;

pub use error::{WaveformStoreError, WaveformStoreResult};
pub use file::{CREATED_KEY, EXTENSION, WaveformFile, with_extension};
pub use reader::{MAX_RUNS, find_data_filepaths, read_channel, run_number};
