use crate::{WaveformFile, WaveformStoreError, WaveformStoreResult, file::EXTENSION};
use glob::Pattern;
use pulsecal_common::{Channel, Real, timeform_key};
use pulsecal_waveform_metrics::{BASELINE_SAMPLES, TimeAxis, WaveformBatch};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Run files are numbered from zero, below this bound.
pub const MAX_RUNS: usize = 100;

/// Loads the time axis and pulses recorded on `channel` of the file at `path`.
///
/// The time axis is shifted to start at zero, removing the trigger offset.
/// When `correct_offset` is set each pulse has its baseline, the mean of its
/// first 20 samples, subtracted.
#[tracing::instrument(skip_all, fields(path = %path.display(), channel = channel))]
pub fn read_channel(
    path: &Path,
    channel: Channel,
    correct_offset: bool,
) -> WaveformStoreResult<(TimeAxis, WaveformBatch)> {
    let file = WaveformFile::load(path)?;
    let malformed = |source| WaveformStoreError::MalformedBatch {
        path: file.path().to_owned(),
        source,
    };

    let key = timeform_key(channel);
    let times: Vec<Real> = file.get_meta_data(&key)?.ok_or_else(|| {
        WaveformStoreError::MissingTimeform {
            key: key.clone(),
            path: file.path().to_owned(),
        }
    })?;
    let axis = TimeAxis::new(times).map_err(malformed)?.shifted_to_zero();

    let rows = file
        .get_data(channel)
        .ok_or_else(|| WaveformStoreError::MissingChannel {
            channel,
            path: file.path().to_owned(),
        })?
        .to_vec();
    let batch = WaveformBatch::from_rows(rows, &axis).map_err(malformed)?;
    debug!(
        "Read {} pulses of {} samples",
        batch.pulse_count(),
        batch.sample_count()
    );

    let batch = if correct_offset {
        batch.baseline_corrected(BASELINE_SAMPLES)
    } else {
        batch
    };
    Ok((axis, batch))
}

/// Finds the run files `<basename><i>.json` in `data_dir`, for `i` below [MAX_RUNS],
/// ordered by run number.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display(), basename = basename))]
pub fn find_data_filepaths(data_dir: &Path, basename: &str) -> WaveformStoreResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}*.{EXTENSION}",
        Pattern::escape(&data_dir.to_string_lossy()),
        Pattern::escape(basename)
    );
    let mut runs = Vec::new();
    for path in glob::glob(&pattern)? {
        let path = path?;
        match run_number(&path, basename) {
            Some(run) if run < MAX_RUNS => runs.push((run, path)),
            Some(run) => warn!("Ignoring {}: run {run} out of range", path.display()),
            None => debug!("Ignoring {}", path.display()),
        }
    }
    runs.sort_by_key(|(run, _)| *run);
    Ok(runs.into_iter().map(|(_, path)| path).collect())
}

/// Parses `i` from a file named `<basename><i>.json`.
pub fn run_number(path: &Path, basename: &str) -> Option<usize> {
    let digits = path.file_stem()?.to_str()?.strip_prefix(basename)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
