use crate::{
    parameters::{
        HistogramParameters, JitterParameters, MeasurementOptions, ParamsParameters,
        PlotPulsesParameters,
    },
    report::{ReportContext, RunReport, SaveToFileFilter},
    timer::{Timer, TimerSuite},
};
use anyhow::{Result, anyhow};
use pulsecal_common::{Channel, LedChannel, NANOSECONDS_PER_SECOND};
use pulsecal_waveform_metrics::{
    MeasurementKind, ParameterSummary, TimeAxis, WaveformBatch, calc_jitter, calc_params,
};
use pulsecal_waveform_store::{find_data_filepaths, read_channel, run_number};
use rayon::prelude::*;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use strum::IntoEnumIterator;
use tracing::{error, info, warn};

/// A loaded run file.
struct Run {
    path: PathBuf,
    number: usize,
    axis: TimeAxis,
    batch: WaveformBatch,
}

fn load_run(
    path: &Path,
    number: usize,
    scope_channel: Channel,
    options: &MeasurementOptions,
) -> Result<Run> {
    let (axis, batch) = read_channel(path, scope_channel, options.correct_offset())?;
    Ok(Run {
        path: path.to_owned(),
        number,
        axis,
        batch,
    })
}

/// Finds the runs of `channel`, numbered by the index in their file name.
fn find_runs(dir: &Path, basename: &str) -> Result<Vec<(PathBuf, usize)>> {
    let paths = find_data_filepaths(dir, basename)?;
    if paths.is_empty() {
        warn!("No runs named {basename}* found in {}", dir.display());
    }
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            let number = run_number(&path, basename).unwrap_or(index);
            (path, number)
        })
        .collect())
}

fn measure_run(run: &Run, options: &MeasurementOptions) -> Result<(ParameterSummary, Duration)> {
    let mut timer = Timer::default();
    timer.record();
    let settings = options.settings(&run.batch)?;
    let summary = calc_params(&run.axis, &run.batch, &settings)?;
    timer.end();
    Ok((summary, timer.duration()))
}

/// Prints the parameter summary of every run of each channel, with a timing line per channel.
#[tracing::instrument(skip_all)]
pub(crate) fn params(parameters: &ParamsParameters, options: &MeasurementOptions) -> Result<()> {
    let runs = &parameters.runs;
    for &channel in &runs.channels.0 {
        let dir = runs.channel_dir(channel);
        let mut timer = TimerSuite::new();

        let results = find_runs(&dir, &runs.basename)?
            .par_iter()
            .map(|(path, number)| -> Result<_> {
                let run = load_run(path, *number, runs.scope_channel, options)?;
                let (summary, duration) = measure_run(&run, options)?;
                Ok((run, summary, duration))
            })
            .collect::<Vec<Result<_>>>();

        for result in results {
            match result {
                Ok((run, summary, duration)) => {
                    println!("\n{}:\n--------\n{summary}", run.path.display());
                    timer.next_file(run.batch.pulse_count(), duration);
                }
                Err(e) => error!("Channel {channel}: {e:#}"),
            }
        }
        timer.finish();
        println!("{}", timer.summary(&dir.display().to_string()));
    }
    Ok(())
}

/// Measures `batch`, writing histograms and `results.json` into `dir`.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), num_pulses = batch.pulse_count()))]
fn report_batch(
    context: &ReportContext,
    axis: &TimeAxis,
    batch: &WaveformBatch,
    sources: Vec<PathBuf>,
    options: &MeasurementOptions,
    dir: &Path,
    save_values: bool,
) -> Result<RunReport> {
    let settings = options.settings(batch)?;
    let mut report = RunReport {
        sources,
        polarity: Some(settings.polarity),
        pulse_count: batch.pulse_count(),
        ..Default::default()
    };
    for kind in MeasurementKind::iter() {
        match kind.measure(axis, batch, &settings) {
            Ok(measurement) => report.add(context, kind, &measurement, dir, save_values)?,
            Err(e) => {
                warn!("{kind}: {e}");
                report.add_failure(kind, e.to_string());
            }
        }
    }
    context.save_example_pulses(axis, batch, dir)?;
    let path = report.save(dir)?;
    info!("Results written to {}", path.display());
    Ok(report)
}

/// Merges runs sharing the time axis of the first run.
fn merge_runs(runs: &[Run]) -> Option<(TimeAxis, WaveformBatch, Vec<PathBuf>)> {
    let (first, rest) = runs.split_first()?;
    let mut batch = first.batch.clone();
    let mut sources = vec![first.path.clone()];
    for run in rest {
        if run.axis != first.axis {
            warn!(
                "{} has a different time axis to {}, not merged",
                run.path.display(),
                first.path.display()
            );
            continue;
        }
        match batch.append(&run.batch) {
            Ok(()) => sources.push(run.path.clone()),
            Err(e) => warn!("{}: {e}", run.path.display()),
        }
    }
    Some((first.axis.clone(), batch, sources))
}

fn histogram_channel(
    parameters: &HistogramParameters,
    options: &MeasurementOptions,
    context: &ReportContext,
    channel: LedChannel,
) -> Result<()> {
    let runs = &parameters.runs;
    let loaded = find_runs(&runs.channel_dir(channel), &runs.basename)?
        .par_iter()
        .map(|(path, number)| -> Result<_> {
            let run = load_run(path, *number, runs.scope_channel, options)?;
            let dir = context.run_dir(channel, run.number)?;
            report_batch(
                context,
                &run.axis,
                &run.batch,
                vec![run.path.clone()],
                options,
                &dir,
                parameters.save_values,
            )?;
            Ok(run)
        })
        .collect::<Vec<Result<_>>>();

    let runs = loaded
        .into_iter()
        .filter_map(|result| {
            result
                .inspect_err(|e| error!("Channel {channel}: {e:#}"))
                .ok()
        })
        .collect::<Vec<_>>();

    if let Some((axis, batch, sources)) = merge_runs(&runs) {
        let dir = context.channel_dir(channel)?;
        report_batch(
            context,
            &axis,
            &batch,
            sources,
            options,
            &dir,
            parameters.save_values,
        )?;
    }
    Ok(())
}

/// Histograms every run of each channel, and all runs of a channel together.
#[tracing::instrument(skip_all)]
pub(crate) fn histograms(
    parameters: &HistogramParameters,
    options: &MeasurementOptions,
) -> Result<()> {
    let context =
        ReportContext::new(&parameters.output_dir).with_size(parameters.size.size());
    for &channel in &parameters.runs.channels.0 {
        if let Err(e) = histogram_channel(parameters, options, &context, channel) {
            error!("Channel {channel}: {e:#}");
        }
    }
    Ok(())
}

#[tracing::instrument(skip_all)]
pub(crate) fn jitter(parameters: &JitterParameters, options: &MeasurementOptions) -> Result<()> {
    let (axis_a, batch_a) = read_channel(
        &parameters.file_a,
        parameters.channel_a,
        options.correct_offset(),
    )?;
    let (axis_b, batch_b) = read_channel(
        &parameters.file_b,
        parameters.channel_b,
        options.correct_offset(),
    )?;
    let jitter = calc_jitter(
        &axis_a,
        &batch_a,
        &axis_b,
        &batch_b,
        options.heuristic(),
        options.interpolation(),
    )?;
    let (mean, std, stderr) = jitter.as_triple();
    println!(
        "Jitter \t\t= {:.3} +/- {:.3} ns (standard error {:.3} ns, {} pulses)",
        mean * NANOSECONDS_PER_SECOND,
        std * NANOSECONDS_PER_SECOND,
        stderr * NANOSECONDS_PER_SECOND,
        jitter.values.len()
    );
    Ok(())
}

#[tracing::instrument(skip_all)]
pub(crate) fn plot_pulses(
    parameters: &PlotPulsesParameters,
    options: &MeasurementOptions,
) -> Result<()> {
    let (axis, batch) = read_channel(
        &parameters.file,
        parameters.channel,
        options.correct_offset(),
    )?;
    let count = parameters.count.min(batch.pulse_count());
    if count == 0 {
        return Err(anyhow!("{} has no pulses", parameters.file.display()));
    }

    let dir = parameters
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let title = format!(
        "Example pulses: {}",
        parameters
            .file
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    );
    ReportContext::new(dir)
        .with_size(parameters.size.size())
        .save_pulses(&axis, &batch, count, &title, &parameters.output)?;
    info!("Saved {count} pulses to {}", parameters.output.display());

    if let Some(save_file) = &parameters.save_file {
        batch
            .pulses()
            .take(count)
            .flat_map(|pulse| {
                axis.view()
                    .iter()
                    .zip(pulse.iter())
                    .map(|(t, v)| (t * NANOSECONDS_PER_SECOND, *v))
                    .collect::<Vec<_>>()
            })
            .save_to_file(save_file)?;
    }
    Ok(())
}
