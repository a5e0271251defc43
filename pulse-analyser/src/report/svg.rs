use anyhow::Result;
use plotters::{
    chart::{ChartBuilder, ChartContext},
    coord::{Shift, types::RangedCoordf64},
    prelude::{Cartesian2d, DrawingArea, IntoDrawingArea, PathElement, Rectangle, SVGBackend},
    series::LineSeries,
    style::{BLACK, BLUE, Color, IntoFont, Palette, Palette99, WHITE},
};
use pulsecal_common::{NANOSECONDS_PER_SECOND, Real};
use pulsecal_waveform_metrics::{Histogram, TimeAxis, WaveformBatch};
use std::{ops::Range, path::Path};
use tracing::instrument;

type PulseDrawingArea<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type PulseChartContext<'a> =
    ChartContext<'a, SVGBackend<'a>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn build_chart<'a>(
    root: &PulseDrawingArea<'a>,
    title: &str,
    x_range: Range<Real>,
    y_range: Range<Real>,
    x_label: &str,
    y_label: &str,
) -> Result<PulseChartContext<'a>> {
    let mut chart = ChartBuilder::on(root)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .margin(10)
        .caption(title, ("sans-serif", 30.0).into_font())
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    Ok(chart)
}

/// Draws `histogram` as filled bars, with the mean and spread in the caption.
#[instrument(skip_all, level = "debug", fields(name = %histogram.name))]
pub(crate) fn save_histogram(
    histogram: &Histogram,
    x_label: &str,
    path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!(
        "{}: mean {:.3e}, std {:.3e}, entries {}",
        histogram.name,
        histogram.mean,
        histogram.std,
        histogram.entries()
    );
    let y_max = histogram.max_count().max(1) as Real * 1.1;
    let mut chart = build_chart(
        &root,
        &title,
        histogram.min..histogram.max,
        0.0..y_max,
        x_label,
        "Events",
    )?;

    let bars = histogram.counts.iter().enumerate().map(|(bin, count)| {
        let left = histogram.min + bin as Real * histogram.bin_width;
        Rectangle::new(
            [(left, 0.0), (left + histogram.bin_width, *count as Real)],
            BLUE.mix(0.6).filled(),
        )
    });
    chart.draw_series(bars)?;

    root.present()?;
    Ok(())
}

/// Draws the first `count` pulses of `batch`, time in ns against voltage.
#[instrument(skip_all, level = "debug", fields(count = count))]
pub(crate) fn save_pulses(
    axis: &TimeAxis,
    batch: &WaveformBatch,
    count: usize,
    title: &str,
    path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let times = axis
        .view()
        .iter()
        .map(|t| t * NANOSECONDS_PER_SECOND)
        .collect::<Vec<_>>();
    let (y_min, y_max) = batch
        .pulses()
        .take(count)
        .flat_map(|pulse| pulse.to_vec())
        .fold((Real::INFINITY, Real::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });
    let (y_min, y_max) = if y_min < y_max {
        let margin = 0.05 * (y_max - y_min);
        (y_min - margin, y_max + margin)
    } else {
        (-1.0, 1.0)
    };
    let x_range = match (times.first(), times.last()) {
        (Some(first), Some(last)) => *first..*last,
        _ => 0.0..1.0,
    };

    let mut chart = build_chart(&root, title, x_range, y_min..y_max, "Time (ns)", "Voltage (V)")?;

    for (index, pulse) in batch.pulses().take(count).enumerate() {
        let colour = Palette99::pick(index).to_rgba();
        let data = times.iter().copied().zip(pulse.iter().copied());
        chart
            .draw_series(LineSeries::new(data, colour))?
            .label(format!("pulse[{index}]"))
            .legend(move |(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], colour));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
