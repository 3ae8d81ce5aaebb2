// =============================================================================
// Chart Rendering — two-panel SVG (price + MAs, RSI)
// =============================================================================
//
// Left panel:  price, fast MA, slow MA.
// Right panel: RSI with 70 / 30 guide lines on a fixed 0..100 axis.
//
// Undefined indicator entries break the line rather than being drawn as zero:
// each contiguous run of defined values becomes its own line series.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::indicators::rsi::{OVERBOUGHT, OVERSOLD};
use crate::indicators::IndicatorFrame;

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 600;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const LIME: RGBColor = RGBColor(50, 205, 50);

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Render the chart for `frame` to an SVG document.
///
/// `symbol` is used in the panel captions (e.g. "BTC").
pub fn render_svg(frame: &IndicatorFrame, symbol: &str) -> Result<String> {
    if frame.len() < 2 {
        anyhow::bail!(
            "at least two price points are required to draw a chart, got {}",
            frame.len()
        );
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&BLACK).context("failed to fill chart background")?;

        let (left, right) = root.split_horizontally(WIDTH / 2);
        draw_price_panel(&left, frame, symbol)?;
        draw_rsi_panel(&right, frame, symbol)?;

        root.present().context("failed to finalise chart")?;
    }

    Ok(svg)
}

/// Render the chart and write it to `path`.
pub fn save_chart(path: &Path, frame: &IndicatorFrame, symbol: &str) -> Result<()> {
    let svg = render_svg(frame, symbol)?;
    std::fs::write(path, svg)
        .with_context(|| format!("failed to write chart to {}", path.display()))?;

    info!(path = %path.display(), "chart saved");
    Ok(())
}

// =============================================================================
// Panels
// =============================================================================

fn draw_price_panel(area: &Area<'_>, frame: &IndicatorFrame, symbol: &str) -> Result<()> {
    let timestamps = frame.series.timestamps();
    let prices: Vec<Option<f64>> = frame.series.prices().into_iter().map(Some).collect();
    let params = frame.params;

    let (lo, hi) = value_bounds([&prices, &frame.ma_fast, &frame.ma_slow]);
    let pad = ((hi - lo) * 0.05).max(1e-6);

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{symbol} Price + MA"), caption_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range(&timestamps), (lo - pad)..(hi + pad))
        .context("failed to build price chart")?;

    chart
        .configure_mesh()
        .bold_line_style(WHITE.mix(0.3).stroke_width(1))
        .light_line_style(WHITE.mix(0.05).stroke_width(1))
        .axis_style(WHITE.mix(0.8).stroke_width(1))
        .label_style(label_font())
        .x_labels(6)
        .x_label_formatter(&|t: &DateTime<Utc>| t.format("%m-%d").to_string())
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .draw()
        .context("failed to draw price mesh")?;

    let lines = [
        (&prices, CYAN.stroke_width(2), "Price".to_string()),
        (&frame.ma_fast, YELLOW.stroke_width(1), format!("MA {}", params.fast_window)),
        (&frame.ma_slow, ORANGE.stroke_width(1), format!("MA {}", params.slow_window)),
    ];

    for (values, style, label) in lines {
        for (i, run) in defined_runs(&timestamps, values).into_iter().enumerate() {
            let anno = chart
                .draw_series(LineSeries::new(run, style))
                .with_context(|| format!("failed to draw {label}"))?;
            if i == 0 {
                anno.label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            }
        }
    }

    draw_legend(&mut chart)
}

fn draw_rsi_panel(area: &Area<'_>, frame: &IndicatorFrame, symbol: &str) -> Result<()> {
    let timestamps = frame.series.timestamps();
    let window = frame.params.rsi_window;
    let range = x_range(&timestamps);

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{symbol} RSI ({window})"), caption_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(range.clone(), 0.0..100.0)
        .context("failed to build RSI chart")?;

    chart
        .configure_mesh()
        .bold_line_style(WHITE.mix(0.3).stroke_width(1))
        .light_line_style(WHITE.mix(0.05).stroke_width(1))
        .axis_style(WHITE.mix(0.8).stroke_width(1))
        .label_style(label_font())
        .x_labels(6)
        .x_label_formatter(&|t: &DateTime<Utc>| t.format("%m-%d").to_string())
        .y_label_formatter(&|v: &f64| format!("{v:.0}"))
        .draw()
        .context("failed to draw RSI mesh")?;

    let style = LIME.stroke_width(2);
    let label = format!("RSI ({window})");
    for (i, run) in defined_runs(&timestamps, &frame.rsi).into_iter().enumerate() {
        let anno = chart
            .draw_series(LineSeries::new(run, style))
            .context("failed to draw RSI")?;
        if i == 0 {
            anno.label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    for (level, color) in [(OVERBOUGHT, RED), (OVERSOLD, BLUE)] {
        chart
            .draw_series(LineSeries::new(
                vec![(range.start, level), (range.end, level)],
                color.mix(0.7).stroke_width(1),
            ))
            .context("failed to draw RSI guide line")?;
    }

    // Nothing to label until the RSI warm-up has passed.
    if frame.rsi.iter().any(Option::is_some) {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn draw_legend<'a, X, Y>(chart: &mut ChartContext<'a, SVGBackend<'a>, Cartesian2d<X, Y>>) -> Result<()>
where
    X: Ranged,
    Y: Ranged,
{
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(BLACK.mix(0.8).filled())
        .border_style(WHITE.mix(0.5).stroke_width(1))
        .label_font(label_font())
        .draw()
        .context("failed to draw legend")
}

fn caption_font() -> TextStyle<'static> {
    ("sans-serif", 20).into_font().color(&WHITE)
}

fn label_font() -> TextStyle<'static> {
    ("sans-serif", 12).into_font().color(&WHITE)
}

fn x_range(timestamps: &[DateTime<Utc>]) -> std::ops::Range<DateTime<Utc>> {
    let first = timestamps.first().copied().unwrap_or_default();
    let last = timestamps.last().copied().unwrap_or_default();
    first..last
}

/// Min / max over every defined value of `series`, or `(0, 1)` when nothing
/// is defined.
fn value_bounds<const N: usize>(series: [&Vec<Option<f64>>; N]) -> (f64, f64) {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.iter().filter_map(|v| *v))
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

/// Split aligned `(timestamp, value)` pairs into contiguous runs of defined
/// values.
fn defined_runs(
    timestamps: &[DateTime<Utc>],
    values: &[Option<f64>],
) -> Vec<Vec<(DateTime<Utc>, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (&t, v) in timestamps.iter().zip(values) {
        match v {
            Some(v) if v.is_finite() => current.push((t, *v)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}
