//! SVG charts: payoff histograms and the strategy comparison figure.

use std::path::{Path, PathBuf};

use log::{info, warn};
use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::element::Boxplot;
use plotters::prelude::*;
use stoplab_core::{ResultCollections, Strategy, StrategyId};
use thiserror::Error;

use crate::config::HistogramConfig;
use crate::summary::ComparisonSummary;

const HIST_SIZE: (u32, u32) = (1000, 600);
const COMPARISON_SIZE: (u32, u32) = (1400, 650);
const DEFAULT_BAR_COLOR: RGBColor = RGBColor(0x26, 0x46, 0x53);

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot")]
    NoData,

    #[error("invalid histogram range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    #[error("histogram needs at least one bin")]
    ZeroBins,

    #[error("invalid hex color '{0}'")]
    InvalidColor(String),

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart rendering failed: {0}")]
    Render(String),
}

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(hex: &str) -> Result<RGBColor, PlotError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || PlotError::InvalidColor(hex.to_string());
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn strategy_color(id: StrategyId) -> Result<RGBColor, PlotError> {
    parse_hex_color(id.color())
}

// ─── Histograms ─────────────────────────────────────────────────────

/// Resolve histogram edges: each fixed end wins, missing ends come from
/// the data extent. A zero-width range is widened by 0.5 on each side.
pub fn resolve_hist_range(
    values: &[f64],
    range_min: Option<f64>,
    range_max: Option<f64>,
) -> Result<(f64, f64), PlotError> {
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let min = match range_min {
        Some(m) => m,
        None => finite().reduce(f64::min).ok_or(PlotError::NoData)?,
    };
    let max = match range_max {
        Some(m) => m,
        None => finite().reduce(f64::max).ok_or(PlotError::NoData)?,
    };

    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(PlotError::InvalidRange { min, max });
    }
    if min == max {
        warn!("histogram range collapses to {min}; widening by 0.5");
        return Ok((min - 0.5, max + 0.5));
    }
    Ok((min, max))
}

/// Count values into `bins` equal-width bins over `[min, max]`.
///
/// Bins are half-open except the last, which also takes `max`. Values
/// outside the range are ignored.
pub fn histogram_counts(values: &[f64], min: f64, max: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    if bins == 0 || !(max > min) {
        return counts;
    }
    let width = (max - min) / bins as f64;
    for &value in values {
        if !(value >= min && value <= max) {
            continue;
        }
        let idx = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Render one histogram to an SVG file.
pub fn plot_histogram(
    path: &Path,
    values: &[f64],
    title: &str,
    color: RGBColor,
    bins: usize,
    range: (f64, f64),
) -> Result<(), PlotError> {
    if values.is_empty() {
        return Err(PlotError::NoData);
    }
    if bins == 0 {
        return Err(PlotError::ZeroBins);
    }
    let (min, max) = range;
    if !(min < max) {
        return Err(PlotError::InvalidRange { min, max });
    }
    ensure_parent(path)?;

    let counts = histogram_counts(values, min, max, bins);
    let width = (max - min) / bins as f64;
    let y_max = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let root = SVGBackend::new(path, HIST_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(min..max, 0.0..(y_max * 1.1))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Payoff")
        .y_desc("Count")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], color.mix(0.7).filled())
        }))
        .map_err(render_err)?;
    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], BLACK.mix(0.6))
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Histogram of a single payoff collection, titled "Payoff Distribution".
pub fn plot_payoff_histogram(
    path: &Path,
    values: &[f64],
    config: &HistogramConfig,
) -> Result<(), PlotError> {
    let range = resolve_hist_range(values, config.range_min, config.range_max)?;
    plot_histogram(
        path,
        values,
        "Payoff Distribution",
        DEFAULT_BAR_COLOR,
        config.bins,
        range,
    )
}

/// One `{id}_hist.svg` per collection in `results`, all on a shared range.
///
/// Returns the written paths in canonical strategy order.
pub fn plot_strategy_histograms(
    dir: &Path,
    results: &ResultCollections,
    strategies: &[Strategy],
    config: &HistogramConfig,
) -> Result<Vec<PathBuf>, PlotError> {
    if results.is_empty() {
        return Err(PlotError::NoData);
    }
    let all: Vec<f64> = results.all_values().collect();
    let range = resolve_hist_range(&all, config.range_min, config.range_max)?;

    let mut written = Vec::with_capacity(results.len());
    for (id, values) in results.iter() {
        let label = strategies
            .iter()
            .find(|s| s.id() == id)
            .map(Strategy::label)
            .unwrap_or_else(|| id.to_string());
        let path = dir.join(format!("{id}_hist.svg"));
        plot_histogram(
            &path,
            values,
            &format!("{label} Payoff Distribution"),
            strategy_color(id)?,
            config.bins,
            range,
        )?;
        written.push(path);
    }
    Ok(written)
}

// ─── Comparison figure ──────────────────────────────────────────────

struct Column {
    label: String,
    color: RGBColor,
    quartiles: Quartiles,
    outliers: Vec<f64>,
    mean: f64,
    std_dev: f64,
}

/// Tukey quartiles of the finite values, plus the values beyond the
/// 1.5 * IQR fences.
pub fn box_summary(values: &[f64]) -> Result<(Quartiles, Vec<f64>), PlotError> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(PlotError::NoData);
    }
    let quartiles = Quartiles::new(&finite);
    let [lo_fence, _, _, _, hi_fence] = quartiles.values();
    let outliers = finite
        .into_iter()
        .filter(|&v| (v as f32) < lo_fence || (v as f32) > hi_fence)
        .collect();
    Ok((quartiles, outliers))
}

/// Two-panel comparison: box-and-whisker per strategy on the left, mean
/// payoff with ±1 std dev error bars on the right.
pub fn plot_comparison(
    path: &Path,
    results: &ResultCollections,
    summary: &ComparisonSummary,
) -> Result<(), PlotError> {
    let columns = summary
        .entries
        .iter()
        .map(|entry| {
            let values = results.get(entry.id).ok_or(PlotError::NoData)?;
            let (quartiles, outliers) = box_summary(values)?;
            Ok(Column {
                label: entry.label.clone(),
                color: strategy_color(entry.id)?,
                quartiles,
                outliers,
                mean: entry.stats.mean,
                std_dev: entry.stats.std_dev,
            })
        })
        .collect::<Result<Vec<_>, PlotError>>()?;
    if columns.is_empty() {
        return Err(PlotError::NoData);
    }
    ensure_parent(path)?;

    let root = SVGBackend::new(path, COMPARISON_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let root = root
        .titled("Stopping Strategy Comparison", ("sans-serif", 28))
        .map_err(render_err)?;
    let (left, right) = root.split_horizontally((COMPARISON_SIZE.0 / 2) as i32);

    draw_box_panel(&left, &columns)?;
    draw_mean_panel(&right, &columns)?;

    root.present().map_err(render_err)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn category_label(labels: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

fn draw_box_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, columns: &[Column]) -> Result<(), PlotError> {
    // Whiskers sit on the fences, so the fences bound the panel.
    fn extent(c: &Column) -> impl Iterator<Item = f64> + '_ {
        let [lo_fence, _, _, _, hi_fence] = c.quartiles.values();
        c.outliers
            .iter()
            .copied()
            .chain([f64::from(lo_fence), f64::from(hi_fence), c.mean])
    }
    let lo = columns.iter().flat_map(extent).fold(f64::INFINITY, f64::min);
    let hi = columns.iter().flat_map(extent).fold(f64::NEG_INFINITY, f64::max);
    let (y0, y1) = padded(lo, hi);
    let n = columns.len() as f64;
    let labels: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Payoff distribution by strategy", ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n - 0.5), (y0 as f32)..(y1 as f32))
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(columns.len() * 2 + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc("Payoff")
        .draw()
        .map_err(render_err)?;

    let box_px = ((f64::from(area.dim_in_pixel().0) * 0.45 / n) as u32).max(4);
    for (i, c) in columns.iter().enumerate() {
        let x = i as f64;
        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(x, &c.quartiles)
                    .width(box_px)
                    .whisker_width(0.6)
                    .style(c.color.stroke_width(2)),
            ))
            .map_err(render_err)?;
        chart
            .draw_series(c.outliers.iter().map(|&v| Circle::new((x, v as f32), 3, BLACK.mix(0.5))))
            .map_err(render_err)?;
        chart
            .draw_series([
                Circle::new((x, c.mean as f32), 5, WHITE.filled()),
                Circle::new((x, c.mean as f32), 5, BLACK.stroke_width(2)),
            ])
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_mean_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, columns: &[Column]) -> Result<(), PlotError> {
    let lo = columns
        .iter()
        .map(|c| c.mean - c.std_dev)
        .fold(0.0, f64::min);
    let hi = columns
        .iter()
        .map(|c| c.mean + c.std_dev)
        .fold(0.0, f64::max);
    let (y0, y1) = padded(lo, hi);
    let n = columns.len() as f64;
    let labels: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Mean payoff (std dev)", ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n - 0.5), y0..y1)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(columns.len() * 2 + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc("Mean payoff")
        .draw()
        .map_err(render_err)?;

    let half = 0.35;
    let cap = 0.1;
    for (i, c) in columns.iter().enumerate() {
        let x = i as f64;
        let (lo, hi) = (c.mean - c.std_dev, c.mean + c.std_dev);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x - half, 0.0), (x + half, c.mean)],
                c.color.mix(0.8).filled(),
            )))
            .map_err(render_err)?;
        chart
            .draw_series([
                PathElement::new(vec![(x, lo), (x, hi)], BLACK.stroke_width(2)),
                PathElement::new(vec![(x - cap, lo), (x + cap, lo)], BLACK.stroke_width(2)),
                PathElement::new(vec![(x - cap, hi), (x + cap, hi)], BLACK.stroke_width(2)),
            ])
            .map_err(render_err)?;
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), PlotError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|source| PlotError::Io {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}
