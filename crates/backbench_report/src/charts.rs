//! Comparison bar charts.
//!
//! Two charts group bars by batch with one bar per strategy, offset by
//! [`BAR_WIDTH`] so the three strategies sit side by side. The other two
//! show one aggregate bar per strategy.

use crate::dataset::ReportData;
use crate::error::{ReportError, ReportResult};
use backbench_core::Strategy;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Width of one bar in a grouped chart, in batch units.
pub const BAR_WIDTH: f64 = 0.25;

const AGGREGATE_BAR_WIDTH: f64 = 0.8;
const GROUPED_SIZE: (u32, u32) = (1200, 600);
const AGGREGATE_SIZE: (u32, u32) = (1000, 600);

/// Bar color for a strategy.
pub fn strategy_color(strategy: Strategy) -> RGBColor {
    match strategy {
        Strategy::Full => RGBColor(0x1f, 0x77, 0xb4),
        Strategy::Incremental => RGBColor(0xff, 0x7f, 0x0e),
        Strategy::LogBased => RGBColor(0x2c, 0xa0, 0x2c),
    }
}

/// Horizontal offset of a strategy's bar from its batch number.
pub fn bar_offset(strategy: Strategy) -> f64 {
    match strategy {
        Strategy::Full => -BAR_WIDTH,
        Strategy::Incremental => 0.0,
        Strategy::LogBased => BAR_WIDTH,
    }
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartFormat {
    /// Scalable vector graphics.
    #[default]
    Svg,
    /// Raster image. Requires the `png` feature.
    Png,
}

impl ChartFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(ChartFormat::Svg),
            "png" => Ok(ChartFormat::Png),
            other => Err(format!("unknown chart format: {other} (expected svg or png)")),
        }
    }
}

/// One strategy's bars in a grouped chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// Strategy the bars belong to.
    pub strategy: Strategy,
    /// Legend text.
    pub label: String,
    /// Bar centers and heights.
    pub bars: Vec<(f64, f64)>,
}

/// What a chart plots.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    /// Bars grouped by batch, one series per strategy.
    Grouped {
        /// Series in report order.
        series: Vec<BarSeries>,
        /// Highest batch number on the axis.
        last_batch: u32,
    },
    /// One bar per strategy.
    Aggregate(Vec<(Strategy, f64)>),
}

/// A chart ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Output file name without extension.
    pub file_stem: &'static str,
    /// Caption.
    pub title: &'static str,
    /// X axis description.
    pub x_desc: &'static str,
    /// Y axis description.
    pub y_desc: &'static str,
    /// Plotted data.
    pub body: ChartBody,
}

impl Chart {
    /// File name for `format`.
    pub fn file_name(&self, format: ChartFormat) -> String {
        format!("{}.{}", self.file_stem, format.extension())
    }

    fn size(&self) -> (u32, u32) {
        match self.body {
            ChartBody::Grouped { .. } => GROUPED_SIZE,
            ChartBody::Aggregate(_) => AGGREGATE_SIZE,
        }
    }
}

fn grouped(data: &ReportData, column: &str, legend_suffix: &str) -> ReportResult<ChartBody> {
    let mut series = Vec::new();
    let mut last_batch = 0u32;
    for metrics in data.strategies() {
        if !metrics.backup.has_column(column) {
            continue;
        }
        let points = metrics.backup.points("batch", column)?;
        for &(batch, _) in &points {
            last_batch = last_batch.max(batch.max(0.0) as u32);
        }
        let offset = bar_offset(metrics.strategy);
        let bars = points
            .into_iter()
            .map(|(batch, value)| (batch + offset, value))
            .collect();
        series.push(BarSeries {
            strategy: metrics.strategy,
            label: format!("{} {}", metrics.strategy, legend_suffix),
            bars,
        });
    }
    Ok(ChartBody::Grouped { series, last_batch })
}

/// Backup time per batch, grouped by strategy.
pub fn backup_time_chart(data: &ReportData) -> ReportResult<Chart> {
    Ok(Chart {
        file_stem: "backup_time_comparison_bar",
        title: "Backup Time Comparison (Bar Chart)",
        x_desc: "Batch",
        y_desc: "Backup Time (s)",
        body: grouped(data, "backup_time_s", "Backup")?,
    })
}

/// Backup size per batch, grouped by strategy.
pub fn backup_size_chart(data: &ReportData) -> ReportResult<Chart> {
    Ok(Chart {
        file_stem: "backup_size_comparison_bar",
        title: "Backup Size Comparison (Bar Chart)",
        x_desc: "Batch",
        y_desc: "Backup Size (MB)",
        body: grouped(data, "backup_size_MB", "Backup Size")?,
    })
}

/// Sum of every restore step's time, per strategy.
pub fn restore_time_chart(data: &ReportData) -> ReportResult<Chart> {
    let mut totals = Vec::new();
    for metrics in data.strategies() {
        let total: f64 = metrics.restore.column_f64("restore_time_s")?.iter().sum();
        totals.push((metrics.strategy, total));
    }
    Ok(Chart {
        file_stem: "restore_time_total_bar",
        title: "Total Restore Time by Method",
        x_desc: "",
        y_desc: "Restore Time (s)",
        body: ChartBody::Aggregate(totals),
    })
}

/// Mean CPU reading after restore steps, per strategy.
pub fn cpu_after_chart(data: &ReportData) -> ReportResult<Chart> {
    let mut means = Vec::new();
    for metrics in data.strategies() {
        if !metrics.restore.has_column("cpu_after") {
            continue;
        }
        let samples = metrics.restore.column_f64("cpu_after")?;
        if samples.is_empty() {
            continue;
        }
        means.push((
            metrics.strategy,
            samples.iter().sum::<f64>() / samples.len() as f64,
        ));
    }
    Ok(Chart {
        file_stem: "cpu_after_restore_bar",
        title: "Average CPU Usage After Restore",
        x_desc: "",
        y_desc: "CPU (%)",
        body: ChartBody::Aggregate(means),
    })
}

/// All four comparison charts.
pub fn comparison_charts(data: &ReportData) -> ReportResult<Vec<Chart>> {
    Ok(vec![
        backup_time_chart(data)?,
        backup_size_chart(data)?,
        restore_time_chart(data)?,
        cpu_after_chart(data)?,
    ])
}

/// Renders every comparison chart into `dir`, returning the written paths.
pub fn render_all(data: &ReportData, dir: &Path, format: ChartFormat) -> ReportResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    comparison_charts(data)?
        .iter()
        .map(|chart| render(chart, dir, format))
        .collect()
}

/// Renders one chart into `dir`.
pub fn render(chart: &Chart, dir: &Path, format: ChartFormat) -> ReportResult<PathBuf> {
    let path = dir.join(chart.file_name(format));
    match format {
        ChartFormat::Svg => {
            let root = SVGBackend::new(&path, chart.size()).into_drawing_area();
            draw(&root, chart).map_err(render_error)?;
        }
        ChartFormat::Png => render_png(chart, &path)?,
    }
    info!("Plot saved: {}", path.display());
    Ok(path)
}

#[cfg(feature = "png")]
fn render_png(chart: &Chart, path: &Path) -> ReportResult<()> {
    let root = BitMapBackend::new(path, chart.size()).into_drawing_area();
    draw(&root, chart).map_err(render_error)
}

#[cfg(not(feature = "png"))]
fn render_png(_chart: &Chart, _path: &Path) -> ReportResult<()> {
    Err(ReportError::UnsupportedFormat(
        "png (build backbench_report with the `png` feature)".into(),
    ))
}

fn render_error<E>(err: DrawingAreaErrorKind<E>) -> ReportError
where
    E: std::error::Error + Send + Sync,
{
    ReportError::Render(err.to_string())
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &Chart) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    match &chart.body {
        ChartBody::Grouped { series, last_batch } => draw_grouped(root, chart, series, *last_batch)?,
        ChartBody::Aggregate(values) => draw_aggregate(root, chart, values)?,
    }
    root.present()?;
    Ok(())
}

fn draw_grouped<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart,
    series: &[BarSeries],
    last_batch: u32,
) -> DrawResult<DB> {
    let y_max = y_ceiling(series.iter().flat_map(|s| s.bars.iter().map(|&(_, y)| y)));
    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(-0.5f64..f64::from(last_batch) + 0.5, 0f64..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(last_batch as usize + 1)
        .x_label_formatter(&|x| batch_label(*x))
        .x_desc(chart.x_desc)
        .y_desc(chart.y_desc)
        .draw()?;

    for s in series {
        let color = strategy_color(s.strategy);
        ctx.draw_series(s.bars.iter().map(|&(x, y)| {
            Rectangle::new(
                [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, y)],
                color.filled(),
            )
        }))?
        .label(s.label.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn draw_aggregate<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart,
    values: &[(Strategy, f64)],
) -> DrawResult<DB> {
    let y_max = y_ceiling(values.iter().map(|&(_, v)| v));
    let labels: Vec<&str> = values.iter().map(|(s, _)| s.label()).collect();
    let count = values.len().max(1);
    let formatter = |x: &f64| category_label(&labels, *x);

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(-0.5f64..count as f64 - 0.5, 0f64..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&formatter)
        .x_desc(chart.x_desc)
        .y_desc(chart.y_desc)
        .draw()?;

    ctx.draw_series(values.iter().enumerate().map(|(i, &(strategy, value))| {
        let x = i as f64;
        Rectangle::new(
            [
                (x - AGGREGATE_BAR_WIDTH / 2.0, 0.0),
                (x + AGGREGATE_BAR_WIDTH / 2.0, value),
            ],
            strategy_color(strategy).filled(),
        )
    }))?;
    Ok(())
}

/// Top of the y axis: a tenth above the tallest bar.
fn y_ceiling(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn batch_label(x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() < 1e-6 && rounded >= 0.0 {
        format!("{}", rounded as i64)
    } else {
        String::new()
    }
}

fn category_label(labels: &[&str], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels
        .get(rounded as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}
