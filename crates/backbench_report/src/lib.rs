//! # backbench report
//!
//! Reads the metrics CSVs written by the backbench workflows and renders
//! the comparison charts.
//!
//! ```rust,ignore
//! use backbench_report::{load_all, render_all, ChartFormat};
//!
//! let data = load_all("results".as_ref())?;
//! for metrics in data.strategies() {
//!     println!("{}", metrics.backup);
//! }
//! render_all(&data, "results".as_ref(), ChartFormat::Svg)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod charts;
mod dataset;
mod error;
mod table;

pub use charts::{
    backup_size_chart, backup_time_chart, bar_offset, comparison_charts, cpu_after_chart, render,
    render_all, restore_time_chart, strategy_color, BarSeries, Chart, ChartBody, ChartFormat,
    BAR_WIDTH,
};
pub use dataset::{load_all, ReportData, StrategyMetrics};
pub use error::{ReportError, ReportResult};
pub use table::MetricsTable;
