//! Chart reporting.
//!
//! Charts are built from a read-only snapshot of the table and handed to a
//! [`RenderSurface`]. Rendering has no effect on the table.

mod charts;
mod surface;

pub use charts::{
    BoxPlotSummary, Chart, ChartData, ChartStyle, DensityPoint, HistogramBin,
    after_cleaning_charts, before_cleaning_charts, box_plot, box_plot_summary, build_histogram,
    gaussian_kde, histogram, missing_matrix,
};
pub use surface::{JsonChartSurface, NullSurface, RenderSurface};
