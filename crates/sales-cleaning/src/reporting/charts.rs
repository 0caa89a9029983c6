//! Chart data built from table snapshots.
//!
//! Builders only read the table. The resulting [`Chart`] values carry
//! everything a surface needs to draw them: data, title and style.

use crate::error::Result;
use crate::utils::{numeric_values, quantile_sorted, require_column, sample_std};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of histogram bins.
pub const HISTOGRAM_BINS: usize = 50;

/// Number of points on the density curve.
pub const DENSITY_POINTS: usize = 200;

/// Whisker reach in interquartile ranges.
pub const WHISKER_IQR: f64 = 1.5;

/// Drawing hints for a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colormap: Option<String>,
    pub show_colorbar: bool,
    /// Figure size in inches.
    pub width: f64,
    pub height: f64,
}

impl ChartStyle {
    fn colored(color: &str, width: f64, height: f64) -> Self {
        Self {
            color: Some(color.to_string()),
            colormap: None,
            show_colorbar: false,
            width,
            height,
        }
    }

    fn heatmap() -> Self {
        Self {
            color: None,
            colormap: Some("viridis".to_string()),
            show_colorbar: false,
            width: 12.0,
            height: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Point on a density curve, scaled to histogram counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub x: f64,
    pub y: f64,
}

/// Box plot summary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    /// `missing[c][r]` is true when row `r` of column `c` is missing.
    MissingMatrix {
        columns: Vec<String>,
        rows: usize,
        missing: Vec<Vec<bool>>,
    },
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
        density: Vec<DensityPoint>,
    },
    BoxPlot {
        column: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        summary: Option<BoxPlotSummary>,
    },
}

impl ChartData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingMatrix { .. } => "missing_matrix",
            Self::Histogram { .. } => "histogram",
            Self::BoxPlot { .. } => "box_plot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    pub style: ChartStyle,
    pub data: ChartData,
}

impl Chart {
    /// File-name friendly form of the title.
    pub fn slug(&self) -> String {
        self.title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(|part| part.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Charts rendered before any cleaning step.
pub fn before_cleaning_charts(df: &DataFrame) -> Vec<Chart> {
    vec![missing_matrix(df, "Missing Values Before Cleaning")]
}

/// Charts rendered after the outlier filter.
pub fn after_cleaning_charts(df: &DataFrame, target: &str) -> Result<Vec<Chart>> {
    let label = display_label(target);
    Ok(vec![
        histogram(df, target, &format!("{} Distribution After Cleaning", label))?,
        missing_matrix(df, "Missing Values After Cleaning"),
        box_plot(df, target, &format!("{} Boxplot After Cleaning", label))?,
    ])
}

/// Per column, per row missingness of the whole table.
pub fn missing_matrix(df: &DataFrame, title: &str) -> Chart {
    let columns: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let missing = df
        .get_columns()
        .iter()
        .map(|col| col.is_null().into_iter().map(|v| v.unwrap_or(false)).collect())
        .collect();

    Chart {
        title: title.to_string(),
        x_label: None,
        style: ChartStyle::heatmap(),
        data: ChartData::MissingMatrix {
            columns,
            rows: df.height(),
            missing,
        },
    }
}

/// Histogram of a numeric column with a density overlay.
pub fn histogram(df: &DataFrame, column: &str, title: &str) -> Result<Chart> {
    let mut values = numeric_values(require_column(df, column)?.as_materialized_series())?;
    values.sort_by(|a, b| a.total_cmp(b));

    let bins = build_histogram(&values, HISTOGRAM_BINS);
    let bin_width = bins.first().map(|b| b.end - b.start).unwrap_or(0.0);
    let density = gaussian_kde(&values, DENSITY_POINTS, bin_width);

    Ok(Chart {
        title: title.to_string(),
        x_label: Some(display_label(column)),
        style: ChartStyle::colored("green", 12.0, 5.0),
        data: ChartData::Histogram {
            column: column.to_string(),
            bins,
            density,
        },
    })
}

/// Box plot of a numeric column.
pub fn box_plot(df: &DataFrame, column: &str, title: &str) -> Result<Chart> {
    let mut values = numeric_values(require_column(df, column)?.as_materialized_series())?;
    values.sort_by(|a, b| a.total_cmp(b));

    Ok(Chart {
        title: title.to_string(),
        x_label: None,
        style: ChartStyle::colored("orange", 10.0, 6.0),
        data: ChartData::BoxPlot {
            column: column.to_string(),
            summary: box_plot_summary(&values),
        },
    })
}

/// Equal-width bins over the range of a sorted sample.
pub fn build_histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let bin_count = bins.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in sorted {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}

/// Gaussian kernel density estimate with Scott's bandwidth.
///
/// Evaluated on `points` evenly spaced positions across the sample range and
/// scaled by `n * bin_width` so the curve overlays histogram counts. Empty
/// when the sample is too small or has no spread.
pub fn gaussian_kde(sorted: &[f64], points: usize, bin_width: f64) -> Vec<DensityPoint> {
    let n = sorted.len();
    let (Some(&min), Some(&max), Some(std)) = (sorted.first(), sorted.last(), sample_std(sorted))
    else {
        return Vec::new();
    };
    if std <= 0.0 || points < 2 {
        return Vec::new();
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n as f64 * bin_width;
    let step = (max - min) / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = min + i as f64 * step;
            let pdf = sorted
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            DensityPoint { x, y: pdf * scale }
        })
        .collect()
}

/// Quartiles, whiskers reaching the furthest value within 1.5 IQR, and fliers.
pub fn box_plot_summary(sorted: &[f64]) -> Option<BoxPlotSummary> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let q1 = quantile_sorted(sorted, 0.25);
    let median = quantile_sorted(sorted, 0.5);
    let q3 = quantile_sorted(sorted, 0.75);
    let iqr = q3 - q1;
    let low_limit = q1 - WHISKER_IQR * iqr;
    let high_limit = q3 + WHISKER_IQR * iqr;

    let whisker_low = sorted.iter().copied().find(|v| *v >= low_limit).unwrap_or(min);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= high_limit)
        .unwrap_or(max);
    let fliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < low_limit || *v > high_limit)
        .collect();

    Some(BoxPlotSummary {
        min,
        q1,
        median,
        q3,
        max,
        whisker_low,
        whisker_high,
        fliers,
    })
}

/// `SALES` -> `Sales`.
fn display_label(column: &str) -> String {
    let lower = column.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
