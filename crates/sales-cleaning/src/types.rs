use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-column snapshot used for the dataset overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub non_null_count: usize,
    pub null_count: usize,
}

/// Shape and per-column dtypes and null counts of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_overviews: Vec<ColumnOverview>,
}

impl DatasetOverview {
    pub fn from_frame(df: &DataFrame) -> Self {
        let column_overviews = df
            .get_columns()
            .iter()
            .map(|col| {
                let null_count = col.null_count();
                ColumnOverview {
                    name: col.name().to_string(),
                    dtype: format!("{}", col.dtype()),
                    non_null_count: col.len() - null_count,
                    null_count,
                }
            })
            .collect();

        Self {
            rows: df.height(),
            columns: df.width(),
            column_overviews,
        }
    }

    /// Total number of missing cells.
    pub fn total_missing(&self) -> usize {
        self.column_overviews.iter().map(|c| c.null_count).sum()
    }
}

/// Statistic used to fill a column's missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatistic {
    Median,
    Mode,
}

impl std::fmt::Display for FillStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "median"),
            Self::Mode => write!(f, "mode"),
        }
    }
}

/// Outcome of imputing one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub statistic: FillStatistic,
    /// Fill value in text form; `None` when the column was left missing.
    pub value: Option<String>,
    /// Number of cells that were filled.
    pub filled: usize,
}

/// Outcome of coercing one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionRecord {
    pub column: String,
    pub target: String,
    /// Previously present values that failed to parse and became missing.
    pub invalidated: usize,
    /// Missing values in the column after coercion.
    pub missing_after: usize,
}

/// Statistics and effect of the outlier filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub column: String,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub upper_bound: Option<f64>,
    pub rows_removed: usize,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_loaded: usize,
    pub columns: usize,
    pub missing_before: usize,
    pub duplicates_removed: usize,
    pub imputations: Vec<ImputationRecord>,
    pub coercions: Vec<CoercionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierReport>,
    pub rows_after: usize,
    pub missing_after: usize,
    /// Charts handed to the render surface.
    pub charts_rendered: Vec<String>,
    /// Human-readable log of what each step did.
    pub steps: Vec<String>,
    pub duration_ms: u64,
}

impl CleaningSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a human-readable step description.
    pub fn add_step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    /// Total rows removed by deduplication and outlier filtering.
    pub fn rows_removed(&self) -> usize {
        self.rows_loaded.saturating_sub(self.rows_after)
    }
}

/// Result of a full load-clean-write run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub input_file: String,
    pub output_file: String,
    pub overview_before: DatasetOverview,
    pub overview_after: DatasetOverview,
    pub summary: CleaningSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_counts_nulls() {
        let df = df![
            "SALES" => [Some(1.0), None, Some(3.0)],
            "COUNTRY" => [Some("USA"), Some("France"), None],
        ]
        .unwrap();

        let overview = DatasetOverview::from_frame(&df);
        assert_eq!(overview.rows, 3);
        assert_eq!(overview.columns, 2);
        assert_eq!(overview.total_missing(), 2);
        assert_eq!(overview.column_overviews[0].name, "SALES");
        assert_eq!(overview.column_overviews[0].non_null_count, 2);
    }

    #[test]
    fn test_summary_rows_removed() {
        let mut summary = CleaningSummary::new();
        summary.rows_loaded = 10;
        summary.rows_after = 6;
        summary.add_step("Removed 3 duplicate rows");
        assert_eq!(summary.rows_removed(), 4);
        assert_eq!(summary.steps.len(), 1);
    }

    #[test]
    fn test_fill_statistic_serialization() {
        let json = serde_json::to_string(&FillStatistic::Median).unwrap();
        assert_eq!(json, "\"median\"");
        assert_eq!(FillStatistic::Mode.to_string(), "mode");
    }
}
