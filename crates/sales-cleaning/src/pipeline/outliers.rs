//! Outlier filtering on a single target column.
//!
//! Rows are kept when the target value is at most `mean + sigma * std_dev`,
//! with the sample standard deviation computed over the non-missing values
//! of the filter's input.

use crate::cleaner::converters::to_float;
use crate::error::Result;
use crate::types::OutlierReport;
use crate::utils::{is_numeric_dtype, mean, require_column, sample_std};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Removes rows whose target value lies above the upper bound.
pub struct OutlierFilter;

impl OutlierFilter {
    /// Drop rows above `mean + sigma * std_dev` of `target`.
    ///
    /// A row with a missing (or NaN) target value is dropped. With fewer
    /// than two non-missing values the bound is undefined and every row is
    /// dropped.
    /// A textual target column is converted to Float64 first.
    pub fn filter(
        mut df: DataFrame,
        target: &str,
        sigma: f64,
    ) -> Result<(DataFrame, OutlierReport)> {
        info!("Filtering outliers in '{}'...", target);
        let series = require_column(&df, target)?.as_materialized_series();

        let values = if is_numeric_dtype(series.dtype()) {
            series.cast(&DataType::Float64)?
        } else {
            let converted = to_float(series)?;
            df.replace(target, converted.clone())?;
            converted
        };
        let present: Vec<f64> = values
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();

        let mean_val = mean(&present);
        let std_dev = sample_std(&present);
        let upper_bound = match (mean_val, std_dev) {
            (Some(m), Some(s)) => Some(m + sigma * s),
            _ => None,
        };

        let keep: Vec<bool> = match upper_bound {
            Some(bound) => values
                .f64()?
                .into_iter()
                .map(|v| v.is_some_and(|val| val <= bound))
                .collect(),
            None => {
                warn!(
                    "Outlier bound for '{}' is undefined ({} values); no row passes the filter",
                    target,
                    present.len()
                );
                vec![false; df.height()]
            }
        };

        let before = df.height();
        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let df = df.filter(&mask)?;
        let rows_removed = before - df.height();

        debug!(
            "Outlier bound for '{}': mean={:?}, std={:?}, upper={:?}; removed {} rows",
            target, mean_val, std_dev, upper_bound, rows_removed
        );

        Ok((
            df,
            OutlierReport {
                column: target.to_string(),
                mean: mean_val,
                std_dev,
                upper_bound,
                rows_removed,
            },
        ))
    }
}
