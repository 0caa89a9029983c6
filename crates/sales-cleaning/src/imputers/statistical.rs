//! Statistical imputation methods.
//!
//! Numeric columns are filled with their median and categorical columns with
//! their mode, both computed over the non-missing values.

use crate::config::{ColumnRoles, EmptyColumnPolicy};
use crate::error::{CleaningError, Result};
use crate::types::{FillStatistic, ImputationRecord};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, format_numeric, median, numeric_values,
    require_column, string_mode,
};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Impute every declared numeric and categorical column.
    pub fn impute(
        mut df: DataFrame,
        roles: &ColumnRoles,
        policy: EmptyColumnPolicy,
    ) -> Result<(DataFrame, Vec<ImputationRecord>)> {
        info!("Imputing missing values...");
        let mut records = Vec::with_capacity(roles.numeric.len() + roles.categorical.len());

        for col in &roles.numeric {
            records.push(Self::apply_numeric_median(&mut df, col, policy)?);
        }
        for col in &roles.categorical {
            records.push(Self::apply_mode_imputation(&mut df, col, policy)?);
        }

        let filled: usize = records.iter().map(|r| r.filled).sum();
        info!("Imputation complete: {} values filled", filled);
        Ok((df, records))
    }

    /// Fill a numeric column's missing values with its median.
    ///
    /// Text columns keep their dtype: the median is taken over the entries
    /// that parse as numbers and written back in text form.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        policy: EmptyColumnPolicy,
    ) -> Result<ImputationRecord> {
        let series = require_column(df, col_name)?.as_materialized_series();
        let missing = series.null_count();
        let values = numeric_values(series)?;

        let Some(median_val) = median(&values) else {
            return Self::handle_empty_column(col_name, FillStatistic::Median, missing, policy);
        };

        if missing > 0 {
            let filled = if series.dtype() == &DataType::String {
                fill_string_nulls(series, &format_numeric(median_val))?
            } else {
                fill_numeric_nulls(series, median_val)?
            };
            df.replace(col_name, filled)?;
        }
        debug!(
            "Filled {} missing values in '{}' with median {}",
            missing, col_name, median_val
        );

        Ok(ImputationRecord {
            column: col_name.to_string(),
            statistic: FillStatistic::Median,
            value: Some(format_numeric(median_val)),
            filled: missing,
        })
    }

    /// Fill a categorical column's missing values with its mode.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        policy: EmptyColumnPolicy,
    ) -> Result<ImputationRecord> {
        let series = require_column(df, col_name)?.as_materialized_series();
        let missing = series.null_count();

        let Some(mode_val) = string_mode(series) else {
            return Self::handle_empty_column(col_name, FillStatistic::Mode, missing, policy);
        };

        if missing > 0 {
            let original_dtype = series.dtype().clone();
            let mut filled = fill_string_nulls(series, &mode_val)?;
            if original_dtype != DataType::String {
                filled = filled.cast(&original_dtype)?;
            }
            df.replace(col_name, filled)?;
        }
        debug!(
            "Filled {} missing values in '{}' with mode '{}'",
            missing, col_name, mode_val
        );

        Ok(ImputationRecord {
            column: col_name.to_string(),
            statistic: FillStatistic::Mode,
            value: Some(mode_val),
            filled: missing,
        })
    }

    fn handle_empty_column(
        col_name: &str,
        statistic: FillStatistic,
        missing: usize,
        policy: EmptyColumnPolicy,
    ) -> Result<ImputationRecord> {
        match policy {
            EmptyColumnPolicy::Fail => Err(CleaningError::ImputationUndefined {
                column: col_name.to_string(),
                statistic: statistic.to_string(),
            }),
            EmptyColumnPolicy::LeaveMissing => {
                warn!(
                    "Column '{}' has no values to compute a {} from; leaving {} rows missing",
                    col_name, statistic, missing
                );
                Ok(ImputationRecord {
                    column: col_name.to_string(),
                    statistic,
                    value: None,
                    filled: 0,
                })
            }
        }
    }
}
