//! Type normalization: date column to datetime, numeric columns to Float64.

use super::converters::{to_datetime, to_float};
use crate::config::ColumnRoles;
use crate::error::Result;
use crate::types::CoercionRecord;
use crate::utils::require_column;
use polars::prelude::*;
use tracing::{debug, info};

/// Coerces declared columns to their target types.
///
/// Values that cannot be parsed become missing. This runs after imputation,
/// so those values stay missing in the output.
pub struct TypeNormalizer;

impl TypeNormalizer {
    /// Coerce the date column and every `coerce_numeric` column.
    pub fn normalize(
        mut df: DataFrame,
        roles: &ColumnRoles,
    ) -> Result<(DataFrame, Vec<CoercionRecord>)> {
        info!("Normalizing column types...");
        let mut records = Vec::new();

        if let Some(date_col) = &roles.date {
            records.push(Self::coerce_column(&mut df, date_col, to_datetime, "datetime")?);
        }

        for col in &roles.coerce_numeric {
            records.push(Self::coerce_column(&mut df, col, to_float, "float64")?);
        }

        let invalidated: usize = records.iter().map(|r| r.invalidated).sum();
        info!(
            "Type normalization complete: {} columns, {} values invalidated",
            records.len(),
            invalidated
        );
        Ok((df, records))
    }

    fn coerce_column(
        df: &mut DataFrame,
        col_name: &str,
        convert: fn(&Series) -> PolarsResult<Series>,
        target: &str,
    ) -> Result<CoercionRecord> {
        let series = require_column(df, col_name)?.as_materialized_series();
        let missing_before = series.null_count();
        let converted = convert(series)?;
        let missing_after = converted.null_count();
        df.replace(col_name, converted)?;

        let invalidated = missing_after.saturating_sub(missing_before);
        debug!(
            "Coerced '{}' to {}: {} values could not be parsed",
            col_name, target, invalidated
        );

        Ok(CoercionRecord {
            column: col_name.to_string(),
            target: target.to_string(),
            invalidated,
            missing_after,
        })
    }
}
