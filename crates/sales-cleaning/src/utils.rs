//! Shared utilities for the cleaning pipeline.
//!
//! This module contains the dtype helpers and the small statistics kernels
//! (median, mode, mean, sample standard deviation, quantiles) used by the
//! imputer, the outlier filter and the chart builders.

use crate::error::{CleaningError, Result};
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Look up a column the pipeline was configured to use.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Parse a cell as a number, the way a coerce-or-missing conversion does.
///
/// Surrounding whitespace is ignored; anything else that `f64` does not
/// accept is rejected. A textual `NaN` counts as missing.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Render a fill value the way it is stored in a text column.
pub fn format_numeric(value: f64) -> String {
    format!("{}", value)
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Collect the non-missing values of a Series as `f64`.
///
/// Numeric columns are cast; text columns keep only entries that parse as
/// numbers. NaN is treated as missing either way.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    if series.dtype() == &DataType::String {
        let values = series
            .str()?
            .into_iter()
            .flatten()
            .filter_map(parse_numeric_string)
            .collect();
        return Ok(values);
    }

    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    Ok(values)
}

/// Median of a sample; the mean of the two middle values for even sizes.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean of a sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// Undefined for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    Some(variance.sqrt())
}

/// Quantile of an ascending sorted slice with linear interpolation.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

/// Calculate the mode (most frequent value) of a Series in text form.
///
/// Ties go to the value whose running count reaches the maximum first when
/// scanning in row order.
pub fn string_mode(series: &Series) -> Option<String> {
    let str_series = series.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: HashMap<&str, usize> = HashMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }
    let max_count = value_counts.values().copied().max()?;

    let mut running: HashMap<&str, usize> = HashMap::new();
    for val in str_chunked.into_iter().flatten() {
        let count = running.entry(val).or_insert(0);
        *count += 1;
        if *count == max_count {
            return Some(val.to_string());
        }
    }
    None
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value, as Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let filled: Vec<Option<f64>> = float_series
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Series with a text value; the result is a String Series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.cast(&DataType::String)?;
    let filled: Vec<Option<String>> = str_series
        .str()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
