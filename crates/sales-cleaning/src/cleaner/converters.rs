//! Coerce-or-missing conversions used by the type normalizer.

use crate::utils::{is_datetime_dtype, is_numeric_dtype, parse_numeric_string};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Datetime layouts tried in order, with a time part.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts tried in order; the time is midnight.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%B %d, %Y"];

/// Target dtype of coerced date columns.
pub(crate) const DATETIME_DTYPE: DataType = DataType::Datetime(TimeUnit::Milliseconds, None);

/// Parse one cell as a timestamp in milliseconds since the epoch.
pub(crate) fn parse_datetime_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().and_utc().timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
    })
}

/// Convert a series to Float64; entries that do not parse become null.
pub(crate) fn to_float(series: &Series) -> PolarsResult<Series> {
    if is_numeric_dtype(series.dtype()) {
        return series.cast(&DataType::Float64);
    }

    let str_series = series.cast(&DataType::String)?;
    let values: Vec<Option<f64>> = str_series
        .str()?
        .into_iter()
        .map(|opt| opt.and_then(parse_numeric_string))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Convert a series to `Datetime(ms)`; entries that do not parse become null.
pub(crate) fn to_datetime(series: &Series) -> PolarsResult<Series> {
    match series.dtype() {
        dtype if is_datetime_dtype(dtype) => series.cast(&DATETIME_DTYPE),
        _ => {
            let str_series = series.cast(&DataType::String)?;
            let timestamps: Vec<Option<i64>> = str_series
                .str()?
                .into_iter()
                .map(|opt| opt.and_then(parse_datetime_millis))
                .collect();

            Series::new(series.name().clone(), timestamps).cast(&DATETIME_DTYPE)
        }
    }
}
