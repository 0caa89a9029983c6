//! Row and type cleaning.
//!
//! This module provides:
//! - Duplicate row removal ([`DataCleaner`])
//! - Coerce-or-missing type normalization ([`TypeNormalizer`])

pub(crate) mod converters;
mod type_normalizer;

pub use type_normalizer::TypeNormalizer;

use crate::error::Result;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Removes fully duplicated records.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop rows whose values all equal an earlier row.
    ///
    /// The first occurrence is kept and row order is preserved. Missing
    /// values compare equal to each other. Returns the table and the number
    /// of rows dropped.
    pub fn remove_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
        info!("Removing duplicate rows...");
        let height = df.height();
        if height == 0 {
            return Ok((df, 0));
        }

        let columns: Vec<&Series> = df
            .get_columns()
            .iter()
            .map(|c| c.as_materialized_series())
            .collect();

        let mut seen: HashSet<String> = HashSet::with_capacity(height);
        let mut keep: Vec<bool> = Vec::with_capacity(height);
        for row in 0..height {
            let mut key = String::new();
            for series in &columns {
                key.push_str(&format!("{:?}\u{1f}", cell_key(series.get(row)?)));
            }
            keep.push(seen.insert(key));
        }

        let duplicates = keep.iter().filter(|k| !**k).count();
        if duplicates == 0 {
            debug!("No duplicate rows found");
            return Ok((df, 0));
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let df = df.filter(&mask)?;
        debug!("Removed {} duplicate rows", duplicates);
        Ok((df, duplicates))
    }
}

/// `-0.0` and `0.0` are the same value for duplicate detection.
fn cell_key(value: AnyValue<'_>) -> AnyValue<'_> {
    match value {
        AnyValue::Float64(v) if v == 0.0 => AnyValue::Float64(0.0),
        AnyValue::Float32(v) if v == 0.0 => AnyValue::Float32(0.0),
        other => other,
    }
}
