//! Custom error types for the cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Per-cell parse
//! failures are never errors: they turn into nulls inside the Type Normalizer.
//! Everything represented here is fatal and ends the run.
//!
//! Errors are serializable as `{ code, message }` so a summary consumer can
//! handle them without matching on display strings.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Input file is missing or could not be read.
    #[error("Failed to read '{}': {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// Input bytes are not valid in the configured text encoding.
    #[error("Failed to decode '{}' as {encoding}", path.display())]
    Decode { path: PathBuf, encoding: String },

    /// The configured encoding label is not a known encoding.
    #[error("Unknown text encoding '{0}'")]
    UnknownEncoding(String),

    /// Output file could not be written.
    #[error("Failed to write '{}': {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// A declared column has no non-missing values, so its median or mode is undefined.
    #[error("Cannot compute {statistic} for column '{column}': every value is missing")]
    ImputationUndefined { column: String, statistic: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "READ_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::UnknownEncoding(_) => "UNKNOWN_ENCODING",
            Self::Write { .. } => "WRITE_ERROR",
            Self::ImputationUndefined { .. } => "IMPUTATION_UNDEFINED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error happened while loading input, before any processing.
    pub fn is_read_failure(&self) -> bool {
        match self {
            Self::Read { .. } | Self::Decode { .. } | Self::UnknownEncoding(_) => true,
            Self::WithContext { source, .. } => source.is_read_failure(),
            _ => false,
        }
    }

    /// Check if this error happened while persisting output, after processing.
    pub fn is_write_failure(&self) -> bool {
        match self {
            Self::Write { .. } => true,
            Self::WithContext { source, .. } => source.is_write_failure(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
