//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! Defaults reproduce the fixed values of the sales cleaning job: a
//! `cp1252` encoded `sales_data.csv`, the sales column roles, a 3σ outlier
//! bound on `SALES` and a UTF-8 `sales_data_cleaned_visuals.csv` output.

use crate::error::{CleaningError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default input file.
pub const DEFAULT_INPUT_PATH: &str = "sales_data.csv";
/// Default output file.
pub const DEFAULT_OUTPUT_PATH: &str = "sales_data_cleaned_visuals.csv";
/// Default input encoding label.
pub const DEFAULT_INPUT_ENCODING: &str = "cp1252";
/// Default output encoding label.
pub const DEFAULT_OUTPUT_ENCODING: &str = "utf-8";
/// Default outlier bound multiplier.
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

/// Cell contents read as missing by the loader.
/// Empty fields are always missing.
pub const DEFAULT_MISSING_MARKERS: [&str; 20] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "NAN", "#n/a",
];

/// What to do when a declared numeric or categorical column has no values at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmptyColumnPolicy {
    /// Abort the run with `ImputationUndefined`.
    #[default]
    Fail,
    /// Log a warning and leave the column entirely missing.
    LeaveMissing,
}

/// Roles of the columns the pipeline touches.
///
/// Columns not named here are carried through untouched (they still take
/// part in duplicate detection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    /// Numeric columns imputed with their median.
    pub numeric: Vec<String>,
    /// Numeric columns coerced to Float64 by the type normalizer.
    pub coerce_numeric: Vec<String>,
    /// Categorical columns imputed with their mode.
    pub categorical: Vec<String>,
    /// Column parsed into a datetime.
    pub date: Option<String>,
    /// Column used by the outlier filter and the distribution charts.
    pub outlier_target: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self::sales()
    }
}

impl ColumnRoles {
    /// Column roles of the sales dataset.
    pub fn sales() -> Self {
        Self {
            numeric: to_strings(&["QUANTITYORDERED", "PRICEEACH", "SALES", "MSRP"]),
            coerce_numeric: to_strings(&["QUANTITYORDERED", "PRICEEACH", "SALES"]),
            categorical: to_strings(&["PRODUCTLINE", "COUNTRY", "DEALSIZE"]),
            date: Some("ORDERDATE".to_string()),
            outlier_target: "SALES".to_string(),
        }
    }

    /// Every column name referenced by any role.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let all = self
            .numeric
            .iter()
            .chain(&self.coerce_numeric)
            .chain(&self.categorical)
            .chain(self.date.iter())
            .chain(std::iter::once(&self.outlier_target));
        for name in all {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_cleaning::config::{EmptyColumnPolicy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .input_path("data/sales.csv")
///     .input_encoding("latin1")
///     .empty_column_policy(EmptyColumnPolicy::LeaveMissing)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delimited input file.
    pub input_path: PathBuf,

    /// Destination of the cleaned table.
    pub output_path: PathBuf,

    /// Encoding label of the input file (WHATWG label, e.g. `cp1252`).
    /// Default: "cp1252"
    pub input_encoding: String,

    /// Encoding label of the output file.
    /// Default: "utf-8"
    pub output_encoding: String,

    /// Field delimiter, must be a single ASCII character.
    /// Default: ','
    pub delimiter: char,

    /// Cell contents read as missing.
    pub missing_markers: Vec<String>,

    /// Rows scanned for schema inference; `None` scans the whole file.
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// Column roles.
    pub columns: ColumnRoles,

    /// Multiplier of the standard deviation in the outlier bound.
    /// Default: 3.0
    pub outlier_sigma: f64,

    /// Policy for columns whose values are all missing.
    /// Default: Fail
    pub empty_column_policy: EmptyColumnPolicy,

    /// Whether chart data is rendered before and after cleaning.
    /// Default: true
    pub render_charts: bool,

    /// Directory receiving rendered charts.
    /// Default: "charts"
    pub charts_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            input_encoding: DEFAULT_INPUT_ENCODING.to_string(),
            output_encoding: DEFAULT_OUTPUT_ENCODING.to_string(),
            delimiter: ',',
            missing_markers: to_strings(&DEFAULT_MISSING_MARKERS),
            infer_schema_length: None,
            columns: ColumnRoles::default(),
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            empty_column_policy: EmptyColumnPolicy::default(),
            render_charts: true,
            charts_dir: PathBuf::from("charts"),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CleaningError::InvalidConfig(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Field delimiter as a byte.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        for (field, label) in [
            ("input_encoding", &self.input_encoding),
            ("output_encoding", &self.output_encoding),
        ] {
            if encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_none() {
                return Err(ConfigValidationError::UnknownEncoding {
                    field: field.to_string(),
                    label: label.clone(),
                });
            }
        }

        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '"' {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        if !self.outlier_sigma.is_finite() || self.outlier_sigma <= 0.0 {
            return Err(ConfigValidationError::InvalidOutlierSigma(self.outlier_sigma));
        }

        if self.columns.outlier_target.trim().is_empty() {
            return Err(ConfigValidationError::MissingOutlierTarget);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Unknown encoding for '{field}': '{label}'")]
    UnknownEncoding { field: String, label: String },

    #[error("Invalid delimiter {0:?} (must be a single ASCII character other than quote or newline)")]
    InvalidDelimiter(char),

    #[error("Invalid outlier sigma: {0} (must be a positive finite number)")]
    InvalidOutlierSigma(f64),

    #[error("An outlier target column must be configured")]
    MissingOutlierTarget,
}

impl From<ConfigValidationError> for CleaningError {
    fn from(e: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    input_encoding: Option<String>,
    output_encoding: Option<String>,
    delimiter: Option<char>,
    missing_markers: Option<Vec<String>>,
    infer_schema_length: Option<Option<usize>>,
    columns: Option<ColumnRoles>,
    outlier_sigma: Option<f64>,
    empty_column_policy: Option<EmptyColumnPolicy>,
    render_charts: Option<bool>,
    charts_dir: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    /// Set the input file.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output file.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the input encoding label.
    pub fn input_encoding(mut self, label: impl Into<String>) -> Self {
        self.input_encoding = Some(label.into());
        self
    }

    /// Set the output encoding label.
    pub fn output_encoding(mut self, label: impl Into<String>) -> Self {
        self.output_encoding = Some(label.into());
        self
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Replace the set of cell contents read as missing.
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Limit schema inference to the first `rows` rows (`None` scans everything).
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the column roles.
    pub fn columns(mut self, columns: ColumnRoles) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the multiplier of the standard deviation in the outlier bound.
    pub fn outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = Some(sigma);
        self
    }

    /// Set the policy for entirely missing columns.
    pub fn empty_column_policy(mut self, policy: EmptyColumnPolicy) -> Self {
        self.empty_column_policy = Some(policy);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set the directory receiving rendered charts.
    pub fn charts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.charts_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            input_encoding: self.input_encoding.unwrap_or(defaults.input_encoding),
            output_encoding: self.output_encoding.unwrap_or(defaults.output_encoding),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            missing_markers: self.missing_markers.unwrap_or(defaults.missing_markers),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            columns: self.columns.unwrap_or(defaults.columns),
            outlier_sigma: self.outlier_sigma.unwrap_or(defaults.outlier_sigma),
            empty_column_policy: self
                .empty_column_policy
                .unwrap_or(defaults.empty_column_policy),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            charts_dir: self.charts_dir.unwrap_or(defaults.charts_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_path, PathBuf::from("sales_data.csv"));
        assert_eq!(config.input_encoding, "cp1252");
        assert_eq!(config.output_encoding, "utf-8");
        assert_eq!(config.outlier_sigma, 3.0);
        assert_eq!(config.empty_column_policy, EmptyColumnPolicy::Fail);
        assert_eq!(config.columns.outlier_target, "SALES");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sales_roles() {
        let roles = ColumnRoles::sales();
        assert_eq!(roles.numeric.len(), 4);
        assert!(roles.numeric.contains(&"MSRP".to_string()));
        assert!(!roles.coerce_numeric.contains(&"MSRP".to_string()));
        assert_eq!(roles.date.as_deref(), Some("ORDERDATE"));
    }

    #[test]
    fn test_referenced_columns_are_unique() {
        let roles = ColumnRoles::sales();
        let referenced = roles.referenced_columns();
        assert_eq!(referenced.len(), 8);
        assert_eq!(referenced.iter().filter(|c| **c == "SALES").count(), 1);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .input_path("in.csv")
            .output_path("out.csv")
            .input_encoding("latin1")
            .delimiter(';')
            .outlier_sigma(2.5)
            .empty_column_policy(EmptyColumnPolicy::LeaveMissing)
            .render_charts(false)
            .build()
            .unwrap();

        assert_eq!(config.input_path, PathBuf::from("in.csv"));
        assert_eq!(config.delimiter_byte(), b';');
        assert_eq!(config.outlier_sigma, 2.5);
        assert_eq!(config.empty_column_policy, EmptyColumnPolicy::LeaveMissing);
        assert!(!config.render_charts);
    }

    #[test]
    fn test_validation_unknown_encoding() {
        let result = PipelineConfig::builder().input_encoding("ebcdic-xyz").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::UnknownEncoding { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_sigma() {
        let result = PipelineConfig::builder().outlier_sigma(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidOutlierSigma(_)
        ));

        let result = PipelineConfig::builder().outlier_sigma(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_delimiter() {
        let result = PipelineConfig::builder().delimiter('é').build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDelimiter('é')
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "input_path": "raw/orders.csv",
            "input_encoding": "latin1",
            "empty_column_policy": "LeaveMissing",
            "columns": { "outlier_target": "PRICEEACH" }
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.input_path, PathBuf::from("raw/orders.csv"));
        assert_eq!(config.empty_column_policy, EmptyColumnPolicy::LeaveMissing);
        assert_eq!(config.columns.outlier_target, "PRICEEACH");
        // Unspecified role lists keep the sales defaults
        assert_eq!(config.columns.categorical.len(), 3);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "outlier_sigma": -1.0 }"#).unwrap();

        let err = PipelineConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
