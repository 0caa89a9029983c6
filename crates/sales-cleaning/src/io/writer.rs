//! Writer: DataFrame to a delimited file without a row-index column.

use super::reader::resolve_encoding;
use crate::config::PipelineConfig;
use crate::error::{CleaningError, Result};
use encoding_rs::Encoding;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Format used for datetime cells in the output.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serializes DataFrames as delimited text in a configured encoding.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    encoding: &'static Encoding,
    delimiter: u8,
}

impl DatasetWriter {
    /// Create a comma separated writer for the given encoding.
    pub fn new(encoding_label: &str) -> Result<Self> {
        Ok(Self {
            encoding: resolve_encoding(encoding_label)?,
            delimiter: b',',
        })
    }

    /// Create a writer from the pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(&config.output_encoding)?.with_delimiter(config.delimiter_byte()))
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Serialize and write `df` to `path`, replacing any existing file.
    pub fn write(&self, df: &mut DataFrame, path: &Path) -> Result<()> {
        let bytes = self.to_bytes(df).map_err(|e| CleaningError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, &bytes).map_err(|e| CleaningError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            "Wrote {} rows x {} columns to {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(())
    }

    /// Serialize `df` to encoded bytes: header row, no index column.
    pub fn to_bytes(&self, df: &mut DataFrame) -> Result<Vec<u8>> {
        let mut buffer: Vec<u8> = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .with_separator(self.delimiter)
            .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
            .finish(df)?;

        if self.encoding == encoding_rs::UTF_8 {
            return Ok(buffer);
        }

        let text = String::from_utf8(buffer).map_err(|e| {
            CleaningError::InvalidConfig(format!("serialized table is not UTF-8: {}", e))
        })?;
        let (encoded, _, had_unmappable) = self.encoding.encode(&text);
        if had_unmappable {
            return Err(CleaningError::InvalidConfig(format!(
                "table contains characters that cannot be represented in {}",
                self.encoding.name()
            )));
        }
        Ok(encoded.into_owned())
    }
}
