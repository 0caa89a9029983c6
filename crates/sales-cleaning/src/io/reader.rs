//! Loader: delimited file with a configured text encoding into a DataFrame.

use crate::config::PipelineConfig;
use crate::error::{CleaningError, Result};
use encoding_rs::Encoding;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Look up an encoding by its WHATWG label (`cp1252`, `latin1`, `utf-8`, ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CleaningError::UnknownEncoding(label.to_string()))
}

/// Reads delimited files into DataFrames.
///
/// No schema validation happens here: column presence is checked by the
/// steps that use a column.
#[derive(Debug, Clone)]
pub struct DatasetReader {
    encoding: &'static Encoding,
    delimiter: u8,
    missing_markers: Vec<String>,
    infer_schema_length: Option<usize>,
}

impl DatasetReader {
    /// Create a reader for comma separated input in the given encoding.
    pub fn new(encoding_label: &str) -> Result<Self> {
        Ok(Self {
            encoding: resolve_encoding(encoding_label)?,
            delimiter: b',',
            missing_markers: Vec::new(),
            infer_schema_length: None,
        })
    }

    /// Create a reader from the pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(&config.input_encoding)?
            .with_delimiter(config.delimiter_byte())
            .with_missing_markers(config.missing_markers.clone())
            .with_infer_schema_length(config.infer_schema_length))
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_missing_markers(mut self, markers: Vec<String>) -> Self {
        self.missing_markers = markers;
        self
    }

    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Name of the encoding this reader decodes.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Read and parse a file.
    pub fn read(&self, path: &Path) -> Result<DataFrame> {
        info!("Loading dataset from: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| CleaningError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Read {} bytes, decoding as {}", bytes.len(), self.encoding_name());

        let df = self.read_bytes(&bytes, path)?;
        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }

    /// Decode and parse raw file content; `origin` is only used in error messages.
    pub fn read_bytes(&self, bytes: &[u8], origin: &Path) -> Result<DataFrame> {
        let text = self.decode(bytes, origin)?;

        let null_values = NullValues::AllColumns(
            self.missing_markers
                .iter()
                .map(|marker| marker.as_str().into())
                .collect(),
        );
        let parse_options = CsvParseOptions::default()
            .with_separator(self.delimiter)
            .with_quote_char(Some(b'"'))
            .with_null_values(Some(null_values));

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_options)
            .into_reader_with_file_handle(Cursor::new(text))
            .finish()
            .map_err(|e| CleaningError::Read {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Strict decode: malformed input is an error, never replaced.
    fn decode(&self, bytes: &[u8], origin: &Path) -> Result<String> {
        let body = match Encoding::for_bom(bytes) {
            Some((bom_encoding, bom_len)) if bom_encoding == self.encoding => &bytes[bom_len..],
            _ => bytes,
        };

        self.encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
            .ok_or_else(|| CleaningError::Decode {
                path: origin.to_path_buf(),
                encoding: self.encoding.name().to_string(),
            })
    }
}
