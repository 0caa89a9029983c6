//! Sales Data Cleaning Library
//!
//! A batch cleaning pipeline for tabular sales data built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs these steps strictly in order, passing the table by
//! ownership from one step to the next:
//!
//! - **Loading**: Delimited file in a configured text encoding (`cp1252` by default)
//! - **Deduplication**: Fully duplicated rows dropped, first occurrence kept
//! - **Imputation**: Median for numeric columns, mode for categorical columns
//! - **Type Normalization**: Date column to datetime, numeric columns to Float64
//! - **Outlier Filtering**: Rows above `mean + 3σ` of the target column dropped
//! - **Reporting**: Missing value matrices, histogram and box plot handed to a render surface
//! - **Writing**: Delimited file without an index column
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_cleaning::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("sales_data.csv")
//!     .output_path("sales_data_cleaned_visuals.csv")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Duplicates removed: {}", result.summary.duplicates_removed);
//! ```
//!
//! # In-memory use
//!
//! [`Pipeline::process`] runs the cleaning steps on a DataFrame without
//! touching the filesystem:
//!
//! ```rust,ignore
//! let (cleaned, summary) = Pipeline::builder().build()?.process(df)?;
//! ```
//!
//! # Column Roles
//!
//! Which columns are imputed, coerced and filtered is described by
//! [`ColumnRoles`]; the default is the sales dataset layout.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, TypeNormalizer};
pub use config::{
    ColumnRoles, ConfigValidationError, EmptyColumnPolicy, PipelineConfig, PipelineConfigBuilder,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use io::{DatasetReader, DatasetWriter};
pub use pipeline::{
    CleaningStage, ClosureProgressReporter, OutlierFilter, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::{Chart, ChartData, JsonChartSurface, NullSurface, RenderSurface};
pub use types::{
    CleaningSummary, CoercionRecord, DatasetOverview, FillStatistic, ImputationRecord,
    OutlierReport, PipelineResult,
};
