//! Pipeline module.
//!
//! This module provides the cleaning pipeline driver and its outlier and
//! progress components.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::OutlierFilter;
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
