//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_cleaning::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run();
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Reading and decoding the input file
    Loading,
    /// Dropping fully duplicated rows
    Deduplication,
    /// Filling missing values with medians and modes
    Imputation,
    /// Coercing the date and numeric columns
    TypeNormalization,
    /// Dropping rows above the outlier bound
    OutlierFiltering,
    /// Handing charts to the render surface
    Rendering,
    /// Writing the cleaned file
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Deduplication => "Removing Duplicates",
            Self::Imputation => "Imputing Values",
            Self::TypeNormalization => "Normalizing Types",
            Self::OutlierFiltering => "Filtering Outliers",
            Self::Rendering => "Rendering Charts",
            Self::Writing => "Writing Output",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.20,
            Self::Deduplication => 0.10,
            Self::Imputation => 0.15,
            Self::TypeNormalization => 0.15,
            Self::OutlierFiltering => 0.10,
            Self::Rendering => 0.15,
            Self::Writing => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Deduplication => 0.20,
            Self::Imputation => 0.30,
            Self::TypeNormalization => 0.45,
            Self::OutlierFiltering => 0.60,
            Self::Rendering => 0.70,
            Self::Writing => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted at stage boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during cleaning.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const WORK_STAGES: [CleaningStage; 7] = [
        CleaningStage::Loading,
        CleaningStage::Deduplication,
        CleaningStage::Imputation,
        CleaningStage::TypeNormalization,
        CleaningStage::OutlierFiltering,
        CleaningStage::Rendering,
        CleaningStage::Writing,
    ];

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(CleaningStage::Imputation, 0.5, "Imputing");
        assert_eq!(update.stage, CleaningStage::Imputation);
        assert!((update.progress - 0.375).abs() < 1e-6);
        assert_eq!(update.stage_progress, 0.5);
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done");
        assert_eq!(update.stage, CleaningStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_stage_weights_sum() {
        let total: f32 = WORK_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0f32;
        for stage in WORK_STAGES {
            assert!((stage.base_progress() - expected).abs() < 1e-6, "{:?}", stage);
            expected += stage.weight();
        }
    }

    #[test]
    fn test_stage_display_name() {
        assert_eq!(CleaningStage::Loading.display_name(), "Loading Data");
        assert_eq!(CleaningStage::OutlierFiltering.display_name(), "Filtering Outliers");
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&CleaningStage::TypeNormalization).unwrap();
        assert_eq!(json, "\"type_normalization\"");
    }

    #[test]
    fn test_closure_progress_reporter() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&updates);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(CleaningStage::Loading, 0.0, "Loading"));
        reporter.report(ProgressUpdate::complete("Done"));

        let seen = updates.lock().unwrap();
        assert_eq!(*seen, vec![CleaningStage::Loading, CleaningStage::Complete]);
    }
}
