//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for running
//! the load, clean, render and write sequence.

use crate::cleaner::{DataCleaner, TypeNormalizer};
use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::io::{DatasetReader, DatasetWriter};
use crate::pipeline::outliers::OutlierFilter;
use crate::pipeline::progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{
    Chart, JsonChartSurface, NullSurface, RenderSurface, after_cleaning_charts,
    before_cleaning_charts,
};
use crate::types::{CleaningSummary, DatasetOverview, PipelineResult};
use crate::utils::require_column;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sales_cleaning::{Pipeline, PipelineConfig};
///
/// let mut pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().input_path("sales.csv").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
///
/// let result = pipeline.run()?;
/// println!("{} rows written", result.summary.rows_after);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    surface: Box<dyn RenderSurface + Send>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the input file, clean it, render charts and write the output.
    pub fn run(&mut self) -> Result<PipelineResult> {
        match self.run_internal() {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Cleaned dataset saved as '{}'",
                    result.output_file
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Run the cleaning steps on an in-memory table.
    ///
    /// Deduplication, imputation, type normalization and outlier filtering,
    /// in that order. No file access and no rendering.
    pub fn process(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let start_time = Instant::now();
        let roles = &self.config.columns;

        let mut summary = CleaningSummary::new();
        summary.rows_loaded = df.height();
        summary.columns = df.width();
        summary.missing_before = DatasetOverview::from_frame(&df).total_missing();

        for name in roles.referenced_columns() {
            require_column(&df, name)?;
        }

        // Step 1: Deduplication
        self.stage_started(CleaningStage::Deduplication, "Removing duplicate rows...");
        let (df, duplicates) = DataCleaner::remove_duplicates(df).context("Deduplication failed")?;
        summary.duplicates_removed = duplicates;
        summary.add_step(format!("Number of duplicate rows: {}", duplicates));
        info!("Number of duplicate rows: {}", duplicates);
        self.stage_finished(CleaningStage::Deduplication, "Duplicates removed");

        // Step 2: Imputation
        self.stage_started(CleaningStage::Imputation, "Imputing missing values...");
        let (df, imputations) =
            StatisticalImputer::impute(df, roles, self.config.empty_column_policy)
                .context("Imputation failed")?;
        for record in &imputations {
            match &record.value {
                Some(value) => summary.add_step(format!(
                    "Filled {} missing values in '{}' with {}: {}",
                    record.filled, record.column, record.statistic, value
                )),
                None => summary.add_step(format!(
                    "Left '{}' missing: no values to compute a {} from",
                    record.column, record.statistic
                )),
            }
        }
        summary.imputations = imputations;
        self.stage_finished(CleaningStage::Imputation, "Missing values imputed");

        // Step 3: Type normalization
        self.stage_started(CleaningStage::TypeNormalization, "Fixing column types...");
        let (df, coercions) =
            TypeNormalizer::normalize(df, roles).context("Type normalization failed")?;
        for record in &coercions {
            summary.add_step(format!(
                "Converted '{}' to {} ({} unparsable values set to missing)",
                record.column, record.target, record.invalidated
            ));
        }
        summary.coercions = coercions;
        self.stage_finished(CleaningStage::TypeNormalization, "Column types fixed");

        // Step 4: Outlier filtering
        self.stage_started(CleaningStage::OutlierFiltering, "Removing outliers...");
        let (df, outliers) =
            OutlierFilter::filter(df, &roles.outlier_target, self.config.outlier_sigma)
                .context("Outlier filtering failed")?;
        summary.add_step(format!(
            "Outliers removed based on {} column: {} rows",
            outliers.column, outliers.rows_removed
        ));
        summary.outliers = Some(outliers);
        self.stage_finished(CleaningStage::OutlierFiltering, "Outliers removed");

        summary.rows_after = df.height();
        summary.missing_after = DatasetOverview::from_frame(&df).total_missing();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete: {} -> {} rows ({} removed)",
            summary.rows_loaded,
            summary.rows_after,
            summary.rows_removed()
        );
        Ok((df, summary))
    }

    fn run_internal(&mut self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        info!("Starting cleaning pipeline...");

        // Load
        self.stage_started(CleaningStage::Loading, "Loading dataset...");
        let reader = DatasetReader::from_config(&self.config)?;
        let df = reader.read(&self.config.input_path)?;
        let overview_before = DatasetOverview::from_frame(&df);
        log_overview("Initial dataset", &overview_before);
        self.stage_finished(CleaningStage::Loading, "Dataset loaded");

        let mut charts_rendered = self.render_all(before_cleaning_charts(&df));

        let (mut df, mut summary) = self.process(df)?;

        match after_cleaning_charts(&df, &self.config.columns.outlier_target) {
            Ok(charts) => charts_rendered.extend(self.render_all(charts)),
            Err(e) => warn!("Could not build post-cleaning charts: {}", e),
        }
        summary.charts_rendered = charts_rendered;

        // Write
        self.stage_started(CleaningStage::Writing, "Saving cleaned dataset...");
        let writer = DatasetWriter::from_config(&self.config)?;
        writer.write(&mut df, &self.config.output_path)?;
        summary.add_step(format!(
            "Cleaned dataset saved as '{}'",
            self.config.output_path.display()
        ));
        self.stage_finished(CleaningStage::Writing, "Cleaned dataset saved");

        let overview_after = DatasetOverview::from_frame(&df);
        log_overview("Cleaned dataset", &overview_after);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        Ok(PipelineResult {
            input_file: self.config.input_path.display().to_string(),
            output_file: self.config.output_path.display().to_string(),
            overview_before,
            overview_after,
            summary,
        })
    }

    /// Hand charts to the surface; failures are logged and skipped.
    fn render_all(&mut self, charts: Vec<Chart>) -> Vec<String> {
        let total = charts.len();
        let mut rendered = Vec::with_capacity(total);

        for (idx, chart) in charts.iter().enumerate() {
            self.report_progress(ProgressUpdate::new(
                CleaningStage::Rendering,
                idx as f32 / total.max(1) as f32,
                format!("Rendering '{}'", chart.title),
            ));
            match self.surface.render(chart) {
                Ok(()) => rendered.push(chart.title.clone()),
                Err(e) => warn!("Failed to render '{}': {}", chart.title, e),
            }
        }
        rendered
    }

    fn stage_started(&self, stage: CleaningStage, message: &str) {
        debug!("{}", stage.display_name());
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn stage_finished(&self, stage: CleaningStage, message: &str) {
        self.report_progress(ProgressUpdate::new(stage, 1.0, message));
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

fn log_overview(label: &str, overview: &DatasetOverview) {
    info!(
        "{}: {} rows x {} columns, {} missing values",
        label,
        overview.rows,
        overview.columns,
        overview.total_missing()
    );
    for col in &overview.column_overviews {
        debug!(
            "  {} ({}): {} non-null, {} null",
            col.name, col.dtype, col.non_null_count, col.null_count
        );
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    surface: Option<Box<dyn RenderSurface + Send>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the render surface.
    ///
    /// Without one, charts go to a [`JsonChartSurface`] in `charts_dir`, or
    /// nowhere when `render_charts` is off.
    pub fn surface(mut self, surface: Box<dyn RenderSurface + Send>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let surface: Box<dyn RenderSurface + Send> = match self.surface {
            Some(surface) => surface,
            None if config.render_charts => Box::new(JsonChartSurface::new(&config.charts_dir)),
            None => Box::new(NullSurface),
        };

        Ok(Pipeline {
            config,
            surface,
            progress_reporter: self.progress_reporter,
        })
    }
}
