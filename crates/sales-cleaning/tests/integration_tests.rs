//! Integration tests for the sales cleaning pipeline.
//!
//! These tests run the full load, clean, render and write sequence over the
//! CSV fixtures and check the written files.

use pretty_assertions::assert_eq;
use polars::prelude::*;
use sales_cleaning::{
    CleaningStage, ColumnRoles, DatasetReader, DatasetWriter, EmptyColumnPolicy, Pipeline,
    PipelineConfig, PipelineResult,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn config_for(input: &str, input_encoding: &str, dir: &TempDir) -> PipelineConfig {
    PipelineConfig::builder()
        .input_path(fixtures_path().join(input))
        .input_encoding(input_encoding)
        .output_path(dir.path().join("cleaned.csv"))
        .charts_dir(dir.path().join("charts"))
        .build()
        .unwrap()
}

fn run(config: PipelineConfig) -> sales_cleaning::CleaningResult<PipelineResult> {
    Pipeline::builder().config(config).build().unwrap().run()
}

fn read_output(path: &Path) -> DataFrame {
    DatasetReader::new("utf-8").unwrap().read(path).unwrap()
}

fn imputed_value(result: &PipelineResult, column: &str) -> Option<String> {
    result
        .summary
        .imputations
        .iter()
        .find(|r| r.column == column)
        .and_then(|r| r.value.clone())
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_sales_sample() {
    let dir = TempDir::new().unwrap();
    let result = run(config_for("sales_sample.csv", "utf-8", &dir)).unwrap();
    let summary = &result.summary;

    assert_eq!(summary.rows_loaded, 13);
    assert_eq!(summary.columns, 12);
    assert_eq!(summary.duplicates_removed, 2);
    assert_eq!(summary.outliers.as_ref().unwrap().rows_removed, 1);
    assert_eq!(summary.rows_after, 10);
    assert_eq!(summary.rows_removed(), 3);
    assert_eq!(result.overview_after.rows, 10);
    assert_eq!(result.overview_after.columns, 12);
}

#[test]
fn test_imputation_statistics() {
    let dir = TempDir::new().unwrap();
    let result = run(config_for("sales_sample.csv", "utf-8", &dir)).unwrap();

    assert_eq!(imputed_value(&result, "QUANTITYORDERED").as_deref(), Some("39"));
    assert_eq!(imputed_value(&result, "MSRP").as_deref(), Some("118"));
    // Motorcycles and Classic Cars both appear four times; Motorcycles gets there first
    assert_eq!(imputed_value(&result, "PRODUCTLINE").as_deref(), Some("Motorcycles"));
    assert_eq!(imputed_value(&result, "COUNTRY").as_deref(), Some("USA"));
    assert_eq!(imputed_value(&result, "DEALSIZE").as_deref(), Some("Medium"));
}

#[test]
fn test_coercion_invalidates_without_reimputing() {
    let dir = TempDir::new().unwrap();
    let result = run(config_for("sales_sample.csv", "utf-8", &dir)).unwrap();

    let invalidated: Vec<(String, usize)> = result
        .summary
        .coercions
        .iter()
        .map(|r| (r.column.clone(), r.invalidated))
        .collect();
    assert_eq!(
        invalidated,
        vec![
            ("ORDERDATE".to_string(), 1),
            ("QUANTITYORDERED".to_string(), 0),
            ("PRICEEACH".to_string(), 0),
            ("SALES".to_string(), 1),
        ]
    );

    // The unparsable SALES row is dropped by the outlier filter; the bad date stays missing
    assert_eq!(result.summary.missing_after, 1);
}

#[test]
fn test_output_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = config_for("sales_sample.csv", "utf-8", &dir);
    let output_path = config.output_path.clone();
    run(config).unwrap();

    let output = read_output(&output_path);
    let input = DatasetReader::new("utf-8")
        .unwrap()
        .read(&fixtures_path().join("sales_sample.csv"))
        .unwrap();

    assert_eq!(output.get_column_names(), input.get_column_names());
    assert_eq!(output.height(), 10);

    for col in ColumnRoles::sales().numeric.iter().chain(&ColumnRoles::sales().categorical) {
        assert_eq!(output.column(col).unwrap().null_count(), 0, "{}", col);
    }
    assert_eq!(output.column("ORDERDATE").unwrap().null_count(), 1);

    let first_customer = output.column("CUSTOMERNAME").unwrap().str().unwrap().get(0);
    assert_eq!(first_customer, Some("Land of Toys Inc."));
    let first_date = output.column("ORDERDATE").unwrap().str().unwrap().get(0);
    assert_eq!(first_date, Some("2003-02-24 00:00:00"));
}

#[test]
fn test_written_table_reads_back_unchanged() {
    let dir = TempDir::new().unwrap();
    let config = config_for("sales_sample.csv", "utf-8", &dir);
    let input = DatasetReader::from_config(&config)
        .unwrap()
        .read(&config.input_path)
        .unwrap();
    let pipeline = Pipeline::builder().config(config).build().unwrap();
    let (mut cleaned, _) = pipeline.process(input).unwrap();

    let path = dir.path().join("round_trip.csv");
    DatasetWriter::new("utf-8")
        .unwrap()
        .write(&mut cleaned, &path)
        .unwrap();
    let read_back = read_output(&path);

    assert_eq!(read_back.get_column_names(), cleaned.get_column_names());
    assert_eq!(read_back.height(), cleaned.height());

    for written in cleaned.get_columns() {
        let name = written.name().as_str();
        let expected = match written.dtype() {
            DataType::Datetime(_, _) => written
                .as_materialized_series()
                .datetime()
                .unwrap()
                .to_string("%Y-%m-%d %H:%M:%S")
                .unwrap()
                .into_series(),
            _ => written.as_materialized_series().clone(),
        };
        let actual = read_back.column(name).unwrap().as_materialized_series();

        assert_eq!(actual.dtype(), expected.dtype(), "{}", name);
        assert!(actual.equals_missing(&expected), "{} differs after reading back", name);
    }
}

#[test]
fn test_retained_sales_within_bound() {
    let dir = TempDir::new().unwrap();
    let config = config_for("sales_sample.csv", "utf-8", &dir);
    let output_path = config.output_path.clone();
    let result = run(config).unwrap();

    let bound = result.summary.outliers.unwrap().upper_bound.unwrap();
    let output = read_output(&output_path);
    let sales = output.column("SALES").unwrap().cast(&DataType::Float64).unwrap();
    assert!(sales.f64().unwrap().into_iter().flatten().all(|v| v <= bound));
}

#[test]
fn test_charts_written_as_json() {
    let dir = TempDir::new().unwrap();
    let result = run(config_for("sales_sample.csv", "utf-8", &dir)).unwrap();

    assert_eq!(result.summary.charts_rendered.len(), 4);
    for name in [
        "missing_values_before_cleaning",
        "sales_distribution_after_cleaning",
        "missing_values_after_cleaning",
        "sales_boxplot_after_cleaning",
    ] {
        let path = dir.path().join("charts").join(format!("{}.json", name));
        assert!(path.exists(), "missing chart {}", path.display());
    }

    let histogram: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("charts/sales_distribution_after_cleaning.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(histogram["data"]["type"], "histogram");
    assert_eq!(histogram["data"]["bins"].as_array().unwrap().len(), 50);
    assert_eq!(histogram["style"]["color"], "green");
}

#[test]
fn test_no_charts_when_disabled() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for("sales_sample.csv", "utf-8", &dir);
    config.render_charts = false;

    let result = run(config).unwrap();
    assert!(!dir.path().join("charts").exists());
    assert_eq!(result.summary.charts_rendered.len(), 4);
}

// ============================================================================
// Encoding Tests
// ============================================================================

#[test]
fn test_cp1252_input_written_as_utf8() {
    let dir = TempDir::new().unwrap();
    let config = config_for("sales_cp1252.csv", "cp1252", &dir);
    let output_path = config.output_path.clone();
    let result = run(config).unwrap();

    assert_eq!(result.summary.duplicates_removed, 1);
    assert_eq!(result.summary.rows_after, 6);
    assert_eq!(imputed_value(&result, "PRICEEACH").as_deref(), Some("100"));
    assert_eq!(imputed_value(&result, "PRODUCTLINE").as_deref(), Some("Vintage Cars"));

    let text = std::fs::read_to_string(&output_path).unwrap();
    assert!(text.contains("Café Lumière"));
    assert!(text.contains("España"));
}

#[test]
fn test_cp1252_output_encoding() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for("sales_cp1252.csv", "cp1252", &dir);
    config.output_encoding = "windows-1252".to_string();
    let output_path = config.output_path.clone();
    run(config).unwrap();

    let bytes = std::fs::read(&output_path).unwrap();
    assert!(bytes.windows(4).any(|w| w == b"Caf\xe9"));
    assert!(std::str::from_utf8(&bytes).is_err());
}

#[test]
fn test_wrong_encoding_is_decode_error() {
    let dir = TempDir::new().unwrap();
    let config = config_for("sales_cp1252.csv", "utf-8", &dir);
    let output_path = config.output_path.clone();

    let err = run(config).unwrap_err();
    assert_eq!(err.error_code(), "DECODE_ERROR");
    assert!(!output_path.exists());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_missing_input_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = run(config_for("does_not_exist.csv", "utf-8", &dir)).unwrap_err();
    assert_eq!(err.error_code(), "READ_ERROR");
    assert!(err.is_read_failure());
}

#[test]
fn test_declared_column_absent() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for("sales_sample.csv", "utf-8", &dir);
    config.columns.categorical.push("TERRITORY".to_string());

    let err = run(config).unwrap_err();
    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert!(err.to_string().contains("TERRITORY"));
}

#[test]
fn test_unwritable_output_is_write_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for("sales_sample.csv", "utf-8", &dir);
    config.output_path = dir.path().join("missing_dir").join("cleaned.csv");

    let err = run(config).unwrap_err();
    assert_eq!(err.error_code(), "WRITE_ERROR");
    assert!(err.is_write_failure());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("cleaning.json");
    let json = serde_json::json!({
        "input_path": fixtures_path().join("sales_sample.csv"),
        "input_encoding": "utf-8",
        "output_path": dir.path().join("from_json.csv"),
        "render_charts": false,
        "empty_column_policy": "LeaveMissing",
        "columns": {
            "numeric": ["QUANTITYORDERED", "SALES"],
            "coerce_numeric": ["SALES"],
            "categorical": ["COUNTRY"],
            "date": null,
            "outlier_target": "SALES"
        }
    });
    std::fs::write(&config_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let config = PipelineConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.empty_column_policy, EmptyColumnPolicy::LeaveMissing);
    assert_eq!(config.columns.date, None);
    assert_eq!(config.outlier_sigma, 3.0);

    let result = run(config).unwrap();
    assert_eq!(result.summary.imputations.len(), 3);
    assert_eq!(result.summary.coercions.len(), 1);
    assert!(dir.path().join("from_json.csv").exists());
}

// ============================================================================
// Progress Tests
// ============================================================================

#[test]
fn test_progress_stages_reported_in_order() {
    let dir = TempDir::new().unwrap();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);

    Pipeline::builder()
        .config(config_for("sales_sample.csv", "utf-8", &dir))
        .on_progress(move |update| {
            let mut seen = sink.lock().unwrap();
            if seen.last() != Some(&update.stage) {
                seen.push(update.stage);
            }
        })
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            CleaningStage::Loading,
            CleaningStage::Rendering,
            CleaningStage::Deduplication,
            CleaningStage::Imputation,
            CleaningStage::TypeNormalization,
            CleaningStage::OutlierFiltering,
            CleaningStage::Rendering,
            CleaningStage::Writing,
            CleaningStage::Complete,
        ]
    );
}

#[test]
fn test_failed_stage_reported() {
    let dir = TempDir::new().unwrap();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);

    let result = Pipeline::builder()
        .config(config_for("does_not_exist.csv", "utf-8", &dir))
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run();

    assert!(result.is_err());
    assert_eq!(stages.lock().unwrap().last(), Some(&CleaningStage::Failed));
}

#[test]
fn test_result_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let result = run(config_for("sales_sample.csv", "utf-8", &dir)).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["duplicates_removed"], 2);
    assert_eq!(json["summary"]["imputations"][0]["statistic"], "median");
    assert_eq!(json["overview_before"]["rows"], 13);
}
