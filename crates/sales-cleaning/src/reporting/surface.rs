//! Render surfaces that receive finished charts.

use super::charts::Chart;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for charts.
///
/// A failing surface never stops the pipeline; the driver logs the error
/// and moves on.
pub trait RenderSurface {
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

/// Writes each chart as pretty-printed JSON to `<dir>/<slug>.json`.
#[derive(Debug, Clone)]
pub struct JsonChartSurface {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonChartSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RenderSurface for JsonChartSurface {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", chart.slug()));
        let json = serde_json::to_string_pretty(chart)?;
        fs::write(&path, json)?;

        debug!(
            "Rendered {} '{}' to {}",
            chart.data.kind(),
            chart.title,
            path.display()
        );
        self.written.push(path);
        Ok(())
    }
}

/// Discards every chart.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render(&mut self, _chart: &Chart) -> Result<()> {
        Ok(())
    }
}
