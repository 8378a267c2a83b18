// src/run.rs

use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing::{error, info};

use crate::chart::{render_charts, ChartPaths};
use crate::config::Config;
use crate::error::Result;
use crate::export::{write_dataset, OUTPUT_FILE};
use crate::process::{consolidate, Progress, SkippedFile, SourceFile};

/// Outcome of one run, printed by the CLI.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub files: usize,
    pub rows: usize,
    pub columns: usize,
    pub skipped: Vec<SkippedFile>,
    /// `None` when no file contributed rows; nothing is written then.
    pub output: Option<PathBuf>,
    pub charts: Option<ChartPaths>,
    /// Set when the workbook was written but the charts were not.
    pub chart_error: Option<String>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.output.is_none()
    }
}

/// Parse options, consolidate `files`, write `Out.xlsx` and the charts.
///
/// Range and option errors are returned before any file is read. A chart
/// failure is recorded in the report and leaves the workbook in place.
pub fn run<F>(config: &Config, files: &[SourceFile], on_progress: F) -> Result<RunReport>
where
    F: FnMut(Progress<'_>),
{
    let options = config.consolidate_options()?;
    let consolidation = consolidate(files, &options, on_progress)?;
    let dataset = consolidation.dataset;

    let mut report = RunReport {
        files: files.len(),
        rows: dataset.num_rows(),
        columns: dataset.num_columns(),
        skipped: consolidation.skipped,
        output: None,
        charts: None,
        chart_error: None,
    };

    if dataset.is_empty() {
        info!("no data produced, nothing written");
        return Ok(report);
    }

    fs::create_dir_all(&config.output_dir)?;
    let output = config.output_dir.join(OUTPUT_FILE);
    write_dataset(&dataset, &output)?;
    report.output = Some(output);

    if config.charts {
        match render_charts(&dataset, &config.output_dir) {
            Ok(paths) => report.charts = Some(paths),
            Err(e) => {
                error!(error = %e, "chart generation failed");
                report.chart_error = Some(e.to_string());
            }
        }
    }
    Ok(report)
}
