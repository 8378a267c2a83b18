// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a stage of the run.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("invalid column range `{input}`: {reason}")]
    InvalidRange { input: String, reason: String },

    #[error("start row must be 1 or greater, got {0}")]
    InvalidStartRow(u32),

    #[error("range {range} spans {found} columns but the schema expects {expected}")]
    SchemaMismatch {
        expected: usize,
        found: usize,
        range: String,
    },

    #[error("column `{0}` is missing from the consolidated data")]
    MissingChartField(&'static str),

    #[error("failed to render chart {path:?}: {message}")]
    ChartRender { path: PathBuf, message: String },

    #[error("failed to write {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub(crate) fn invalid_range(input: &str, reason: impl Into<String>) -> Self {
        EtlError::InvalidRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures of the chart step, which never undo the spreadsheet export.
    pub fn is_chart_error(&self) -> bool {
        matches!(
            self,
            EtlError::MissingChartField(_) | EtlError::ChartRender { .. }
        )
    }
}

/// Per-file failures. These are caught inside the consolidation loop and
/// turned into [`SkippedFile`](crate::process::SkippedFile) entries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FileError {
    #[error("cannot open workbook: {0}")]
    Open(String),

    #[error("worksheet `{0}` not found")]
    SheetNotFound(String),

    #[error("no columns inside range {0}")]
    NoColumnsInRange(String),

    #[error("cannot read worksheet: {0}")]
    Read(String),

    #[error("read {found} columns but the schema expects {expected}")]
    SchemaMismatch { expected: usize, found: usize },
}

pub type Result<T, E = EtlError> = std::result::Result<T, E>;
