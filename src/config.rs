// src/config.rs

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{EtlError, Result};
use crate::process::{discover_workbooks, schema::SchemaPolicy, ConsolidateOptions, SourceFile, DEFAULT_SHEET};
use crate::range::ColumnRange;

/// Run settings, loaded from YAML and overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Workbooks given one by one, processed first and in this order.
    pub inputs: Vec<PathBuf>,
    /// Folder whose `*.xlsx` files are added after `inputs`, sorted by name.
    pub input_dir: Option<PathBuf>,
    /// Column span in letter notation, e.g. `A:M`.
    pub range: String,
    /// 1-based first row to read.
    pub start_row: u32,
    pub has_header: bool,
    pub sheet: String,
    pub output_dir: PathBuf,
    pub schema: SchemaPolicy,
    pub charts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            input_dir: None,
            range: "A:M".to_string(),
            start_row: 1,
            has_header: true,
            sheet: DEFAULT_SHEET.to_string(),
            output_dir: PathBuf::from("."),
            schema: SchemaPolicy::default(),
            charts: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&text).map_err(|source| EtlError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?config, path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn column_range(&self) -> Result<ColumnRange> {
        self.range.parse()
    }

    /// Parsed and validated consolidation options. No file is touched.
    pub fn consolidate_options(&self) -> Result<ConsolidateOptions> {
        let options = ConsolidateOptions {
            columns: self.column_range()?,
            start_row: self.start_row,
            has_header: self.has_header,
            sheet: self.sheet.clone(),
            policy: self.schema,
        };
        options.validate()?;
        Ok(options)
    }

    /// Explicit inputs first, then the folder listing.
    pub fn source_files(&self) -> Result<Vec<SourceFile>> {
        let mut files: Vec<SourceFile> = self.inputs.iter().map(SourceFile::from_path).collect();
        if let Some(dir) = &self.input_dir {
            if !dir.is_dir() {
                return Err(EtlError::Input(format!("{} is not a directory", dir.display())));
            }
            files.extend(discover_workbooks(dir)?);
        }
        Ok(files)
    }
}
