// src/process/mod.rs
pub mod date_parser;
pub mod raw_table;
pub mod schema;
pub mod utils;

use calamine::{open_workbook_auto, Reader};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::dataset::{Cell, CellValue, Dataset};
use crate::error::{EtlError, FileError, Result};
use crate::range::ColumnRange;

use date_parser::{extract_date_from_filename, ParsedDate};
use raw_table::RawTable;
use schema::SchemaPolicy;

/// Worksheet read from every input unless configured otherwise.
pub const DEFAULT_SHEET: &str = "ITEM_O";

/// One input workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name, used for date extraction and diagnostics.
    pub name: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

#[derive(Debug, Clone)]
pub struct ConsolidateOptions {
    pub columns: ColumnRange,
    /// 1-based; rows above it are skipped.
    pub start_row: u32,
    /// The first retained row holds headers, not data.
    pub has_header: bool,
    pub sheet: String,
    pub policy: SchemaPolicy,
}

impl ConsolidateOptions {
    pub fn new(columns: ColumnRange, start_row: u32) -> Self {
        Self {
            columns,
            start_row,
            has_header: true,
            sheet: DEFAULT_SHEET.to_string(),
            policy: SchemaPolicy::default(),
        }
    }

    /// Everything that can be rejected without touching a file.
    pub fn validate(&self) -> Result<()> {
        if self.start_row == 0 {
            return Err(EtlError::InvalidStartRow(self.start_row));
        }
        self.policy.validate(self.columns)
    }
}

/// Advisory progress: `processed` of `total` files done, `file` the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    pub processed: usize,
    pub total: usize,
    pub file: &'a str,
}

impl Progress<'_> {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }
}

/// A file that contributed no rows, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: FileError,
}

fn serialize_display<S: serde::Serializer>(e: &FileError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(e)
}

#[derive(Debug)]
pub struct Consolidation {
    pub dataset: Dataset,
    pub skipped: Vec<SkippedFile>,
}

/// Read the configured worksheet of each file, in order, and merge the rows.
///
/// Per-file failures are recorded in [`Consolidation::skipped`] and never stop
/// the batch. Only option validation errors are returned, before any I/O.
#[instrument(level = "info", skip_all, fields(files = files.len(), range = %options.columns))]
pub fn consolidate<F>(
    files: &[SourceFile],
    options: &ConsolidateOptions,
    mut on_progress: F,
) -> Result<Consolidation>
where
    F: FnMut(Progress<'_>),
{
    options.validate()?;

    let total = files.len();
    let mut tables = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (i, file) in files.iter().enumerate() {
        let loaded = load_sheet(file, options).and_then(|table| {
            options.policy.check_width(&table)?;
            Ok(table)
        });
        match loaded {
            Ok(table) => {
                info!(
                    file = %file.name,
                    rows = table.rows.len(),
                    columns = table.width(),
                    dated = table.date.is_some(),
                    "read worksheet"
                );
                options.policy.check_headers(&table);
                tables.push(table);
            }
            Err(error) => {
                warn!(file = %file.name, %error, "skipping file");
                skipped.push(SkippedFile {
                    name: file.name.clone(),
                    error,
                });
            }
        }
        on_progress(Progress {
            processed: i + 1,
            total,
            file: &file.name,
        });
    }

    let dataset = harmonize(tables, options.columns);
    info!(
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        skipped = skipped.len(),
        "consolidation finished"
    );
    Ok(Consolidation { dataset, skipped })
}

/// Open one workbook and cut the configured block out of its worksheet.
#[instrument(level = "debug", skip_all, fields(file = %file.name))]
pub fn load_sheet(file: &SourceFile, options: &ConsolidateOptions) -> Result<RawTable, FileError> {
    let mut workbook =
        open_workbook_auto(&file.path).map_err(|e| FileError::Open(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|n| n == &options.sheet) {
        return Err(FileError::SheetNotFound(options.sheet.clone()));
    }
    let sheet = workbook
        .worksheet_range(&options.sheet)
        .map_err(|e| FileError::Read(e.to_string()))?;
    debug!(size = ?sheet.get_size(), start = ?sheet.start(), "loaded worksheet");

    let mut table = RawTable::from_range(
        &file.name,
        &sheet,
        options.columns,
        options.start_row - 1,
        options.has_header,
    )?;
    table.date = extract_date_from_filename(&file.name);
    Ok(table)
}

/// Pad every table to the widest one, append the date columns and concatenate.
pub fn harmonize(tables: Vec<RawTable>, columns: ColumnRange) -> Dataset {
    if tables.is_empty() {
        return Dataset::empty();
    }
    let width = tables.iter().map(RawTable::width).max().unwrap_or(0);
    let names = schema::column_names(width, &tables, columns);

    let mut rows = Vec::with_capacity(tables.iter().map(|t| t.rows.len()).sum());
    for table in tables {
        let date = date_cells(table.date.as_ref());
        for mut row in table.rows {
            row.resize(width, None);
            row.extend(date.iter().cloned());
            rows.push(row);
        }
    }
    Dataset::new(names, rows)
}

fn date_cells(date: Option<&ParsedDate>) -> [Cell; 3] {
    match date {
        Some(d) => [
            Some(CellValue::Text(d.year.clone())),
            Some(CellValue::Text(d.month.clone())),
            Some(CellValue::Text(d.day.clone())),
        ],
        None => [None, None, None],
    }
}

/// Sort-stable list of `*.xlsx` files directly inside `dir`, skipping Excel lock files.
/// The extension matches in any case.
pub fn discover_workbooks(dir: &Path) -> Result<Vec<SourceFile>> {
    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy()))
        .join("*.xlsx")
        .to_string_lossy()
        .into_owned();
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };
    let paths =
        glob::glob_with(&pattern, options).map_err(|e| EtlError::Input(e.to_string()))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| EtlError::Input(e.to_string()))?;
        let file = SourceFile::from_path(path);
        if file.name.starts_with("~$") || !file.path.is_file() {
            continue;
        }
        files.push(file);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rust_xlsxwriter::Workbook;
    use std::{fs, path::Path};
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,ventas_etl::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Write a one-sheet workbook; blank strings are left as empty cells.
    fn write_workbook(dir: &Path, name: &str, sheet: &str, rows: &[Vec<&str>]) -> Result<SourceFile> {
        let path = dir.join(name);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *value)?;
                }
            }
        }
        workbook.save(&path)?;
        Ok(SourceFile::from_path(path))
    }

    fn header(width: usize) -> Vec<&'static str> {
        schema::FIELD_NAMES.iter().take(width).copied().collect()
    }

    fn positional(range: &str) -> ConsolidateOptions {
        let mut opts = ConsolidateOptions::new(range.parse().unwrap(), 1);
        opts.policy = SchemaPolicy::Positional;
        opts
    }

    fn text(s: &str) -> Cell {
        Some(CellValue::Text(s.to_string()))
    }

    #[test]
    fn zero_files_yield_empty_dataset() -> Result<()> {
        let opts = ConsolidateOptions::new("A:M".parse()?, 1);
        let out = consolidate(&[], &opts, |_| {})?;
        assert!(out.dataset.is_empty());
        assert_eq!(out.dataset.num_columns(), 0);
        assert!(out.skipped.is_empty());
        Ok(())
    }

    #[test]
    fn missing_sheet_is_skipped_and_batch_continues() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let rows = vec![header(13), vec!["O1", "C1", "N1", "L1", "G1"]];
        let files = vec![
            write_workbook(dir.path(), "a.xlsx", "Hoja1", &rows)?,
            write_workbook(dir.path(), "b.xlsx", DEFAULT_SHEET, &rows)?,
        ];

        let mut seen = Vec::new();
        let out = consolidate(&files, &ConsolidateOptions::new("A:M".parse()?, 1), |p| {
            seen.push((p.processed, p.total, p.file.to_string()))
        })?;

        assert_eq!(
            out.skipped,
            vec![SkippedFile {
                name: "a.xlsx".into(),
                error: FileError::SheetNotFound("ITEM_O".into()),
            }]
        );
        assert_eq!(out.dataset.num_rows(), 1);
        assert_eq!(
            seen,
            vec![(1, 2, "a.xlsx".to_string()), (2, 2, "b.xlsx".to_string())]
        );
        Ok(())
    }

    #[test]
    fn unreadable_file_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        let bad = dir.path().join("broken.xlsx");
        fs::write(&bad, b"definitely not a zip archive")?;
        let good = write_workbook(
            dir.path(),
            "good.xlsx",
            DEFAULT_SHEET,
            &[header(13), vec!["O1", "C1"]],
        )?;
        let missing = SourceFile::from_path(dir.path().join("gone.xlsx"));

        let files = vec![SourceFile::from_path(bad), missing, good];
        let out = consolidate(&files, &ConsolidateOptions::new("A:M".parse()?, 1), |_| {})?;

        assert_eq!(out.skipped.len(), 2);
        assert!(matches!(out.skipped[0].error, FileError::Open(_)));
        assert!(matches!(out.skipped[1].error, FileError::Open(_)));
        assert_eq!(out.dataset.num_rows(), 1);
        Ok(())
    }

    #[test]
    fn narrower_files_are_padded_with_nulls() -> Result<()> {
        let dir = tempdir()?;
        let wide = write_workbook(
            dir.path(),
            "wide.xlsx",
            DEFAULT_SHEET,
            &[header(5), vec!["O1", "C1", "N1", "L1", "G1"]],
        )?;
        let narrow = write_workbook(
            dir.path(),
            "narrow.xlsx",
            DEFAULT_SHEET,
            &[header(3), vec!["O2", "C2", "N2"], vec!["O3", "", "N3"]],
        )?;

        let out = consolidate(&[narrow, wide], &positional("A:M"), |_| {})?;
        let ds = out.dataset;

        assert_eq!(
            ds.columns(),
            ["OFICINA", "CODIGO", "NOMBRE", "LINEA", "GRUPO", "Año", "Mes", "Día"]
        );
        assert!(ds.rows().iter().all(|r| r.len() == 5 + 3));
        // file order is preserved: narrow first
        assert_eq!(
            ds.rows()[0],
            vec![text("O2"), text("C2"), text("N2"), None, None, None, None, None]
        );
        assert_eq!(ds.rows()[1][1], None);
        assert_eq!(ds.rows()[1][2], text("N3"));
        assert_eq!(ds.rows()[2][4], text("G1"));
        Ok(())
    }

    #[test]
    fn date_columns_are_null_for_undated_files() -> Result<()> {
        let dir = tempdir()?;
        let rows = vec![header(13), vec!["O1", "C1", "N1", "L1", "G1"]];
        let dated = write_workbook(
            dir.path(),
            "AvanceVentasINTI.2024.03.07.xlsx",
            DEFAULT_SHEET,
            &rows,
        )?;
        let undated = write_workbook(dir.path(), "report.xlsx", DEFAULT_SHEET, &rows)?;

        let out = consolidate(
            &[dated, undated],
            &ConsolidateOptions::new("A:M".parse()?, 1),
            |_| {},
        )?;
        let ds = out.dataset;
        assert_eq!(ds.num_columns(), 13 + 3);

        let year: Vec<&Cell> = ds.column("Año").unwrap().collect();
        let day: Vec<&Cell> = ds.column("Día").unwrap().collect();
        assert_eq!(year, vec![&text("2024"), &None]);
        assert_eq!(day, vec![&text("07"), &None]);
        Ok(())
    }

    #[test]
    fn start_row_skips_preamble() -> Result<()> {
        let dir = tempdir()?;
        let file = write_workbook(
            dir.path(),
            "f.xlsx",
            DEFAULT_SHEET,
            &[
                vec!["Reporte de ventas"],
                vec![],
                vec!["", "OFICINA", "CODIGO"],
                vec!["", "O1", "C1"],
                vec!["", "O2", "C2"],
            ],
        )?;
        let mut opts = positional("B:C");
        opts.start_row = 3;

        let out = consolidate(&[file], &opts, |_| {})?;
        let oficina: Vec<&Cell> = out.dataset.column("OFICINA").unwrap().collect();
        assert_eq!(oficina, vec![&text("O1"), &text("O2")]);
        Ok(())
    }

    #[test]
    fn extra_columns_keep_their_headers() -> Result<()> {
        let dir = tempdir()?;
        let mut head = header(13);
        head.push("COMENTARIO");
        let mut data = vec!["x"; 13];
        data.push("nota");
        let file = write_workbook(dir.path(), "f.xlsx", DEFAULT_SHEET, &[head, data])?;

        let out = consolidate(&[file], &positional("A:N"), |_| {})?;
        assert_eq!(out.dataset.columns()[13], "COMENTARIO");
        assert_eq!(out.dataset.columns()[14], "Año");
        assert_eq!(out.dataset.rows()[0][13], text("nota"));
        Ok(())
    }

    #[test]
    fn options_are_checked_before_reading() -> Result<()> {
        let missing = [SourceFile::from_path("/nonexistent/dir/x.xlsx")];

        let err = consolidate(&missing, &ConsolidateOptions::new("A:O".parse()?, 1), |_| {})
            .unwrap_err();
        assert!(matches!(err, EtlError::SchemaMismatch { .. }));

        let mut opts = positional("A:O");
        opts.start_row = 0;
        let err = consolidate(&missing, &opts, |_| panic!("no file should be read")).unwrap_err();
        assert!(matches!(err, EtlError::InvalidStartRow(0)));
        Ok(())
    }

    #[test]
    fn discovers_xlsx_in_name_order() -> Result<()> {
        let dir = tempdir()?;
        for name in ["b.xlsx", "a.xlsx", "~$a.xlsx", "notes.txt"] {
            fs::write(dir.path().join(name), b"")?;
        }
        let names: Vec<String> = discover_workbooks(dir.path())?
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.xlsx"]);
        Ok(())
    }

    #[test]
    fn discovery_handles_glob_characters_and_upper_case() -> Result<()> {
        let root = tempdir()?;
        let dir = root.path().join("ventas [2024]?*");
        fs::create_dir(&dir)?;
        for name in ["b.xlsx", "A.XLSX", "c.csv"] {
            fs::write(dir.join(name), b"")?;
        }
        // a sibling the unescaped pattern `ventas [2024]?*` would also match
        let decoy = root.path().join("ventas 2x");
        fs::create_dir(&decoy)?;
        fs::write(decoy.join("x.xlsx"), b"")?;

        let names: Vec<String> = discover_workbooks(&dir)?
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["A.XLSX", "b.xlsx"]);
        Ok(())
    }

    #[test]
    fn strict_skips_sheets_narrower_than_the_schema() -> Result<()> {
        let dir = tempdir()?;
        let narrow = write_workbook(
            dir.path(),
            "narrow.xlsx",
            DEFAULT_SHEET,
            &[header(3), vec!["O1", "C1", "N1"]],
        )?;

        let out = consolidate(&[narrow], &ConsolidateOptions::new("A:M".parse()?, 1), |_| {})?;
        assert!(out.dataset.is_empty());
        assert_eq!(
            out.skipped,
            vec![SkippedFile {
                name: "narrow.xlsx".into(),
                error: FileError::SchemaMismatch {
                    expected: 13,
                    found: 3
                },
            }]
        );
        Ok(())
    }

    #[test]
    fn blank_leading_row_is_not_the_header() -> Result<()> {
        let dir = tempdir()?;
        let mut data = vec!["O1", "C1", "N1", "L1", "G1"];
        data.resize(13, "x");
        let file = write_workbook(
            dir.path(),
            "f.xlsx",
            DEFAULT_SHEET,
            &[vec![], header(13), data],
        )?;

        let out = consolidate(&[file], &ConsolidateOptions::new("A:M".parse()?, 1), |_| {})?;
        assert_eq!(out.dataset.num_rows(), 1);
        let linea: Vec<&Cell> = out.dataset.column("LINEA").unwrap().collect();
        assert_eq!(linea, vec![&text("L1")]);
        Ok(())
    }

    #[test]
    fn quoted_text_survives_consolidation() -> Result<()> {
        let dir = tempdir()?;
        let file = write_workbook(
            dir.path(),
            "f.xlsx",
            DEFAULT_SHEET,
            &[header(2), vec!["\"Pack\"", "ACME 10\"\"\""]],
        )?;

        let out = consolidate(&[file], &positional("A:B"), |_| {})?;
        assert_eq!(out.dataset.rows()[0][0], text("\"Pack\""));
        assert_eq!(out.dataset.rows()[0][1], text("ACME 10\"\"\""));
        Ok(())
    }

    #[test]
    fn progress_percent() {
        let p = Progress {
            processed: 1,
            total: 4,
            file: "x",
        };
        assert_eq!(p.percent(), 25.0);
    }
}
