// src/export.rs

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use tracing::{info, instrument};

use crate::dataset::{CellValue, Dataset};
use crate::error::{EtlError, Result};

/// File name of the consolidated workbook.
pub const OUTPUT_FILE: &str = "Out.xlsx";

/// Write `dataset` as a single worksheet: a bold header row, then one row per record.
/// Null cells stay blank. An existing file at `path` is replaced.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let to_err = |source: XlsxError| EtlError::Export {
        path: path.to_path_buf(),
        source,
    };

    if dataset.num_columns() > u16::MAX as usize || dataset.num_rows() >= u32::MAX as usize {
        return Err(EtlError::Input(format!(
            "{} x {} does not fit in a worksheet",
            dataset.num_rows(),
            dataset.num_columns()
        )));
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").map_err(to_err)?;

    for (c, name) in dataset.columns().iter().enumerate() {
        sheet
            .write_string_with_format(0, c as u16, name, &bold)
            .map_err(to_err)?;
    }

    for (r, row) in dataset.rows().iter().enumerate() {
        let r = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                None => continue,
                Some(CellValue::Text(s)) => sheet.write_string(r, c, s),
                Some(CellValue::Int(i)) => sheet.write_number(r, c, *i as f64),
                Some(CellValue::Number(n)) => sheet.write_number(r, c, *n),
                Some(CellValue::Bool(b)) => sheet.write_boolean(r, c, *b),
                Some(v @ CellValue::Date(serial)) => {
                    let format = if v.has_time() { &datetime } else { &date };
                    sheet.write_number_with_format(r, c, *serial, format)
                }
            }
            .map_err(to_err)?;
        }
    }

    workbook.save(path).map_err(to_err)?;
    info!(
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        "wrote consolidated workbook"
    );
    Ok(())
}
