use calamine::{Data, Range};

use crate::dataset::Cell;
use crate::error::FileError;
use crate::process::date_parser::ParsedDate;
use crate::process::utils::{cell_from_data, header_text};
use crate::range::ColumnRange;

/// The selected block of one worksheet, before harmonization.
#[derive(Debug)]
pub struct RawTable {
    /// File name the rows came from.
    pub source: String,
    /// One entry per column read; blank when there is no header row.
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` wide.
    pub rows: Vec<Vec<Cell>>,
    pub date: Option<ParsedDate>,
}

impl RawTable {
    /// Cut `columns` out of `sheet`, starting at zero-based `first_row`.
    ///
    /// Only columns that exist in the sheet are read, so a sheet narrower than
    /// the range yields a narrower table. Rows with no value in any selected
    /// column are dropped; the header is the first row that has one.
    pub fn from_range(
        source: &str,
        sheet: &Range<Data>,
        columns: ColumnRange,
        first_row: u32,
        has_header: bool,
    ) -> Result<Self, FileError> {
        let (last_row, last_col) = sheet
            .end()
            .ok_or_else(|| FileError::NoColumnsInRange(columns.to_string()))?;
        if last_col < columns.start() {
            return Err(FileError::NoColumnsInRange(columns.to_string()));
        }
        let stop = last_col.min(columns.end());
        let width = (stop - columns.start()) as usize + 1;

        let is_blank = |r: u32| {
            (columns.start()..=stop)
                .all(|c| sheet.get_value((r, c)).and_then(cell_from_data).is_none())
        };

        let mut row_numbers = first_row..=last_row;
        let headers = if has_header {
            match row_numbers.find(|&r| !is_blank(r)) {
                Some(r) => (columns.start()..=stop)
                    .map(|c| header_text(sheet.get_value((r, c))))
                    .collect(),
                None => vec![String::new(); width],
            }
        } else {
            vec![String::new(); width]
        };

        let rows = row_numbers
            .map(|r| {
                (columns.start()..=stop)
                    .map(|c| sheet.get_value((r, c)).and_then(cell_from_data))
                    .collect::<Vec<Cell>>()
            })
            .filter(|row| row.iter().any(Option::is_some))
            .collect();

        Ok(Self {
            source: source.to_string(),
            headers,
            rows,
            date: None,
        })
    }

    /// Number of data columns read.
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}
