// src/dataset.rs

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A non-empty worksheet value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, fraction is the time of day).
    Date(f64),
}

impl CellValue {
    /// Serial date as a calendar date-time, if it is in range.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        let CellValue::Date(serial) = self else {
            return None;
        };
        if !serial.is_finite() {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let ms = (serial * 86_400_000.0).round();
        if ms.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        epoch.checked_add_signed(Duration::milliseconds(ms as i64))
    }

    /// A date with a non-zero time of day.
    pub fn has_time(&self) -> bool {
        matches!(self, CellValue::Date(serial) if serial.fract() != 0.0)
    }
}

/// `None` is an empty cell: blank in the source, or padding added during harmonization.
pub type Cell = Option<CellValue>;

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            // whole floats print like integers so "10" and 10.0 land in the same category
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(serial) => match self.as_datetime() {
                Some(dt) if self.has_time() => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d")),
                None => write!(f, "{}", serial),
            },
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// The consolidated table. Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Panics in debug builds if a row has the wrong width.
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// No rows were produced.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_normalises_whole_numbers() {
        assert_eq!(CellValue::Number(10.0).to_string(), "10");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Int(-3).to_string(), "-3");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::from("x").to_string(), "x");
    }

    #[test]
    fn dates_display_as_calendar_dates() {
        assert_eq!(CellValue::Date(45356.0).to_string(), "2024-03-05");
        assert_eq!(CellValue::Date(45356.5).to_string(), "2024-03-05 12:00:00");
        assert_eq!(CellValue::Date(f64::NAN).to_string(), "NaN");
        assert!(CellValue::Number(45356.0).as_datetime().is_none());
    }

    #[test]
    fn column_lookup() {
        let ds = Dataset::new(
            vec!["A".into(), "B".into()],
            vec![
                vec![Some("a1".into()), None],
                vec![Some("a2".into()), Some(CellValue::Int(1))],
            ],
        );
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.num_columns(), 2);
        let b: Vec<&Cell> = ds.column("B").unwrap().collect();
        assert_eq!(b, vec![&None, &Some(CellValue::Int(1))]);
        assert!(ds.column("C").is_none());
        assert!(Dataset::empty().is_empty());
    }
}
