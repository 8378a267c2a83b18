use calamine::Data;
use tracing::debug;

use crate::dataset::{Cell, CellValue};

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Map a calamine cell onto our nullable cell. Text is kept as written;
/// empty strings and error cells become `None`.
pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Int(*i)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Date(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => {
            debug!(error = ?e, "error cell read as empty");
            None
        }
    }
}

/// Trimmed header text for a cell; empty when the cell is blank.
pub fn header_text(data: Option<&Data>) -> String {
    data.and_then(cell_from_data)
        .map(|v| v.to_string().trim().to_string())
        .unwrap_or_default()
}
