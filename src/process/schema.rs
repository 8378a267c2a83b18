use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EtlError, FileError, Result};
use crate::process::raw_table::RawTable;
use crate::process::utils::clean_str;
use crate::range::{column_letters, ColumnRange};

/// Data fields in source order, starting at the first column of the range.
pub const FIELD_NAMES: [&str; 13] = [
    "OFICINA", "CODIGO", "NOMBRE", "LINEA", "GRUPO", "PNG", "U", "VALOR", "U2", "VALOR2", "LV1",
    "VALORC", "LV2",
];

/// Filename date columns, appended after the data fields.
pub const DATE_FIELDS: [&str; 3] = ["Año", "Mes", "Día"];

/// How source columns are matched to field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Field `i` is source column `range.start + i`; the range must span every field.
    #[default]
    Strict,
    /// Name whatever was read by position; narrower data keeps fewer field names,
    /// wider data keeps its own headers past the last field.
    Positional,
}

impl SchemaPolicy {
    /// Checked before any file is opened.
    pub fn validate(&self, range: ColumnRange) -> Result<()> {
        match self {
            SchemaPolicy::Strict if range.width() != FIELD_NAMES.len() => {
                Err(EtlError::SchemaMismatch {
                    expected: FIELD_NAMES.len(),
                    found: range.width(),
                    range: range.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Under `Strict`, a sheet that ends before the last field is rejected
    /// instead of losing field names.
    pub fn check_width(&self, table: &RawTable) -> std::result::Result<(), FileError> {
        match self {
            SchemaPolicy::Strict if table.width() != FIELD_NAMES.len() => {
                Err(FileError::SchemaMismatch {
                    expected: FIELD_NAMES.len(),
                    found: table.width(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Warn when a header row disagrees with the field it is mapped to.
    pub fn check_headers(&self, table: &RawTable) {
        if *self != SchemaPolicy::Strict {
            return;
        }
        for (header, expected) in table.headers.iter().zip(FIELD_NAMES) {
            if !header.is_empty() && !clean_str(header).eq_ignore_ascii_case(expected) {
                warn!(
                    file = %table.source,
                    header = %header,
                    expected,
                    "header does not match expected field"
                );
            }
        }
    }
}

/// Final column names for `width` data columns plus the date columns.
///
/// Past the known fields, the first non-blank header seen at that position is
/// used, falling back to the source column letter.
pub fn column_names(width: usize, tables: &[RawTable], range: ColumnRange) -> Vec<String> {
    let mut names = Vec::with_capacity(width + DATE_FIELDS.len());
    for i in 0..width {
        let name = match FIELD_NAMES.get(i) {
            Some(field) => field.to_string(),
            None => tables
                .iter()
                .filter_map(|t| t.headers.get(i))
                .find(|h| !h.is_empty())
                .cloned()
                .unwrap_or_else(|| column_letters(range.start() + i as u32)),
        };
        names.push(name);
    }
    names.extend(DATE_FIELDS.iter().map(|s| s.to_string()));
    names
}
