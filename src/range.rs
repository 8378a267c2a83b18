// src/range.rs

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::{EtlError, Result};

/// Inclusive, zero-based span of worksheet columns, parsed from `"A:O"` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRange {
    start: u32,
    end: u32,
}

impl ColumnRange {
    /// Build a range from zero-based indices. Errors if `start > end`.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            let text = format!("{}:{}", column_letters(start), column_letters(end));
            return Err(EtlError::invalid_range(&text, "start column is after end column"));
        }
        Ok(Self { start, end })
    }

    /// Parse `"<Letters>:<Letters>"`, case-insensitive.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.split(':');
        let (first, second) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => (a.trim(), b.trim()),
            (_, None, _) => return Err(EtlError::invalid_range(input, "expected `<from>:<to>`")),
            _ => return Err(EtlError::invalid_range(input, "more than one `:`")),
        };

        let start = column_index(first).map_err(|reason| EtlError::invalid_range(input, reason))?;
        let end = column_index(second).map_err(|reason| EtlError::invalid_range(input, reason))?;
        if start > end {
            return Err(EtlError::invalid_range(
                input,
                "start column is after end column",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn contains(&self, column: u32) -> bool {
        (self.start..=self.end).contains(&column)
    }
}

impl FromStr for ColumnRange {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", column_letters(self.start), column_letters(self.end))
    }
}

/// Bijective base-26 conversion of column letters to a zero-based index
/// (`A` → 0, `Z` → 25, `AA` → 26).
pub fn column_index(letters: &str) -> std::result::Result<u32, String> {
    if letters.is_empty() {
        return Err("empty column reference".into());
    }
    let mut value: u32 = 0;
    for ch in letters.chars() {
        let upper = ch.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(format!("`{}` is not a column letter", ch));
        }
        let digit = (upper as u8 - b'A') as u32 + 1;
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| format!("column `{}` is out of range", letters))?;
    }
    Ok(value - 1)
}

/// Zero-based index back to column letters (`0` → `A`, `26` → `AA`).
pub fn column_letters(index: u32) -> String {
    let mut n = index as u64 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}
