use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

static FILE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"AvanceVentasINTI\.([0-9]{4})\.([0-9]{2})\.([0-9]{2})")
        .expect("file date pattern is valid")
});

/// Year, month and day as written in the filename, zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDate {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl ParsedDate {
    /// `None` when the digits do not form a calendar date (e.g. `2024.13.40`).
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            self.year.parse().ok()?,
            self.month.parse().ok()?,
            self.day.parse().ok()?,
        )
    }
}

/// Finds `AvanceVentasINTI.YYYY.MM.DD` anywhere in `filename`.
pub fn extract_date_from_filename(filename: &str) -> Option<ParsedDate> {
    let caps = FILE_DATE.captures(filename)?;
    let date = ParsedDate {
        year: caps[1].to_string(),
        month: caps[2].to_string(),
        day: caps[3].to_string(),
    };
    if date.to_naive_date().is_none() {
        warn!(filename, "filename date is not a calendar date, keeping it as written");
    }
    Some(date)
}
