pub mod analytics;
pub mod config;
pub mod friends;
pub mod interactions;
pub mod reminders;

use crate::error::{Error, Result};
use crate::mapper::parse_date;
use chrono::{Local, NaiveDate};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM-DD` or `today`
pub(crate) fn parse_day(raw: &str) -> Result<NaiveDate> {
    if raw.trim().eq_ignore_ascii_case("today") {
        return Ok(today());
    }
    parse_date(raw).ok_or_else(|| Error::InvalidInput(format!("expected a date like 2024-01-31, got {:?}", raw)))
}

pub(crate) fn parse_optional_day(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(parse_day).transpose()
}

/// One-line preview of free text
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
