//! Stored dates are compact `YYYYMMDD` strings; date inputs want `YYYY-MM-DD`.

use chrono::NaiveDate;

const COMPACT: &str = "%Y%m%d";
const DISPLAY: &str = "%Y-%m-%d";

/// Reformats a compact date for a date input. Values that are not a valid
/// compact date are returned unchanged.
pub fn to_display(stored: &str) -> String {
    let trimmed = stored.trim();
    if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return stored.to_string();
    }
    match NaiveDate::parse_from_str(trimmed, COMPACT) {
        Ok(date) => date.format(DISPLAY).to_string(),
        Err(_) => stored.to_string(),
    }
}

pub fn to_compact(display: &str) -> String {
    match NaiveDate::parse_from_str(display.trim(), DISPLAY) {
        Ok(date) => date.format(COMPACT).to_string(),
        Err(_) => display.to_string(),
    }
}

pub fn is_display_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value.trim(), DISPLAY).is_ok()
}
