//! Lenient value coercion and casing checks.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use medallion_types::Numeric;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a numeric cell; `None` when absent or unparseable.
#[must_use]
pub fn numeric(value: Option<&str>) -> Option<Numeric> {
    value.and_then(Numeric::parse_lenient)
}

/// Parse a date cell; `None` when absent or unparseable.
///
/// Accepts ISO dates, ISO date-times (with or without offset; the date part
/// is kept), `MM/DD/YYYY`, and `YYYY/MM/DD`.
#[must_use]
pub fn date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// Title-case `value`: the first cased letter of every run of cased
/// letters becomes upper-case, the rest lower-case. Any other character
/// ends the run, so `o'neil` becomes `O'Neil`.
#[must_use]
pub fn to_title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if is_cased(c) {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Whether `value` has at least one cased letter and is already title case.
#[must_use]
pub fn is_title_case(value: &str) -> bool {
    value.chars().any(is_cased) && to_title_case(value) == value
}

/// Whether `value` has at least one cased letter and no upper-case ones.
#[must_use]
pub fn is_lower_case(value: &str) -> bool {
    value.chars().any(is_cased) && !value.chars().any(char::is_uppercase)
}
