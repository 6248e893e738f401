use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

/// Parses a currency amount as exported by Tally or the DMS portal.
/// Thousands separators and surrounding whitespace are ignored.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a non-negative whole number (ages, RA counts).
pub fn parse_count(raw: &str) -> Option<u32> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned.parse::<u32>().ok()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// True when the activation happened on or before the as-of day of its own
/// month. Applied to both MTD and LMTD exports so the two windows cover the
/// same number of days.
pub fn within_month_to_date(activated: NaiveDateTime, as_of: NaiveDate) -> bool {
    activated.day() <= as_of.day()
}

/// SPU names carry the brand ("realme C63"); reports key on the bare model.
pub fn normalize_model_name(raw: &str, brand: &str) -> String {
    if brand.is_empty() {
        raw.trim().to_string()
    } else {
        raw.replace(brand, "").trim().to_string()
    }
}

/// `<output_dir>/<prefix>_<YYYY-MM-DD>`
pub fn dated_output_dir(output_dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("{}_{}", prefix, date.format("%Y-%m-%d")))
}

/// Formats a currency value the way report consumers paste it into sheets.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}
