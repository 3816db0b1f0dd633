//! Display formatting attached to meeting representations.

use chrono::{Datelike, NaiveDate};

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Offset between the Gregorian and Thai Buddhist Era calendars.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Render a date as `"{day} {Thai month} {Buddhist Era year}"`,
/// e.g. `2025-03-07` becomes `"7 มีนาคม 2568"`.
pub fn thai_date(date: NaiveDate) -> String {
    let month = THAI_MONTHS[date.month0() as usize];
    format!(
        "{} {month} {}",
        date.day(),
        date.year() + BUDDHIST_ERA_OFFSET
    )
}

/// Human readable byte count in 1024 steps, at most two decimals with
/// trailing zeros dropped (`1536` becomes `"1.5 KB"`).
pub fn format_file_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes <= 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
