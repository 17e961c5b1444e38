use chrono::{Local, TimeZone};
use std::fmt::Display;

const ONE_DAY_SECS: u64 = 60 * 60 * 24;
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const BYTE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Renders a byte count as `"<n.n> <UNIT>"` using 1024-based steps.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, BYTE_UNITS[unit])
}

/// Renders uptime the way `uptime(1)` does: `"D days, H:MM"` past one day,
/// `"H:MM"` otherwise. Days come from floor division; only the remainder is
/// rounded to the nearest minute, so rounding may carry into hours but never
/// into days.
pub fn format_uptime(secs: u64) -> String {
    if secs > ONE_DAY_SECS {
        let days = secs / ONE_DAY_SECS;
        let (hours, minutes) = hours_minutes(secs - days * ONE_DAY_SECS);
        format!("{days} days, {hours}:{minutes:02}")
    } else {
        let (hours, minutes) = hours_minutes(secs);
        format!("{hours}:{minutes:02}")
    }
}

fn hours_minutes(secs: u64) -> (u64, u64) {
    // Half a minute rounds up.
    let minutes = (secs + 30) / 60;
    (minutes / 60, minutes % 60)
}

/// `YYYY/MM/DD hh:mm:ss` in the host's local time zone.
pub fn format_timestamp(unix_secs: i64) -> String {
    format_timestamp_in(&Local, unix_secs)
}

pub fn format_timestamp_in<Tz>(tz: &Tz, unix_secs: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(unix_secs, 0)
        .earliest()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Rounds to one decimal first and only then drops the fraction, so 49.96
/// reports 50 while 49.94 reports 49.
pub fn used_percent(raw: f64) -> u32 {
    truncate_percent(round_to(raw, 1))
}

pub fn truncate_percent(raw: f64) -> u32 {
    if raw.is_finite() && raw > 0.0 {
        raw as u32
    } else {
        0
    }
}

pub fn format_load(value: f64) -> String {
    format!("{value:.2}")
}

/// Shortest decimal text of the reading, followed by the Celsius sign.
pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius}℃")
}
