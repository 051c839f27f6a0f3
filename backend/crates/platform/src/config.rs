//! Configuration Primitives
//!
//! Validation helpers used when building immutable configuration values at
//! startup: minimum-length secrets and human-readable duration strings
//! (`"2h"`, `"30 minutes"`, `"1.5d"`).

use std::time::Duration;

use thiserror::Error;

/// Minimum length of signing secrets and salts (characters)
pub const MIN_SECRET_LENGTH: usize = 20;

const SECOND: f64 = 1.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const YEAR: f64 = DAY * 365.25;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("{name} must be at least {min} characters (got {actual})")]
    TooShort {
        name: String,
        min: usize,
        actual: usize,
    },

    #[error("Invalid duration: {0:?}")]
    InvalidDuration(String),
}

/// Reject values shorter than `min` characters
pub fn require_min_length(name: &str, value: &str, min: usize) -> Result<(), ConfigError> {
    let actual = value.chars().count();
    if actual < min {
        return Err(ConfigError::TooShort {
            name: name.to_string(),
            min,
            actual,
        });
    }
    Ok(())
}

/// Parse a duration string of the form `<number>[ ]<unit>`
///
/// Units: `s`/`sec(s)`/`second(s)`, `m`/`min(s)`/`minute(s)`,
/// `h`/`hr(s)`/`hour(s)`, `d`/`day(s)`, `w`/`week(s)`, `y`/`yr(s)`/`year(s)`.
/// Units are case-insensitive. Fractions are rounded to whole seconds and the
/// result must be at least one second.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());

    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(invalid)?;
    let (number, unit) = trimmed.split_at(split);

    if !is_decimal(number) {
        return Err(invalid());
    }
    let value: f64 = number.parse().map_err(|_| invalid())?;
    let unit = unit.strip_prefix(' ').unwrap_or(unit).to_ascii_lowercase();

    let scale = match unit.as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => WEEK,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR,
        _ => return Err(invalid()),
    };

    let secs = (value * scale).round();
    if !secs.is_finite() || secs < 1.0 || secs > u32::MAX as f64 {
        return Err(invalid());
    }

    Ok(Duration::from_secs(secs as u64))
}

/// `\d+` or `\d+\.\d+`
fn is_decimal(number: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match number.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(number),
    }
}
