//! Elapsed race times: `h:mm:ss`, `mm:ss` or plain seconds, each with
//! optional fractional seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::parsing::ParseError;

/// Sentinel used in configuration for "no mass start on this leg"
pub const NO_MASS_START: &str = "none";

const MAX_FRACTION_DIGITS: usize = 9;

/// Parse an elapsed time string
///
/// # Errors
///
/// Returns `ParseError::InvalidTime` if the string is not a valid elapsed time.
pub fn parse_time(s: &str) -> Result<Duration, ParseError> {
    let trimmed = s.trim();
    let invalid = || ParseError::InvalidTime(trimmed.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let (whole, seconds_part) = parts.split_at(parts.len() - 1);
    let (seconds, nanos) = parse_seconds(seconds_part[0]).ok_or_else(invalid)?;

    let mut total: u64 = 0;
    for (i, field) in whole.iter().enumerate() {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u64 = field.parse().map_err(|_| invalid())?;
        // Minutes following an hours field must be below 60
        if i > 0 && value >= 60 {
            return Err(invalid());
        }
        total = total.checked_mul(60).and_then(|t| t.checked_add(value)).ok_or_else(invalid)?;
    }

    if !whole.is_empty() && seconds >= 60 {
        return Err(invalid());
    }

    let total = total
        .checked_mul(60)
        .and_then(|t| t.checked_add(seconds))
        .ok_or_else(invalid)?;

    Ok(Duration::new(total, nanos))
}

/// Parse `ss` or `ss.fff` into whole seconds and nanoseconds
fn parse_seconds(field: &str) -> Option<(u64, u32)> {
    let (int_part, frac_part) = match field.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (field, None),
    };

    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let seconds: u64 = int_part.parse().ok()?;

    let nanos = match frac_part {
        None => 0,
        Some(f)
            if !f.is_empty()
                && f.len() <= MAX_FRACTION_DIGITS
                && f.chars().all(|c| c.is_ascii_digit()) =>
        {
            let padded = format!("{f:0<width$}", width = MAX_FRACTION_DIGITS);
            padded.parse().ok()?
        }
        Some(_) => return None,
    };

    Some((seconds, nanos))
}

/// Parse a time that may be the `none` sentinel
///
/// # Errors
///
/// Returns `ParseError::InvalidTime` if the string is neither `none` nor a valid time.
pub fn parse_optional_time(s: &str) -> Result<Option<Duration>, ParseError> {
    if s.trim().eq_ignore_ascii_case(NO_MASS_START) {
        Ok(None)
    } else {
        parse_time(s).map(Some)
    }
}

/// Format an elapsed time as `h:mm:ss`, with trimmed fractional seconds when present
#[must_use]
pub fn format_time(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let nanos = duration.subsec_nanos();

    if nanos == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        let fraction = format!("{nanos:09}");
        let fraction = fraction.trim_end_matches('0');
        format!("{hours}:{minutes:02}:{seconds:02}.{fraction}")
    }
}

/// Format an optional time, using `-` for a missing value
#[must_use]
pub fn format_optional_time(duration: Option<Duration>) -> String {
    duration.map_or_else(|| "-".to_string(), format_time)
}

/// Serde adapter for a required time string
///
/// # Errors
///
/// Returns a deserialization error if the string is not a valid time.
pub fn deserialize_time<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_time(&s).map_err(serde::de::Error::custom)
}

/// Serde adapter for a list of per-leg times where `none` marks an absent value
///
/// # Errors
///
/// Returns a deserialization error if any entry is not a valid time or `none`.
pub fn deserialize_optional_times<'de, D>(
    deserializer: D,
) -> Result<Vec<Option<Duration>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<String>::deserialize(deserializer)?;
    values
        .iter()
        .map(|s| parse_optional_time(s).map_err(serde::de::Error::custom))
        .collect()
}
