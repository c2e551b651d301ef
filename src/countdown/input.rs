//! Raw input validation for the minute/second fields
//!
//! Inputs arrive as raw strings and are validated here, at set time, not
//! per keystroke. Invalid input is clamped rather than rejected: empty or
//! non-numeric reads as zero, minutes are floored and lower-bounded at 0,
//! seconds are floored and clamped to [0, 59].

/// Parse the minutes field: floored, lower-bounded at 0, unbounded above
pub fn parse_minutes(raw: &str) -> u64 {
    parse_clamped(raw, f64::MAX)
}

/// Parse the seconds field: floored and clamped to [0, 59]
pub fn parse_seconds(raw: &str) -> u64 {
    parse_clamped(raw, 59.0)
}

/// Compute total remaining seconds from the two raw fields
pub fn parse_duration(minutes: &str, seconds: &str) -> u64 {
    parse_minutes(minutes)
        .saturating_mul(60)
        .saturating_add(parse_seconds(seconds))
}

fn parse_clamped(raw: &str, upper: f64) -> u64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value.floor().clamp(0.0, upper) as u64,
        _ => 0,
    }
}
