//! Pure conversions from provider values to display strings

use std::fmt;

use chrono::TimeZone;

use super::PresentError;

/// 16-point compass labels, clockwise from north
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Unix timestamp to a 12-hour clock time in `tz`, e.g. `"3:05 PM"`
pub fn clock_time<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: fmt::Display,
{
    tz.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%-I:%M %p").to_string())
}

/// Unix timestamp to a day label in `tz`, e.g. `"Monday July 15"`
pub fn day_of_week<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: fmt::Display,
{
    tz.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%A %B %d").to_string())
}

/// Wind bearing in degrees to a 16-point compass label
///
/// # Returns
/// * `Ok(&str)` for bearings in `[0, 360]`
/// * `Err(PresentError::WindOutOfRange)` otherwise
pub fn wind_direction(degrees: f64) -> Result<&'static str, PresentError> {
    if !(0.0..=360.0).contains(&degrees) {
        return Err(PresentError::WindOutOfRange(degrees));
    }
    let index = (degrees / 22.5 + 0.5).floor() as usize % COMPASS_POINTS.len();
    Ok(COMPASS_POINTS[index])
}

/// Lunation fraction to a named moon phase
///
/// The quarter values 0, 0.25, 0.5 and 0.75 map to their named phase; the
/// open intervals between them map to crescent and gibbous phases.
pub fn moon_phase(fraction: f64) -> Result<&'static str, PresentError> {
    if fraction.is_nan() || fraction < 0.0 {
        return Err(PresentError::MoonPhaseOutOfRange(fraction));
    }
    let phase = if fraction == 0.0 {
        "New moon"
    } else if fraction < 0.25 {
        "Waxing crescent"
    } else if fraction == 0.25 {
        "First quarter moon"
    } else if fraction < 0.5 {
        "Waxing gibbous"
    } else if fraction == 0.5 {
        "Full moon"
    } else if fraction < 0.75 {
        "Waning gibbous"
    } else if fraction == 0.75 {
        "Last quarter moon"
    } else {
        "Waning crescent"
    };
    Ok(phase)
}

/// Fraction in `[0, 1]` to a whole percentage
pub fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}
