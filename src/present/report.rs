//! Text layout of forecast sections

use std::fmt;

use chrono::{Local, TimeZone};

use super::convert::{clock_time, day_of_week, moon_phase, percent, wind_direction};
use super::PresentError;
use crate::cli::Mode;
use crate::forecast::{Alert, DataBlock, DataPoint, ForecastResponse};
use crate::settings::UnitSystem;

/// Number of days shown by the weekly outlook
pub const WEEKLY_DAYS: usize = 5;

/// Maximum number of hours listed in the hourly view
const HOURLY_LIMIT: usize = 24;

/// Minutes between rows of the minutely view
const MINUTELY_STEP: usize = 10;

/// Placeholder for values the provider did not send
const NOT_AVAILABLE: &str = "n/a";

/// Renders forecast sections as console text
#[derive(Debug, Clone)]
pub struct Report<Tz: TimeZone = Local> {
    units: UnitSystem,
    tz: Tz,
}

impl Report<Local> {
    /// Report with times in the local time zone
    pub fn new(units: UnitSystem) -> Self {
        Self { units, tz: Local }
    }
}

impl<Tz: TimeZone> Report<Tz>
where
    Tz::Offset: fmt::Display,
{
    /// Report with times in `tz`
    pub fn with_timezone(units: UnitSystem, tz: Tz) -> Self {
        Self { units, tz }
    }

    /// Renders the output for `mode`, followed by the active alert if any
    ///
    /// Fails when the response lacks a section the mode needs, which is how a
    /// provider error body surfaces.
    pub fn render(&self, mode: &Mode, forecast: &ForecastResponse) -> Result<String, PresentError> {
        let mut out = String::new();
        match mode {
            Mode::Currently => out.push_str(&self.currently(forecast.currently()?)?),
            Mode::Hourly => out.push_str(&self.hourly(forecast.hourly()?)),
            Mode::Minutely => out.push_str(&self.minutely(forecast.minutely()?)),
            Mode::Days(days) => {
                out.push('\n');
                for day in days {
                    out.push_str(&self.daily(forecast.daily(*day)?)?);
                }
            }
            Mode::Weekly => {
                out.push('\n');
                for day in 0..WEEKLY_DAYS {
                    out.push_str(&self.daily(forecast.daily(day)?)?);
                    out.push_str(&"-".repeat(25));
                    out.push('\n');
                }
            }
        }

        if let Some(alert) = forecast.alert() {
            out.push_str(&self.alert(alert));
        }
        Ok(out)
    }

    /// Current conditions
    pub fn currently(&self, point: &DataPoint) -> Result<String, PresentError> {
        let units = self.units;
        let bearing = point.wind_bearing.map(wind_direction).transpose()?;

        let lines = [
            String::new(),
            format!("Current time: {}", self.time(Some(point.time))),
            format!("Current condition: {}", text(point.summary.as_deref())),
            format!(
                "Current temperature: {}",
                with_unit(point.temperature, units.temperature_label())
            ),
            format!("Current humidity: {}", pct(point.humidity)),
            format!("Chance of rain: {}", pct(point.precip_probability)),
            format!(
                "Nearest storm: {}",
                with_unit(point.nearest_storm_distance, units.distance_label())
            ),
            format!("Cloud cover: {}", pct(point.cloud_cover)),
            format!("Dewpoint: {}", degrees(point.dew_point)),
            format!("Current pressure: {}", with_unit(point.pressure, "millibars")),
            format!("Wind speed: {}", with_unit(point.wind_speed, units.speed_label())),
            format!("Wind gust: {}", with_unit(point.wind_gust, units.speed_label())),
            format!("Wind bearing: {}", text(bearing)),
            format!("Visibility: {}", with_unit(point.visibility, units.distance_label())),
            String::new(),
        ];
        Ok(join(&lines))
    }

    /// Hour-by-hour outlook
    pub fn hourly(&self, block: &DataBlock) -> String {
        let mut lines = vec![
            String::new(),
            format!("Hourly summary: {}", text(block.summary.as_deref())),
        ];
        lines.extend(block.data.iter().take(HOURLY_LIMIT).map(|hour| {
            format!(
                "{:>8}  {:>6}  {:>4} rain  {}",
                self.time(Some(hour.time)),
                with_unit(hour.temperature, self.units.temperature_label()),
                pct(hour.precip_probability),
                text(hour.summary.as_deref()),
            )
        }));
        lines.push(String::new());
        join(&lines)
    }

    /// Minute-by-minute outlook for the next hour
    pub fn minutely(&self, block: &DataBlock) -> String {
        let mut lines = vec![
            String::new(),
            format!("Upcoming: {}", text(block.summary.as_deref())),
        ];
        lines.extend(block.data.iter().step_by(MINUTELY_STEP).map(|minute| {
            let intensity = minute
                .precip_intensity
                .map(|value| format!("{value:.3} {}", self.units.precipitation_label()))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            format!(
                "{:>8}  {}  {} chance",
                self.time(Some(minute.time)),
                intensity,
                pct(minute.precip_probability),
            )
        }));
        lines.push(String::new());
        join(&lines)
    }

    /// One day of the daily outlook
    pub fn daily(&self, point: &DataPoint) -> Result<String, PresentError> {
        let phase = point.moon_phase.map(moon_phase).transpose()?;
        let day = day_of_week(point.time, &self.tz).unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let lines = [
            format!("Day: {day}"),
            format!("Summary: {}", text(point.summary.as_deref())),
            format!(
                "High Temp.: {} at {}",
                rounded(point.temperature_max),
                self.time(point.temperature_max_time)
            ),
            format!(
                "Low Temp.: {} at {}",
                rounded(point.temperature_min),
                self.time(point.temperature_min_time)
            ),
            format!("Humidity: {}", pct(point.humidity)),
            format!("Chance of rain: {}", pct(point.precip_probability)),
            format!("Dewpoint: {}", degrees(point.dew_point)),
            format!("Pressure: {}", with_unit(point.pressure, "millibars")),
            format!("Wind speed: {}", with_unit(point.wind_speed, self.units.speed_label())),
            format!("Sunrise: {}", self.time(point.sunrise_time)),
            format!("Sunset: {}", self.time(point.sunset_time)),
            format!("Moon Phase: {}", text(phase)),
            String::new(),
        ];
        Ok(join(&lines))
    }

    /// The active weather advisory
    pub fn alert(&self, alert: &Alert) -> String {
        let headline = alert
            .title
            .as_deref()
            .or(alert.description.as_deref())
            .unwrap_or(NOT_AVAILABLE);
        let mut lines = vec![format!(
            "Special weather advisory: {} {}",
            self.time(alert.time),
            headline
        )];
        if let (Some(_), Some(description)) = (&alert.title, &alert.description) {
            lines.push(description.trim().to_string());
        }
        lines.push(format!("Severity: {}", text(alert.severity.as_deref())));
        lines.push(format!("Regions: {}", alert.regions.join(", ")));
        lines.push(format!("Expires: {}", self.time(alert.expires)));
        lines.push(String::new());
        join(&lines)
    }

    fn time(&self, timestamp: Option<i64>) -> String {
        timestamp
            .and_then(|ts| clock_time(ts, &self.tz))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn join(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

fn rounded(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}", v.round() as i64))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {unit}", v.round() as i64),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn degrees(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}\u{00B0}", v.round() as i64),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", percent(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}
