//! Dark Sky forecast data model
//!
//! A forecast response is split into top-level sections. The client asks the
//! provider to leave out sections the caller does not need, so only the
//! requested sections (plus alerts) are present in a response.

pub mod client;

pub use client::ForecastClient;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{SettingsError, UnitSystem};

/// A top-level block of a forecast response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Currently,
    Minutely,
    Hourly,
    Daily,
    Alerts,
    Flags,
}

impl Section {
    /// Every section in the provider's canonical order
    pub const ALL: [Section; 6] = [
        Section::Currently,
        Section::Minutely,
        Section::Hourly,
        Section::Daily,
        Section::Alerts,
        Section::Flags,
    ];

    /// Name used by the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Currently => "currently",
            Section::Minutely => "minutely",
            Section::Hourly => "hourly",
            Section::Daily => "daily",
            Section::Alerts => "alerts",
            Section::Flags => "flags",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sections to exclude when `requested` are wanted
///
/// Alerts are always kept. The result is in canonical order.
pub fn exclusion_list(requested: &[Section]) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| *section != Section::Alerts && !requested.contains(section))
        .collect()
}

/// Sections to request for a view that shows `view`, labelled in `units`
///
/// With `auto` units the flags block is added, since it names the units the
/// provider picked for the location.
pub fn requested_sections(view: &[Section], units: UnitSystem) -> Vec<Section> {
    let mut sections = view.to_vec();
    if units == UnitSystem::Auto && !sections.contains(&Section::Flags) {
        sections.push(Section::Flags);
    }
    sections
}

/// Errors that can occur when fetching or reading a forecast
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The forecast provider key is not configured
    #[error("No Dark Sky API key found in rain.conf!\nAdd your key as darksky_key and execute rain again")]
    MissingCredential,

    /// The configured base URL cannot carry a forecast path
    #[error("invalid forecast base URL {0}")]
    InvalidBaseUrl(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A section was read that the last response does not contain
    #[error("forecast section '{0}' is not available in the response")]
    MissingSection(Section),

    /// The daily block has no entry for the requested day
    #[error("no daily forecast available for day {0}")]
    DayUnavailable(usize),

    /// Reading settings failed
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// A single point in time; every field is optional since the provider omits freely
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// Unix timestamp in seconds
    #[serde(default)]
    pub time: i64,
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precip_probability: Option<f64>,
    pub precip_intensity: Option<f64>,
    pub precip_type: Option<String>,
    pub nearest_storm_distance: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub dew_point: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
    pub temperature_max: Option<f64>,
    pub temperature_max_time: Option<i64>,
    pub temperature_min: Option<f64>,
    pub temperature_min_time: Option<i64>,
    pub sunrise_time: Option<i64>,
    pub sunset_time: Option<i64>,
    pub moon_phase: Option<f64>,
}

/// A block of data points (minutely, hourly, daily)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    pub summary: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

/// A severe weather advisory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    /// Unix timestamp the alert was issued
    pub time: Option<i64>,
    /// Unix timestamp the alert expires
    pub expires: Option<i64>,
    #[serde(default)]
    pub regions: Vec<String>,
    pub uri: Option<String>,
}

/// Response metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    /// Units the response is expressed in
    pub units: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(rename = "nearest-station")]
    pub nearest_station: Option<f64>,
}

/// Decoded forecast response, including the provider's error shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub currently: Option<DataPoint>,
    pub minutely: Option<DataBlock>,
    pub hourly: Option<DataBlock>,
    pub daily: Option<DataBlock>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    pub flags: Option<Flags>,
    /// Provider error message, present only on failed requests
    pub error: Option<String>,
    /// Provider error code accompanying `error`
    pub code: Option<i64>,
}

impl ForecastResponse {
    /// `"CODE - MESSAGE"` when the provider answered with its error shape
    pub fn provider_error(&self) -> Option<String> {
        let message = self.error.as_deref()?;
        Some(match self.code {
            Some(code) => format!("{code} - {message}"),
            None => message.to_string(),
        })
    }

    /// Current conditions
    pub fn currently(&self) -> Result<&DataPoint, ForecastError> {
        self.currently
            .as_ref()
            .ok_or(ForecastError::MissingSection(Section::Currently))
    }

    /// Minute-by-minute forecast for the next hour
    pub fn minutely(&self) -> Result<&DataBlock, ForecastError> {
        self.minutely
            .as_ref()
            .ok_or(ForecastError::MissingSection(Section::Minutely))
    }

    /// Hour-by-hour forecast
    pub fn hourly(&self) -> Result<&DataBlock, ForecastError> {
        self.hourly
            .as_ref()
            .ok_or(ForecastError::MissingSection(Section::Hourly))
    }

    /// Daily forecast for `day` days from today
    pub fn daily(&self, day: usize) -> Result<&DataPoint, ForecastError> {
        let daily = self
            .daily
            .as_ref()
            .ok_or(ForecastError::MissingSection(Section::Daily))?;
        daily.data.get(day).ok_or(ForecastError::DayUnavailable(day))
    }

    /// The active alert, if any
    pub fn alert(&self) -> Option<&Alert> {
        self.alerts.first()
    }

    /// Units to label values with
    ///
    /// With `auto` configured the provider's `flags.units` wins when present.
    pub fn display_units(&self, configured: UnitSystem) -> UnitSystem {
        match (configured, self.flags.as_ref().and_then(|f| f.units.as_deref())) {
            (UnitSystem::Auto, Some(units)) => UnitSystem::from_setting(units),
            (configured, _) => configured,
        }
    }
}
