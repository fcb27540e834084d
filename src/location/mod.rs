//! Location resolution for Rain
//!
//! Coordinates come from one of three places, tried in order: the settings
//! cache, geolocation of the device MAC address, or geocoding of the home
//! address. Whatever source succeeds is written back to the cache.

pub mod mac;
pub mod maps;
pub mod resolver;

pub use mac::{InterfaceTable, SystemInterfaces};
pub use maps::MapsClient;
pub use resolver::{normalize_address, LocationResolver};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::settings::SettingsError;

/// Name of the MAC address geolocation backend, used in diagnostics
pub const GEOLOCATION: &str = "Geolocation";
/// Name of the address geocoding backend, used in diagnostics
pub const GEOCODING: &str = "Geocoding";

/// A resolved latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parses the cached `"lat, lon"` form
    pub fn parse(value: &str) -> Result<Self, LocateError> {
        let invalid = || LocateError::InvalidCoordinates(value.to_string());
        let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| invalid())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }
        Ok(Self::new(latitude, longitude))
    }
}

/// Formats as `"lat, lon"`, the form stored in the settings cache
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinates {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Rejection codes caused by the request or the API key itself
const FATAL_REJECTIONS: [&str; 2] = ["400", "403"];

/// Errors that can occur while resolving the current location
#[derive(Debug, Error)]
pub enum LocateError {
    /// No configuration file existed; a default one has been generated
    #[error(
        "rain.conf not found!\nGenerated {}\nAdd your Dark Sky API key to rain.conf and execute rain again",
        .0.display()
    )]
    MissingConfig(PathBuf),

    /// The maps provider key is not configured
    #[error("Cannot obtain coordinates from the {0} API\nYou must add your Google Maps API key (maps_key) to rain.conf")]
    MissingCredential(&'static str),

    /// No home address is available for geocoding
    #[error("Cannot geocode without a home address\nSet `address` in rain.conf or pass --address")]
    MissingAddress,

    /// The device MAC address could not be determined
    #[error("could not determine a MAC address: {0}")]
    MacUnavailable(String),

    /// The provider answered with its error shape
    #[error("{code} - {message} (reason: {reason})")]
    ProviderRejected {
        code: String,
        message: String,
        reason: String,
    },

    /// The provider answered with a success shape lacking coordinates
    #[error("{0} API could not obtain coordinates")]
    Extraction(&'static str),

    /// The HTTP request itself failed
    #[error("{backend} request failed: {source}")]
    Request {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not valid JSON
    #[error("{backend} response could not be parsed: {source}")]
    Parse {
        backend: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The cached coordinates are not in `"lat, lon"` form
    #[error("invalid cached coordinates '{0}' in rain.conf; clear the value or run with --relocate")]
    InvalidCoordinates(String),

    /// Reading or writing the settings cache failed
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl LocateError {
    /// Whether a failed MAC geolocation may fall through to address geocoding
    ///
    /// Missing credentials and rejections of the request or key (HTTP 400 and
    /// 403) are fatal. Any other rejection, such as `404 notFound` for an
    /// unknown MAC address, falls through.
    pub fn allows_fallback(&self) -> bool {
        match self {
            LocateError::MacUnavailable(_)
            | LocateError::Extraction(_)
            | LocateError::Request { .. }
            | LocateError::Parse { .. } => true,
            LocateError::ProviderRejected { code, .. } => {
                !FATAL_REJECTIONS.contains(&code.as_str())
            }
            _ => false,
        }
    }
}
