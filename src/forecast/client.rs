//! Dark Sky forecast API client
//!
//! This module fetches a forecast for a pair of coordinates, asking the
//! provider to exclude every section the caller did not request.

use reqwest::{Client, Url};

use super::{exclusion_list, ForecastError, ForecastResponse, Section};
use crate::location::Coordinates;
use crate::settings::{SettingsStore, DARKSKY_KEY};

/// Base URL for the Dark Sky API
const DARK_SKY_BASE_URL: &str = "https://api.darksky.net";

/// Client for fetching forecasts from the Dark Sky API
#[derive(Debug, Clone)]
pub struct ForecastClient<'a> {
    store: &'a SettingsStore,
    client: Client,
    base_url: String,
}

impl<'a> ForecastClient<'a> {
    /// Create a new ForecastClient for the production API
    pub fn new(store: &'a SettingsStore) -> Self {
        Self::with_base_url(store, DARK_SKY_BASE_URL)
    }

    /// Create a new ForecastClient against a custom base URL
    pub fn with_base_url(store: &'a SettingsStore, base_url: impl Into<String>) -> Self {
        Self {
            store,
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the forecast for the given coordinates
    ///
    /// Only `sections` and alerts are requested. A provider error body is
    /// not treated as a failure: it is logged and returned as-is, and the
    /// caller sees missing sections when it reads them.
    ///
    /// # Arguments
    /// * `coordinates` - Location to forecast
    /// * `sections` - Sections to include
    ///
    /// # Returns
    /// * `Ok(ForecastResponse)` - Decoded body, possibly in the error shape
    /// * `Err(ForecastError)` - Missing key, transport or JSON failure
    pub async fn fetch(
        &self,
        coordinates: Coordinates,
        sections: &[Section],
    ) -> Result<ForecastResponse, ForecastError> {
        let key = self.store.read(DARKSKY_KEY)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ForecastError::MissingCredential);
        }

        let units = self.store.units()?;
        let exclude = exclude_param(sections);
        let url = self.forecast_url(key, coordinates)?;
        tracing::debug!(units = units.as_str(), exclude = %exclude, "requesting forecast");

        let response = self
            .client
            .get(url)
            .query(&[("units", units.as_str()), ("exclude", exclude.as_str())])
            .send()
            .await?;
        let text = response.text().await?;
        let forecast: ForecastResponse = serde_json::from_str(&text)?;

        if let Some(error) = forecast.provider_error() {
            tracing::debug!(error = %error, "forecast provider returned an error");
        }

        Ok(forecast)
    }

    /// `{base}/forecast/{key}/{lat},{lon}` with each segment percent-encoded
    fn forecast_url(&self, key: &str, coordinates: Coordinates) -> Result<Url, ForecastError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ForecastError::InvalidBaseUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ForecastError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("forecast")
            .push(key)
            .push(&format!("{},{}", coordinates.latitude, coordinates.longitude));
        Ok(url)
    }
}

/// Comma-joined exclusion list for the `exclude` query parameter
pub fn exclude_param(sections: &[Section]) -> String {
    exclusion_list(sections)
        .iter()
        .map(Section::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
