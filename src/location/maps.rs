//! Google Maps geolocation and geocoding client
//!
//! Both endpoints take a single POST and answer either with coordinates or
//! with an error object. The error object is surfaced as
//! `LocateError::ProviderRejected`; a success body without coordinates is an
//! `LocateError::Extraction`.

use reqwest::Client;
use serde::Deserialize;

use super::{Coordinates, LocateError, GEOCODING, GEOLOCATION};
use crate::settings::{SettingsStore, MAPS_KEY};

/// Endpoint for MAC address geolocation
const GEOLOCATE_URL: &str = "https://www.googleapis.com/geolocation/v1/geolocate";

/// Endpoint for street address geocoding
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Client for the Google Maps location APIs
#[derive(Debug, Clone)]
pub struct MapsClient<'a> {
    store: &'a SettingsStore,
    client: Client,
    geolocate_url: String,
    geocode_url: String,
}

impl<'a> MapsClient<'a> {
    /// Create a client for the production endpoints
    pub fn new(store: &'a SettingsStore) -> Self {
        Self::with_base_urls(store, GEOLOCATE_URL, GEOCODE_URL)
    }

    /// Create a client against custom endpoints
    pub fn with_base_urls(
        store: &'a SettingsStore,
        geolocate_url: impl Into<String>,
        geocode_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client: Client::new(),
            geolocate_url: geolocate_url.into(),
            geocode_url: geocode_url.into(),
        }
    }

    fn maps_key(&self, backend: &'static str) -> Result<String, LocateError> {
        let key = self.store.read(MAPS_KEY)?;
        if key.trim().is_empty() {
            return Err(LocateError::MissingCredential(backend));
        }
        Ok(key.trim().to_string())
    }

    /// Resolve coordinates from a device MAC address
    ///
    /// # Returns
    /// * `Ok(Coordinates)` - Location reported by the provider
    /// * `Err(LocateError)` - Missing key, provider rejection, transport or extraction failure
    pub async fn geolocate(&self, mac: &str) -> Result<Coordinates, LocateError> {
        let key = self.maps_key(GEOLOCATION)?;
        tracing::debug!(mac, "requesting geolocation");

        let response = self
            .client
            .post(&self.geolocate_url)
            .query(&[("key", key.as_str())])
            .form(&[("macAddress", mac), ("considerIp", "true")])
            .send()
            .await
            .map_err(|source| request_error(GEOLOCATION, source))?;
        let text = response
            .text()
            .await
            .map_err(|source| request_error(GEOLOCATION, source))?;

        parse_geolocate(&text)
    }

    /// Resolve coordinates from a street address
    ///
    /// The address is sent URL-encoded, so spaces travel as `+`.
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, LocateError> {
        let key = self.maps_key(GEOCODING)?;
        tracing::debug!(address, "requesting geocoding");

        let response = self
            .client
            .post(&self.geocode_url)
            .query(&[("address", address), ("key", key.as_str())])
            .send()
            .await
            .map_err(|source| request_error(GEOCODING, source))?;
        let text = response
            .text()
            .await
            .map_err(|source| request_error(GEOCODING, source))?;

        parse_geocode(&text)
    }
}

fn request_error(backend: &'static str, source: reqwest::Error) -> LocateError {
    LocateError::Request { backend, source }
}

/// Parse a geolocation API body into coordinates
fn parse_geolocate(text: &str) -> Result<Coordinates, LocateError> {
    let body: GeolocateResponse = serde_json::from_str(text).map_err(|source| LocateError::Parse {
        backend: GEOLOCATION,
        source,
    })?;

    if let Some(error) = body.error {
        return Err(error.into_rejection());
    }

    body.location
        .and_then(LatLng::into_coordinates)
        .ok_or(LocateError::Extraction(GEOLOCATION))
}

/// Parse a geocoding API body into coordinates of the first result
fn parse_geocode(text: &str) -> Result<Coordinates, LocateError> {
    let body: GeocodeResponse = serde_json::from_str(text).map_err(|source| LocateError::Parse {
        backend: GEOCODING,
        source,
    })?;

    if let Some(error) = body.error {
        return Err(error.into_rejection());
    }

    // The geocoding API also reports failures through `status`
    if let Some(status) = body.status.as_deref() {
        if status != "OK" && status != "ZERO_RESULTS" {
            return Err(LocateError::ProviderRejected {
                code: status.to_string(),
                message: body.error_message.unwrap_or_default(),
                reason: status.to_ascii_lowercase(),
            });
        }
    }

    body.results
        .into_iter()
        .next()
        .and_then(|result| result.geometry)
        .and_then(|geometry| geometry.location)
        .and_then(LatLng::into_coordinates)
        .ok_or(LocateError::Extraction(GEOCODING))
}

/// Shared error object of the Google APIs
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<serde_json::Value>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

impl ApiError {
    fn into_rejection(self) -> LocateError {
        let code = match self.code {
            Some(serde_json::Value::String(code)) => code,
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };
        let reason = self
            .errors
            .into_iter()
            .next()
            .and_then(|detail| detail.reason)
            .unwrap_or_else(|| "unknown".to_string());
        LocateError::ProviderRejected {
            code,
            message: self.message.unwrap_or_default(),
            reason,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

impl LatLng {
    fn into_coordinates(self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lng?))
    }
}

/// Geolocation API response structure
#[derive(Debug, Deserialize)]
struct GeolocateResponse {
    location: Option<LatLng>,
    error: Option<ApiError>,
}

/// Geocoding API response structure
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: Option<String>,
    error_message: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GEOCODE_OK: &str = r#"{
        "results": [
            {
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                "geometry": {
                    "location": { "lat": 37.4224764, "lng": -122.0842499 },
                    "location_type": "ROOFTOP"
                }
            }
        ],
        "status": "OK"
    }"#;

    const KEY_INVALID: &str = r#"{
        "error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "errors": [
                { "domain": "usageLimits", "reason": "keyInvalid", "message": "Bad Request" }
            ]
        }
    }"#;

    fn store_with_key(key: &str) -> (SettingsStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SettingsStore::with_path(temp_dir.path().join("rain.conf"));
        store.initialize_defaults().unwrap();
        store.write(MAPS_KEY, key).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_parse_geolocate_success() {
        let coords = parse_geolocate(r#"{"location": {"lat": 51.0, "lng": -0.1}, "accuracy": 1200.4}"#)
            .expect("Should parse");
        assert_eq!(coords, Coordinates::new(51.0, -0.1));
    }

    #[test]
    fn test_parse_geolocate_error_shape() {
        match parse_geolocate(KEY_INVALID) {
            Err(LocateError::ProviderRejected {
                code,
                message,
                reason,
            }) => {
                assert_eq!(code, "400");
                assert!(message.starts_with("API key not valid"));
                assert_eq!(reason, "keyInvalid");
            }
            other => panic!("Expected ProviderRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_geolocate_missing_fields_is_extraction() {
        let result = parse_geolocate(r#"{"location": {"lat": 51.0}}"#);
        assert!(matches!(result, Err(LocateError::Extraction(GEOLOCATION))));

        let result = parse_geolocate(r#"{"accuracy": 10}"#);
        assert!(matches!(result, Err(LocateError::Extraction(GEOLOCATION))));
    }

    #[test]
    fn test_parse_geolocate_malformed_json() {
        let result = parse_geolocate("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(LocateError::Parse { .. })));
    }

    #[test]
    fn test_parse_geocode_success() {
        let coords = parse_geocode(GEOCODE_OK).expect("Should parse");
        assert!((coords.latitude - 37.4224764).abs() < 1e-9);
        assert!((coords.longitude + 122.0842499).abs() < 1e-9);
    }

    #[test]
    fn test_parse_geocode_zero_results_is_extraction() {
        let result = parse_geocode(r#"{"results": [], "status": "ZERO_RESULTS"}"#);
        assert!(matches!(result, Err(LocateError::Extraction(GEOCODING))));
    }

    #[test]
    fn test_parse_geocode_status_rejection() {
        let body = r#"{
            "error_message": "The provided API key is invalid.",
            "results": [],
            "status": "REQUEST_DENIED"
        }"#;
        match parse_geocode(body) {
            Err(LocateError::ProviderRejected { code, message, .. }) => {
                assert_eq!(code, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("Expected ProviderRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_fatal_before_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let (store, _temp_dir) = store_with_key("");
        let url = format!("{}/geolocate", mock_server.uri());
        let client = MapsClient::with_base_urls(&store, url.clone(), url);

        let result = client.geolocate("aa:bb:cc:dd:ee:ff").await;
        assert!(matches!(result, Err(LocateError::MissingCredential(GEOLOCATION))));

        let result = client.geocode("1 Main St").await;
        assert!(matches!(result, Err(LocateError::MissingCredential(GEOCODING))));
    }

    #[tokio::test]
    async fn test_geolocate_sends_key_and_mac() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/geolocation/v1/geolocate"))
            .and(query_param("key", "maps-secret"))
            .and(body_string_contains("macAddress=aa%3Abb%3Acc%3Add%3Aee%3Aff"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "lat": 40.7128, "lng": -74.006 },
                "accuracy": 25.0
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (store, _temp_dir) = store_with_key("maps-secret");
        let client = MapsClient::with_base_urls(
            &store,
            format!("{}/geolocation/v1/geolocate", mock_server.uri()),
            format!("{}/maps/api/geocode/json", mock_server.uri()),
        );

        let coords = client.geolocate("aa:bb:cc:dd:ee:ff").await.unwrap();
        assert_eq!(coords, Coordinates::new(40.7128, -74.006));
    }

    #[tokio::test]
    async fn test_geocode_sends_encoded_address() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "1600 Amphitheatre Pkwy Mountain View"))
            .and(query_param("key", "maps-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GEOCODE_OK))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (store, _temp_dir) = store_with_key("maps-secret");
        let client = MapsClient::with_base_urls(
            &store,
            format!("{}/geolocation/v1/geolocate", mock_server.uri()),
            format!("{}/maps/api/geocode/json", mock_server.uri()),
        );

        let coords = client
            .geocode("1600 Amphitheatre Pkwy Mountain View")
            .await
            .unwrap();
        assert!((coords.latitude - 37.4224764).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geolocate_rejection_over_http_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(KEY_INVALID))
            .mount(&mock_server)
            .await;

        let (store, _temp_dir) = store_with_key("bad-key");
        let client = MapsClient::with_base_urls(&store, mock_server.uri(), mock_server.uri());

        let result = client.geolocate("aa:bb:cc:dd:ee:ff").await;
        assert!(matches!(result, Err(LocateError::ProviderRejected { .. })));
    }
}
