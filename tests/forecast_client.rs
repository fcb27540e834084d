//! Integration tests for ForecastClient using wiremock.

use chrono::Utc;
use rain::cli::Mode;
use rain::forecast::{requested_sections, ForecastClient, ForecastError, Section};
use rain::location::Coordinates;
use rain::present::Report;
use rain::settings::{SettingsStore, UnitSystem, DARKSKY_KEY, UNITS};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn configured_store(key: &str) -> (SettingsStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = SettingsStore::with_path(temp_dir.path().join("rain.conf"));
    store.initialize_defaults().unwrap();
    store.write(DARKSKY_KEY, key).unwrap();
    (store, temp_dir)
}

#[tokio::test]
async fn test_fetch_currently_excludes_other_sections() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/dark-key/37.5,-122.25"))
        .and(query_param("units", "auto"))
        .and(query_param("exclude", "minutely,hourly,daily,flags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 37.5,
            "longitude": -122.25,
            "timezone": "America/Los_Angeles",
            "currently": {
                "time": 1563030300,
                "summary": "Clear",
                "temperature": 61.2,
                "windBearing": 250
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (store, _temp_dir) = configured_store("dark-key");
    let client = ForecastClient::with_base_url(&store, mock_server.uri());

    let forecast = client
        .fetch(Coordinates::new(37.5, -122.25), &[Section::Currently])
        .await
        .expect("Forecast should be fetched");

    let currently = forecast.currently().unwrap();
    assert_eq!(currently.summary.as_deref(), Some("Clear"));
    assert_eq!(currently.wind_bearing, Some(250.0));
    assert!(forecast.alert().is_none());
}

#[tokio::test]
async fn test_fetch_uses_configured_units() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("units", "si"))
        .and(query_param("exclude", "currently,minutely,hourly,flags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": { "data": [ { "time": 1563001200, "temperatureMax": 19.1 } ] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (store, _temp_dir) = configured_store("dark-key");
    store.write(UNITS, "si").unwrap();
    let client = ForecastClient::with_base_url(&store, mock_server.uri());

    let forecast = client
        .fetch(Coordinates::new(1.0, 2.0), &[Section::Daily])
        .await
        .unwrap();

    assert_eq!(forecast.daily(0).unwrap().temperature_max, Some(19.1));
}

#[tokio::test]
async fn test_auto_units_label_output_with_provider_flags() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/dark-key/48.85,2.35"))
        .and(query_param("units", "auto"))
        .and(query_param("exclude", "minutely,hourly,daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "currently": {
                "time": 1563030300,
                "summary": "Clear",
                "temperature": 16.2,
                "windSpeed": 3.1
            },
            "flags": { "units": "si", "sources": ["meteofrance"] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (store, _temp_dir) = configured_store("dark-key");
    let units = store.units().unwrap();
    assert_eq!(units, UnitSystem::Auto);

    let client = ForecastClient::with_base_url(&store, mock_server.uri());
    let forecast = client
        .fetch(
            Coordinates::new(48.85, 2.35),
            &requested_sections(Mode::Currently.sections(), units),
        )
        .await
        .unwrap();

    let report = Report::with_timezone(forecast.display_units(units), Utc);
    let output = report.render(&Mode::Currently, &forecast).unwrap();
    assert!(output.contains("Current temperature: 16 C"), "{output}");
    assert!(output.contains("Wind speed: 3 m/s"), "{output}");
}

#[tokio::test]
async fn test_provider_error_is_returned_not_raised() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": 400,
            "error": "The given location (or time) is invalid."
        })))
        .mount(&mock_server)
        .await;

    let (store, _temp_dir) = configured_store("dark-key");
    let client = ForecastClient::with_base_url(&store, mock_server.uri());

    let forecast = client
        .fetch(Coordinates::new(999.0, 999.0), &[Section::Currently])
        .await
        .expect("Provider errors should not fail the fetch");

    assert_eq!(forecast.error.as_deref(), Some("The given location (or time) is invalid."));
    assert_eq!(forecast.code, Some(400));
    assert!(matches!(
        forecast.currently(),
        Err(ForecastError::MissingSection(Section::Currently))
    ));
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (store, _temp_dir) = configured_store("");
    let client = ForecastClient::with_base_url(&store, mock_server.uri());

    let result = client
        .fetch(Coordinates::new(1.0, 2.0), &[Section::Currently])
        .await;

    assert!(matches!(result, Err(ForecastError::MissingCredential)));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let (store, _temp_dir) = configured_store("dark-key");
    let client = ForecastClient::with_base_url(&store, mock_server.uri());

    let result = client
        .fetch(Coordinates::new(1.0, 2.0), &[Section::Hourly])
        .await;

    assert!(matches!(result, Err(ForecastError::ParseError(_))));
}
