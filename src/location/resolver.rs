//! Ordered fallback chain for the current location

use super::mac::{device_mac, InterfaceTable, SystemInterfaces};
use super::maps::MapsClient;
use super::{Coordinates, LocateError};
use crate::settings::{SettingsStore, ADDRESS, COORDINATES};

/// Resolves coordinates for the current run
///
/// Order: cached coordinates, MAC geolocation, address geocoding. The first
/// successful lookup is cached, after which the cache short-circuits every
/// later run until it is cleared.
pub struct LocationResolver<'a, T = SystemInterfaces> {
    store: &'a SettingsStore,
    maps: MapsClient<'a>,
    interfaces: T,
    address_override: Option<String>,
}

impl<'a> LocationResolver<'a, SystemInterfaces> {
    /// Create a resolver using the production endpoints and the system interface table
    pub fn new(store: &'a SettingsStore) -> Self {
        Self::with_parts(store, MapsClient::new(store), SystemInterfaces)
    }
}

impl<'a, T: InterfaceTable> LocationResolver<'a, T> {
    /// Create a resolver from explicit collaborators
    pub fn with_parts(store: &'a SettingsStore, maps: MapsClient<'a>, interfaces: T) -> Self {
        Self {
            store,
            maps,
            interfaces,
            address_override: None,
        }
    }

    /// Geocode this address instead of the configured one
    ///
    /// Required when `server = yes`, since the address then never comes from
    /// the settings file.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address_override = Some(address.into());
        self
    }

    /// Resolve the coordinates for this run
    ///
    /// # Returns
    /// * `Ok(Coordinates)` from the cache or a freshly cached lookup
    /// * `Err(LocateError::MissingConfig)` after generating a default config
    /// * `Err(LocateError)` for fatal lookup failures
    pub async fn resolve(&self) -> Result<Coordinates, LocateError> {
        if !self.store.exists() {
            self.store.initialize_defaults()?;
            return Err(LocateError::MissingConfig(self.store.path().to_path_buf()));
        }

        let cached = self.store.read(COORDINATES)?;
        if !cached.trim().is_empty() {
            tracing::debug!(coordinates = %cached, "using cached coordinates");
            return Coordinates::parse(&cached);
        }

        let coordinates = match self.locate_by_mac().await {
            Ok(coordinates) => coordinates,
            Err(err) if err.allows_fallback() => {
                tracing::warn!(error = %err, "geolocation by MAC address failed, geocoding home address");
                self.locate_by_address().await?
            }
            Err(err) => return Err(err),
        };

        self.store.write(COORDINATES, &coordinates.to_string())?;
        tracing::info!(%coordinates, "wrote coordinates to rain.conf");
        Ok(coordinates)
    }

    async fn locate_by_mac(&self) -> Result<Coordinates, LocateError> {
        let mac = device_mac(self.store, &self.interfaces)?;
        tracing::info!("obtaining coordinates via geolocation of MAC address");
        self.maps.geolocate(&mac).await
    }

    async fn locate_by_address(&self) -> Result<Coordinates, LocateError> {
        let address = self.home_address()?;
        tracing::info!("obtaining coordinates via geocoding of home address");
        self.maps.geocode(&address).await
    }

    fn home_address(&self) -> Result<String, LocateError> {
        let raw = match &self.address_override {
            Some(address) => address.clone(),
            None if self.store.server_mode()? => return Err(LocateError::MissingAddress),
            None => self.store.read(ADDRESS)?,
        };

        let address = normalize_address(&raw);
        if address.is_empty() {
            return Err(LocateError::MissingAddress);
        }
        Ok(address)
    }
}

/// Strips ASCII punctuation and collapses runs of whitespace
pub fn normalize_address(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
