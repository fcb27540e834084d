//! Settings module for the `rain.conf` configuration file
//!
//! This module provides a settings store that reads and rewrites a single
//! `[Settings]` section of key/value pairs. It doubles as the cache for values
//! resolved at runtime (MAC address, coordinates), so every write is persisted
//! immediately and leaves the rest of the file untouched.

mod store;

pub use store::{SettingsError, SettingsStore, UnitSystem};

/// Cached `"lat, lon"` string
pub const COORDINATES: &str = "coordinates";
/// Cached device MAC address
pub const MAC: &str = "mac";
/// Home address used for geocoding
pub const ADDRESS: &str = "address";
/// Maps provider API key (geolocation and geocoding)
pub const MAPS_KEY: &str = "maps_key";
/// Forecast provider API key
pub const DARKSKY_KEY: &str = "darksky_key";
/// Units of measurement requested from the forecast provider
pub const UNITS: &str = "units";
/// Whether the address is supplied by a calling server instead of this file
pub const SERVER: &str = "server";
