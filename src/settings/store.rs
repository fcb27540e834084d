//! Settings store backed by `rain.conf`
//!
//! Provides a `SettingsStore` that reads and rewrites individual keys of the
//! `[Settings]` section. Rewrites touch only the line holding the key, so
//! comments and the other keys survive every cache update.

use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{ADDRESS, COORDINATES, DARKSKY_KEY, MAC, MAPS_KEY, SERVER, UNITS};

/// Name of the only section in the configuration file
const SECTION: &str = "Settings";

/// File name of the configuration file inside the config directory
const FILE_NAME: &str = "rain.conf";

/// Errors that can occur when accessing the configuration file
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration file has not been created yet
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing the configuration file failed
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Units of measurement understood by the forecast provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    /// Provider picks units based on the location
    #[default]
    Auto,
    /// Imperial units
    Us,
    /// SI units
    Si,
    /// SI with km/h wind speed
    Ca,
    /// SI with miles and mph
    Uk2,
}

impl UnitSystem {
    /// Parses a `units` setting. Empty or unknown values mean `Auto`.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "us" => UnitSystem::Us,
            "si" => UnitSystem::Si,
            "ca" => UnitSystem::Ca,
            "uk2" | "uk" => UnitSystem::Uk2,
            _ => UnitSystem::Auto,
        }
    }

    /// Value sent to the provider as the `units` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Auto => "auto",
            UnitSystem::Us => "us",
            UnitSystem::Si => "si",
            UnitSystem::Ca => "ca",
            UnitSystem::Uk2 => "uk2",
        }
    }

    /// Temperature suffix shown after a degree value
    pub fn temperature_label(&self) -> &'static str {
        match self {
            UnitSystem::Auto | UnitSystem::Us => "F",
            UnitSystem::Si | UnitSystem::Ca | UnitSystem::Uk2 => "C",
        }
    }

    /// Wind speed unit
    pub fn speed_label(&self) -> &'static str {
        match self {
            UnitSystem::Auto | UnitSystem::Us | UnitSystem::Uk2 => "mph",
            UnitSystem::Si => "m/s",
            UnitSystem::Ca => "km/h",
        }
    }

    /// Distance unit used for visibility and storm distance
    pub fn distance_label(&self) -> &'static str {
        match self {
            UnitSystem::Auto | UnitSystem::Us | UnitSystem::Uk2 => "mi.",
            UnitSystem::Si | UnitSystem::Ca => "km",
        }
    }

    /// Precipitation intensity unit
    pub fn precipitation_label(&self) -> &'static str {
        match self {
            UnitSystem::Auto | UnitSystem::Us => "in/hr",
            UnitSystem::Si | UnitSystem::Ca | UnitSystem::Uk2 => "mm/h",
        }
    }
}

/// Reads and writes settings in a single configuration file
///
/// The file lives in the XDG config directory (`~/.config/rain/rain.conf` on
/// Linux) unless an explicit path is given. Every write is persisted
/// immediately; there is no locking, so the last writer wins.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store for the default configuration file location
    ///
    /// Returns `None` if the config directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "rain")?;
        let path = project_dirs.config_dir().join(FILE_NAME);
        Some(Self { path })
    }

    /// Creates a store for an explicit configuration file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the configuration file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the value of `key`, returning an empty string when it is absent
    ///
    /// # Returns
    /// * `Ok(String)` with the trimmed value, or `""` if the key is not set
    /// * `Err(SettingsError::NotFound)` if the configuration file does not exist
    pub fn read(&self, key: &str) -> Result<String, SettingsError> {
        let content = self.load()?;
        Ok(find_value(&content, key).unwrap_or_default())
    }

    /// Sets `key` to `value` and persists the file immediately
    ///
    /// Only the line holding `key` is rewritten. A key missing from the
    /// section is appended to it.
    pub fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let content = self.load()?;
        let updated = set_value(&content, key, value);
        fs::write(&self.path, updated).map_err(|source| self.io_error(source))?;
        tracing::debug!(key, path = %self.path.display(), "setting written");
        Ok(())
    }

    /// Resets `key` to an empty value
    pub fn clear(&self, key: &str) -> Result<(), SettingsError> {
        self.write(key, "")
    }

    /// Writes a fresh configuration file with documented blank fields
    ///
    /// Creates the parent directory if needed and overwrites any existing file.
    pub fn initialize_defaults(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        fs::write(&self.path, default_config()).map_err(|source| self.io_error(source))?;
        tracing::info!(path = %self.path.display(), "generated default configuration");
        Ok(())
    }

    /// Configured units of measurement
    pub fn units(&self) -> Result<UnitSystem, SettingsError> {
        Ok(UnitSystem::from_setting(&self.read(UNITS)?))
    }

    /// Whether the address is supplied by a calling server (`server = yes`)
    pub fn server_mode(&self) -> Result<bool, SettingsError> {
        Ok(self.read(SERVER)?.trim().eq_ignore_ascii_case("yes"))
    }

    fn load(&self) -> Result<String, SettingsError> {
        if !self.exists() {
            return Err(SettingsError::NotFound(self.path.clone()));
        }
        fs::read_to_string(&self.path).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// A classified line of the configuration file
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Section(&'a str),
    Entry { key: &'a str, value: &'a str },
    Other,
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
        return Line::Other;
    }
    if let Some(name) = trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return Line::Section(name.trim());
    }
    // The first delimiter wins so values may contain ':' (MAC addresses)
    match trimmed.find(['=', ':']) {
        Some(pos) => Line::Entry {
            key: trimmed[..pos].trim(),
            value: trimmed[pos + 1..].trim(),
        },
        None => Line::Entry {
            key: trimmed,
            value: "",
        },
    }
}

fn find_value(content: &str, key: &str) -> Option<String> {
    let mut in_section = false;
    for line in content.lines() {
        match classify(line) {
            Line::Section(name) => in_section = name == SECTION,
            Line::Entry { key: k, value } if in_section && k == key => {
                return Some(value.to_string());
            }
            _ => {}
        }
    }
    None
}

fn format_entry(key: &str, value: &str) -> String {
    format!("{key} = {value}").trim_end().to_string()
}

fn set_value(content: &str, key: &str, value: &str) -> String {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let mut in_section = false;
    let mut section_found = false;
    let mut existing = None;
    // Index after the last non-blank line of the section
    let mut insert_at = None;

    for (idx, line) in lines.iter().enumerate() {
        match classify(line) {
            Line::Section(name) => {
                in_section = name == SECTION;
                if in_section {
                    section_found = true;
                    insert_at = Some(idx + 1);
                }
            }
            Line::Entry { key: k, .. } if in_section && k == key => {
                existing = Some(idx);
                break;
            }
            _ if in_section && !line.trim().is_empty() => insert_at = Some(idx + 1),
            _ => {}
        }
    }

    let entry = format_entry(key, value);
    match (existing, insert_at) {
        (Some(idx), _) => lines[idx] = entry,
        (None, Some(idx)) if section_found => lines.insert(idx, entry),
        _ => {
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(format!("[{SECTION}]"));
            lines.push(entry);
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Builder for the commented default configuration file
struct ConfigBuilder {
    lines: Vec<String>,
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            lines: vec![format!("[{SECTION}]")],
        }
    }

    fn add_setting(mut self, key: &str, value: &str, comments: &[&str]) -> Self {
        if self.lines.len() > 1 {
            self.lines.push(String::new());
        }
        self.lines
            .extend(comments.iter().map(|comment| format!("# {comment}")));
        self.lines.push(format_entry(key, value));
        self
    }

    fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

fn default_config() -> String {
    ConfigBuilder::new()
        .add_setting(
            COORDINATES,
            "",
            &[
                "Your location in geocoordinates latitude and longitude",
                "Rain will obtain these automatically by mac or residential (home) address (set below)",
                "Clear this value (or run with --relocate) to look your location up again",
            ],
        )
        .add_setting(
            DARKSKY_KEY,
            "",
            &[
                "Your Dark Sky API key. This is required!",
                "Register here: https://darksky.net/dev/register",
            ],
        )
        .add_setting(
            MAPS_KEY,
            "",
            &[
                "Your Google Maps API key.",
                "You can get a key here: https://developers.google.com/maps/documentation/geolocation/get-api-key",
                "Enable the Google Maps Geolocation API and Google Maps Geocoding API",
            ],
        )
        .add_setting(
            UNITS,
            UnitSystem::Auto.as_str(),
            &[
                "Units of measurement. 'auto' is the default.",
                "Units: auto, ca, uk2, us, si",
            ],
        )
        .add_setting(
            ADDRESS,
            "",
            &[
                "Your residential (home) address. Used in case geolocation by mac fails.",
                "Enter address with no punctuation.",
            ],
        )
        .add_setting(
            MAC,
            "",
            &["MAC address, used for geolocation. Leave blank, Rain will cache your MAC address here"],
        )
        .add_setting(
            SERVER,
            "no",
            &[
                "Set to 'yes' if the address is supplied by a calling server, otherwise 'no'.",
                "'yes' disables reading the address from this file",
            ],
        )
        .build()
}
