//! Device MAC address discovery
//!
//! The MAC address is read from the settings cache when present. Otherwise the
//! local network interface listing is scanned and the first hardware address
//! found is cached for later runs.

use std::io;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use super::LocateError;
use crate::settings::{SettingsStore, MAC};

/// Six colon-separated hex groups, e.g. `08:00:27:4e:66:a1`. Some tools drop
/// the leading zero of a group (`8:0:27:4e:66:a1`).
static MAC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:[0-9A-Fa-f]{1,2}:){5}[0-9A-Fa-f]{1,2}\b").unwrap());

/// Loopback interfaces report this address
const NULL_MAC: &str = "00:00:00:00:00:00";

/// Source of the local network interface listing
pub trait InterfaceTable {
    /// Returns the raw text listing of network interfaces
    fn listing(&self) -> io::Result<String>;
}

/// Reads the interface table from `ifconfig`, falling back to `ip link`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceTable for SystemInterfaces {
    fn listing(&self) -> io::Result<String> {
        match run("ifconfig", &[]) {
            Ok(output) => Ok(output),
            Err(err) => {
                tracing::debug!(error = %err, "ifconfig unavailable, trying `ip link`");
                run("ip", &["link"])
            }
        }
    }
}

fn run(program: &str, args: &[&str]) -> io::Result<String> {
    let output = Command::new(program).args(args).output()?;
    if !output.status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{program} exited with {}", output.status),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Returns the first non-null hardware address in an interface listing
///
/// The address is lowercased with every group padded to two digits.
pub fn extract_mac(listing: &str) -> Option<String> {
    MAC_PATTERN
        .find_iter(listing)
        .map(|m| normalize_mac(m.as_str()))
        .find(|mac| mac != NULL_MAC)
}

fn normalize_mac(mac: &str) -> String {
    mac.split(':')
        .map(|group| format!("{:0>2}", group.to_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join(":")
}

/// Returns the device MAC address, caching it in settings on first discovery
pub fn device_mac(
    store: &SettingsStore,
    interfaces: &impl InterfaceTable,
) -> Result<String, LocateError> {
    let cached = store.read(MAC)?;
    if !cached.is_empty() {
        tracing::debug!(mac = %cached, "using cached MAC address");
        return Ok(cached);
    }

    let listing = interfaces
        .listing()
        .map_err(|err| LocateError::MacUnavailable(err.to_string()))?;
    let mac = extract_mac(&listing).ok_or_else(|| {
        LocateError::MacUnavailable("no hardware address in interface table".to_string())
    })?;

    store.write(MAC, &mac)?;
    tracing::info!(mac = %mac, "cached MAC address");
    Ok(mac)
}
