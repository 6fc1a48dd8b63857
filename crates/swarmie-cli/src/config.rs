//! Node configuration – reads/writes `~/.swarmie/localization.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use swarmie_localization::LocalizationConfig;
use swarmie_types::SwarmieError;

/// Persisted node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket port of the snapshot bridge. `0` disables the bridge.
    #[serde(default = "default_bridge_port")]
    pub bridge_port: u16,

    /// Per-topic broadcast buffer length.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Scale constants and heading policy of the localization core.
    #[serde(default)]
    pub localization: LocalizationConfig,
}

fn default_bridge_port() -> u16 {
    9091
}
fn default_bus_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_port: default_bridge_port(),
            bus_capacity: default_bus_capacity(),
            localization: LocalizationConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), SwarmieError> {
        if self.bus_capacity == 0 {
            return Err(SwarmieError::Config("bus_capacity must be at least 1".to_string()));
        }
        let p = &self.localization.projection;
        let px = &self.localization.pixels;
        let scales = [
            ("projection.lon_meters_per_degree", p.lon_meters_per_degree),
            ("projection.lat_meters_per_degree", p.lat_meters_per_degree),
            ("pixels.pixels_per_meter", px.pixels_per_meter),
        ];
        for (name, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(SwarmieError::Config(format!(
                    "localization.{name} must be a positive number, got {value}"
                )));
            }
        }
        if !px.image_offset_m.is_finite() {
            return Err(SwarmieError::Config(
                "localization.pixels.image_offset_m must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Return the path to `~/.swarmie/localization.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".swarmie").join("localization.toml")
}

/// Read and validate the config file at `path`.
///
/// Returns `None` if the file does not exist. Environment overrides are not
/// applied here; see [`load`].
pub fn load_from(path: &Path) -> Result<Option<Config>, SwarmieError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| SwarmieError::Config(format!("failed to parse {}: {e}", path.display())))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Effective configuration: the file at `path` (or defaults when absent)
/// with `SWARMIE_*` overrides applied.
pub fn load(path: &Path) -> Result<Config, SwarmieError> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

/// Apply `SWARMIE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SWARMIE_BRIDGE_PORT` | `bridge_port` |
/// | `SWARMIE_BUS_CAPACITY` | `bus_capacity` |
/// | `SWARMIE_HEADING_WRAP` | `localization.heading_wrap` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(port) = env_parse("SWARMIE_BRIDGE_PORT") {
        cfg.bridge_port = port;
    }
    if let Some(capacity) = env_parse("SWARMIE_BUS_CAPACITY") {
        cfg.bus_capacity = capacity;
    }
    if let Some(wrap) = env_parse("SWARMIE_HEADING_WRAP") {
        cfg.localization.heading_wrap = wrap;
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

/// Save the config to `path`, creating parent directories as needed.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), SwarmieError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| SwarmieError::Serialization(e.to_string()))?;
    fs::write(path, raw)?;
    Ok(())
}

/// Platform name used when none is given on the command line.
///
/// Tries `HOSTNAME`, then `/etc/hostname`, then falls back to `"swarmie"`.
pub fn default_platform_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "swarmie".to_string())
}
