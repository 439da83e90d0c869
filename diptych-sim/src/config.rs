//! Simulator configuration
//!
//! Loads `display.toml`. Falls back to the copy embedded at build time
//! when no path is given.

use std::fmt;
use std::path::Path;

use diptych_core::config::FrameConfig;
use diptych_core::ConfigError;
use serde::Deserialize;
use tracing::info;

/// Configuration compiled into the binary
const EMBEDDED_CONFIG: &str = include_str!("../display.toml");

/// Simulation knobs that have no meaning on hardware
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Stop after this many frames reach the panel (0 = run forever)
    pub frames: u32,
    /// CPU time the producer spends per frame, in microseconds
    pub render_cost_us: u32,
}

/// Full simulator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimConfig {
    pub display: FrameConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Configuration loading errors
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read
    Io(std::io::Error),
    /// TOML syntax or schema error
    TomlParse(toml::de::Error),
    /// Parsed values rejected by the engine
    Invalid(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "cannot read config: {e}"),
            LoadError::TomlParse(e) => write!(f, "invalid TOML: {e}"),
            LoadError::Invalid(e) => write!(f, "invalid display config: {e:?}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<toml::de::Error> for LoadError {
    fn from(e: toml::de::Error) -> Self {
        LoadError::TomlParse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Parse and validate a configuration for frame buffers of `capacity` pixels
pub fn parse_config(text: &str, capacity: usize) -> Result<SimConfig, LoadError> {
    let config: SimConfig = toml::from_str(text)?;
    config.display.validate(capacity)?;
    Ok(config)
}

/// Load configuration from `path`, or the embedded default
pub fn load(path: Option<&Path>, capacity: usize) -> Result<SimConfig, LoadError> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let text = std::fs::read_to_string(path)?;
            parse_config(&text, capacity)
        }
        None => {
            info!("Using embedded configuration");
            parse_config(EMBEDDED_CONFIG, capacity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPACITY: usize = 240 * 320;

    #[test]
    fn test_embedded_config_is_valid() {
        let config = parse_config(EMBEDDED_CONFIG, CAPACITY).unwrap();
        assert_eq!(config.display.width, 240);
        assert_eq!(config.display.height, 320);
        assert_eq!(config.display.max_batch_pixels, 0x4000);
        assert_eq!(config.display.bus_frequency_hz, 40_000_000);
        assert!(config.display.swap_bytes);
        assert_eq!(config.display.busy_poll_limit, None);
        assert_eq!(config.simulation.frames, 600);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = parse_config("[display]\nbusy_poll_limit = 50\n", CAPACITY).unwrap();
        assert_eq!(config.display.busy_poll_limit, Some(50));
        assert_eq!(config.display.width, 240);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_rejects_geometry_mismatch() {
        let err = parse_config("[display]\nwidth = 320\nheight = 480\n", CAPACITY).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(ConfigError::CapacityMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_batch() {
        let err = parse_config("[display]\nmax_batch_pixels = 0\n", CAPACITY).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::ZeroBatch)));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = parse_config("[display\nwidth = ", CAPACITY).unwrap_err();
        assert!(matches!(err, LoadError::TomlParse(_)));
    }
}
