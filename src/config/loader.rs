// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ACTION_ATTRIBUTE, DEFAULT_BIND_ATTRIBUTE, DEFAULT_CONTEXT_ATTRIBUTE,
    DEFAULT_FRAGMENT_EXTENSION, DEFAULT_FUEL_LEVEL, DEFAULT_LOAD_ATTRIBUTE,
    DEFAULT_TOGGLE_ATTRIBUTE, MAX_FRAGMENT_SIZE, MAX_FUEL_LEVEL, MIN_FUEL_LEVEL,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the binding engine.
///
/// Every section is optional; an empty file yields the built-in defaults.
///
/// # Fields
/// * `attributes` - Names of the five markup attributes the engine reacts to
/// * `fragments` - Where fragment sources come from and how identifiers are normalized
/// * `wasm` - WASM fragment execution limits
/// * `store` - Initial store contents (any JSON-shaped mapping)
///
/// # Example
/// ```yaml
/// attributes:
///   bind: data-bind
///   load: data-load
/// fragments:
///   extension: .frag
///   root: ./public
/// wasm:
///   fuel:
///     default: 100000000
///     maximum: 500000000
/// store:
///   counter: "0"
///   products: []
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub attributes: AttributeNames,
    #[serde(default)]
    pub fragments: FragmentOptions,
    #[serde(default)]
    pub wasm: WasmConfig,
    #[serde(default)]
    pub store: serde_json::Value,
}

/// The attribute protocol. Each role can be renamed, e.g. to avoid clashing
/// with another library that also uses `data-bind`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AttributeNames {
    pub bind: String,
    pub toggle: String,
    pub action: String,
    pub load: String,
    pub context: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ATTRIBUTE.to_string(),
            toggle: DEFAULT_TOGGLE_ATTRIBUTE.to_string(),
            action: DEFAULT_ACTION_ATTRIBUTE.to_string(),
            load: DEFAULT_LOAD_ATTRIBUTE.to_string(),
            context: DEFAULT_CONTEXT_ATTRIBUTE.to_string(),
        }
    }
}

impl AttributeNames {
    /// `(role, attribute name)` pairs, in a fixed order.
    pub fn roles(&self) -> [(&'static str, &str); 5] {
        [
            ("bind", self.bind.as_str()),
            ("toggle", self.toggle.as_str()),
            ("action", self.action.as_str()),
            ("load", self.load.as_str()),
            ("context", self.context.as_str()),
        ]
    }
}

/// Fragment loading options.
///
/// # Fields
/// * `extension` - Appended to identifiers that do not already end with it (defaults to `.frag`)
/// * `root` - Directory fragments are read from (filesystem source)
/// * `base_url` - URL fragments are fetched from (HTTP source)
/// * `max_size_bytes` - Upper bound on one fragment source (defaults to 16 MB)
///
/// At most one of `root` and `base_url` may be set. With neither, fragments
/// are read relative to the working directory.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FragmentOptions {
    pub extension: String,
    pub root: Option<PathBuf>,
    pub base_url: Option<String>,
    pub max_size_bytes: usize,
}

impl Default for FragmentOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_FRAGMENT_EXTENSION.to_string(),
            root: None,
            base_url: None,
            max_size_bytes: MAX_FRAGMENT_SIZE,
        }
    }
}

/// WASM-specific configuration options.
///
/// # Example
/// ```yaml
/// wasm:
///   fuel:
///     default: 100000000
///     minimum: 1000000
///     maximum: 500000000
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct WasmConfig {
    #[serde(default)]
    pub fuel: FuelConfig,
}

/// Fuel budget for one WASM fragment render.
///
/// Fuel limits stop runaway fragments by bounding the number of instructions
/// a single `render` call may execute. The maximum is a hard limit.
///
/// # Example
/// ```yaml
/// fuel:
///   default: 100000000   # 100 million instructions
///   minimum: 1000000     # 1 million instructions
///   maximum: 500000000   # 500 million instructions (hard limit)
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Clamps a requested fuel level to `[minimum, maximum]`.
    ///
    /// # Example
    /// ```
    /// use soulbind::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// let fuel = config.validate_and_clamp(1_000_000_000); // Too high
    /// assert_eq!(fuel, 500_000_000); // Clamped to maximum
    /// ```
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        let min = self.get_minimum();
        let max = self.get_maximum().max(min);
        requested.clamp(min, max)
    }

    /// The configured default, clamped.
    pub fn effective(&self) -> u64 {
        self.validate_and_clamp(self.get_default())
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.attributes, AttributeNames::default());
        assert_eq!(cfg.attributes.bind, "data-bind");
        assert_eq!(cfg.fragments.extension, ".frag");
        assert_eq!(cfg.fragments.max_size_bytes, MAX_FRAGMENT_SIZE);
        assert!(cfg.store.is_null());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
attributes:
  bind: x-bind
  toggle: x-toggle
fragments:
  extension: .tpl
  base_url: https://cdn.example.com/fragments/
store:
  counter: "0"
  products:
    - name: Tile
      price: 12.99
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.attributes.bind, "x-bind");
        assert_eq!(cfg.attributes.toggle, "x-toggle");
        assert_eq!(cfg.attributes.action, "data-action");
        assert_eq!(cfg.fragments.extension, ".tpl");
        assert_eq!(
            cfg.fragments.base_url.as_deref(),
            Some("https://cdn.example.com/fragments/")
        );
        assert_eq!(cfg.store["products"][0]["price"], serde_json::json!(12.99));
    }

    #[test]
    fn test_wasm_config_defaults() {
        let cfg: Config = serde_yaml::from_str("store: {}").unwrap();

        assert_eq!(cfg.wasm.fuel.get_default(), 100_000_000);
        assert_eq!(cfg.wasm.fuel.get_minimum(), 1_000_000);
        assert_eq!(cfg.wasm.fuel.get_maximum(), 500_000_000);
    }

    #[test]
    fn test_wasm_config_partial_override() {
        let yaml = r#"
wasm:
  fuel:
    default: 150000000
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.wasm.fuel.get_default(), 150_000_000);
        assert_eq!(cfg.wasm.fuel.get_minimum(), 1_000_000);
        assert_eq!(cfg.wasm.fuel.get_maximum(), 500_000_000);
    }

    #[test]
    fn test_fuel_config_validate_and_clamp() {
        let config = FuelConfig {
            default: Some(100_000_000),
            minimum: Some(10_000_000),
            maximum: Some(200_000_000),
        };

        assert_eq!(config.validate_and_clamp(50_000_000), 50_000_000);
        assert_eq!(config.validate_and_clamp(1_000_000), 10_000_000);
        assert_eq!(config.validate_and_clamp(1_000_000_000), 200_000_000);
        assert_eq!(config.validate_and_clamp(10_000_000), 10_000_000);
        assert_eq!(config.validate_and_clamp(200_000_000), 200_000_000);
    }

    #[test]
    fn test_effective_fuel_clamps_default() {
        let config = FuelConfig {
            default: Some(900_000_000),
            minimum: None,
            maximum: None,
        };
        assert_eq!(config.effective(), MAX_FUEL_LEVEL);

        // An inverted range does not panic; the minimum wins.
        let inverted = FuelConfig {
            default: None,
            minimum: Some(10),
            maximum: Some(5),
        };
        assert_eq!(inverted.effective(), 10);
    }
}
