//! Runtime configuration.
//!
//! Read from an optional TOML file, then artifact paths may be overridden
//! from the environment (a `.env` file is honoured by the binary). A missing
//! file means defaults; a file that exists but does not parse is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::observation::ValidationRules;
use crate::data::preprocessing::MissingScalerPolicy;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "rainfall.toml";

pub const ENV_CLASSIFIER_PATH: &str = "RAINFALL_CLASSIFIER_PATH";
pub const ENV_ROBUST_SCALER_PATH: &str = "RAINFALL_ROBUST_SCALER_PATH";
pub const ENV_MINMAX_SCALER_PATH: &str = "RAINFALL_MINMAX_SCALER_PATH";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub artifacts: ArtifactPaths,
    pub validation: ValidationConfig,
    pub scaling: ScalingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub robust_scaler: PathBuf,
    pub minmax_scaler: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        ArtifactPaths {
            classifier: PathBuf::from("best_xgb.bin"),
            robust_scaler: PathBuf::from("scaler_robust.bin"),
            minmax_scaler: PathBuf::from("scaler_minmax.bin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Treat an exact 0 as "not filled in", as the entry form does.
    pub treat_zero_as_missing: bool,
    pub enforce_ranges: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            treat_zero_as_missing: true,
            enforce_ranges: true,
        }
    }
}

impl ValidationConfig {
    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            zero_is_missing: self.treat_zero_as_missing,
            enforce_ranges: self.enforce_ranges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    pub missing_scaler: MissingScalerPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "rainfall_classifier=info".to_string(),
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults if it does not exist, then applies
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let targets = [
            (ENV_CLASSIFIER_PATH, &mut self.artifacts.classifier),
            (ENV_ROBUST_SCALER_PATH, &mut self.artifacts.robust_scaler),
            (ENV_MINMAX_SCALER_PATH, &mut self.artifacts.minmax_scaler),
        ];
        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = PathBuf::from(value);
            }
        }
    }
}
