//! Configuration with a layered hierarchy.
//!
//! Later layers override earlier ones:
//!
//! 1. Built-in defaults
//! 2. Config file (`--config PATH`, else `estimate.toml` in the working directory)
//! 3. Environment variables (`ESTIMATE_TOP_N`, `ESTIMATE_CURRENCY`,
//!    `ESTIMATE_DATA_DIR`, `ESTIMATE_AREA_UNIT`)
//! 4. Command-line flags, applied by the caller
//!
//! ```toml
//! top_n = 3
//! currency = "EUR"
//! data_dir = "/srv/estimate/data"
//! default_area_unit = "sqft"
//! default_report_format = "html"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::DEFAULT_TOP_N;
use crate::project::DEFAULT_REPORT_FORMAT;
use crate::units::AreaUnit;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "estimate.toml";

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of ranked cost items kept in `top_items`
    pub top_n: usize,

    /// Currency code for document reports, unless the project names one
    pub currency: String,

    /// Directory with `materials_<unit>.json` / `prices_<unit>.json`
    /// overriding the built-in tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Area unit for projects that name none
    pub default_area_unit: AreaUnit,

    /// Report format for projects that name none
    pub default_report_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            top_n: DEFAULT_TOP_N,
            currency: "USD".to_string(),
            data_dir: None,
            default_area_unit: AreaUnit::SquareMeters,
            default_report_format: DEFAULT_REPORT_FORMAT.to_string(),
        }
    }
}

/// One config layer; unset fields leave the layer below untouched
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsLayer {
    top_n: Option<usize>,
    currency: Option<String>,
    data_dir: Option<PathBuf>,
    default_area_unit: Option<AreaUnit>,
    default_report_format: Option<String>,
}

impl Settings {
    /// Load settings from the config file and the process environment.
    ///
    /// An explicit `path` must exist. Without one, `estimate.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> EstimateResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// [`Settings::load`] with an injectable environment lookup
    pub fn load_with_env(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> EstimateResult<Self> {
        let mut settings = Settings::default();

        match path {
            Some(path) => settings.merge(Self::read_layer(path)?),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    settings.merge(Self::read_layer(local)?);
                }
            }
        }

        settings.merge(Self::env_layer(env)?);

        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Parse settings from TOML text over the defaults
    pub fn from_toml(contents: &str) -> EstimateResult<Self> {
        let layer: SettingsLayer =
            toml::from_str(contents).map_err(|e| EstimateError::serialization(format!("Invalid config: {}", e)))?;
        let mut settings = Settings::default();
        settings.merge(layer);
        Ok(settings)
    }

    fn read_layer(path: &Path) -> EstimateResult<SettingsLayer> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EstimateError::file_error("read config", path.display().to_string(), e.to_string()))?;
        toml::from_str(&contents)
            .map_err(|e| EstimateError::serialization(format!("Invalid config in {}: {}", path.display(), e)))
    }

    fn env_layer(env: impl Fn(&str) -> Option<String>) -> EstimateResult<SettingsLayer> {
        let top_n = match env("ESTIMATE_TOP_N") {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                EstimateError::invalid_input("ESTIMATE_TOP_N", raw.clone(), "expected a non-negative integer")
            })?),
            None => None,
        };

        Ok(SettingsLayer {
            top_n,
            currency: env("ESTIMATE_CURRENCY").filter(|c| !c.trim().is_empty()),
            data_dir: env("ESTIMATE_DATA_DIR").filter(|d| !d.is_empty()).map(PathBuf::from),
            default_area_unit: env("ESTIMATE_AREA_UNIT").map(|u| AreaUnit::parse_lenient(&u)),
            default_report_format: None,
        })
    }

    /// Merge another layer into this one (other takes precedence)
    fn merge(&mut self, other: SettingsLayer) {
        if let Some(top_n) = other.top_n {
            self.top_n = top_n;
        }
        if let Some(currency) = other.currency {
            self.currency = currency;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if let Some(unit) = other.default_area_unit {
            self.default_area_unit = unit;
        }
        if let Some(format) = other.default_report_format {
            self.default_report_format = format;
        }
    }
}
