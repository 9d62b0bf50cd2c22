//! Engine limits and defaults.
//!
//! An [`EngineConfig`] is usually built with [`Default`] and optionally
//! loaded from YAML:
//!
//! ```yaml
//! additive_brightness: { min: -1.0, max: 1.0 }
//! multiplicative_brightness: { min: 0.0, max: 4.0 }
//! max_contrast_coefficient: 100.0
//! default_threshold: 0.5
//! interpolation: bilinear
//! max_enlarge_edge: 16384
//! max_reduce_factor: 1024.0
//! ```
//!
//! Missing keys keep their defaults; unknown keys are rejected.

use std::path::{Path, PathBuf};

use pixlab_ops::Interpolation;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File does not exist.
    #[error("config file not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A value is out of its allowed range.
    #[error("invalid config value '{field}': {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
}

impl Bounds {
    /// Creates bounds.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `v` lies inside.
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        format!("a number in [{}, {}]", self.min, self.max)
    }
}

/// Tunable limits and defaults used while validating requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Accepted factors for additive brightness.
    pub additive_brightness: Bounds,
    /// Accepted factors for multiplicative brightness.
    pub multiplicative_brightness: Bounds,
    /// Upper limit for the contrast `k` / `gamma` coefficient.
    pub max_contrast_coefficient: f32,
    /// Threshold used by binarize when the request gives none.
    pub default_threshold: f32,
    /// Interpolation used by rotate when the request gives none.
    pub interpolation: Interpolation,
    /// Largest edge an enlarge-region target may have.
    pub max_enlarge_edge: u32,
    /// Largest reduce-resolution factor.
    pub max_reduce_factor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            additive_brightness: Bounds::new(-1.0, 1.0),
            multiplicative_brightness: Bounds::new(0.0, 4.0),
            max_contrast_coefficient: 100.0,
            default_threshold: 0.5,
            interpolation: Interpolation::Bilinear,
            max_enlarge_edge: 16384,
            max_reduce_factor: 1024.0,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "loading engine config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every limit is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        let ordered = |field: &'static str, b: &Bounds| {
            if b.min.is_finite() && b.max.is_finite() && b.min <= b.max {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected finite min <= max, got [{}, {}]", b.min, b.max),
                })
            }
        };
        ordered("additive_brightness", &self.additive_brightness)?;
        ordered("multiplicative_brightness", &self.multiplicative_brightness)?;
        if self.multiplicative_brightness.min < 0.0 {
            return Err(ConfigError::Invalid {
                field: "multiplicative_brightness",
                reason: "multipliers cannot be negative".into(),
            });
        }
        if !(self.max_contrast_coefficient.is_finite() && self.max_contrast_coefficient > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_contrast_coefficient",
                reason: "must be a positive number".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(ConfigError::Invalid {
                field: "default_threshold",
                reason: "must be in [0, 1]".into(),
            });
        }
        if self.max_enlarge_edge == 0 {
            return Err(ConfigError::Invalid {
                field: "max_enlarge_edge",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.max_reduce_factor.is_finite() && self.max_reduce_factor >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "max_reduce_factor",
                reason: "must be a number >= 1".into(),
            });
        }
        Ok(())
    }
}
