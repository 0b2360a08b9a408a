// src/config.rs

use crate::analysis::KinematicCalculator;
use crate::error::ConfigError;
use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    /// Read a YAML config. Missing sections fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        KinematicCalculator::new(self.calibration)?;
        if self.reference.ph_min >= self.reference.ph_max {
            return Err(ConfigError::InvalidPhRange {
                min: self.reference.ph_min,
                max: self.reference.ph_max,
            });
        }
        if self.input.extensions.is_empty() {
            return Err(ConfigError::NoInputExtensions);
        }
        Ok(())
    }
}
