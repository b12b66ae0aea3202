// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "tour_config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid tour constraints: {0}")]
    Invalid(String),
}

/// Search constraints. Distances are nautical miles, angles degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    pub max_attempts: u32,
    pub min_legs: u32,
    pub max_legs: u32,
    pub min_leg_dist_nm: f64,
    pub max_leg_dist_nm: f64,
    pub max_bearing_change: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            max_attempts: 25,
            min_legs: 3,
            max_legs: 8,
            min_leg_dist_nm: 2.0,
            max_leg_dist_nm: 20.0,
            max_bearing_change: 75.0,
        }
    }
}

impl TourConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.min_legs > self.max_legs {
            return Err(ConfigError::Invalid(format!(
                "min_legs ({}) exceeds max_legs ({})",
                self.min_legs, self.max_legs
            )));
        }
        if !self.min_leg_dist_nm.is_finite()
            || !self.max_leg_dist_nm.is_finite()
            || self.min_leg_dist_nm < 0.0
        {
            return Err(ConfigError::Invalid(
                "leg distances must be finite and non-negative".to_string(),
            ));
        }
        if self.min_leg_dist_nm > self.max_leg_dist_nm {
            return Err(ConfigError::Invalid(format!(
                "min_leg_dist_nm ({}) exceeds max_leg_dist_nm ({})",
                self.min_leg_dist_nm, self.max_leg_dist_nm
            )));
        }
        if !(self.max_bearing_change > 0.0 && self.max_bearing_change <= 180.0) {
            return Err(ConfigError::Invalid(format!(
                "max_bearing_change must be in (0, 180], got {}",
                self.max_bearing_change
            )));
        }
        Ok(())
    }

    /// Reads a config file. Missing keys fall back to the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads from the user config directory, or returns defaults when nothing is saved.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            log::debug!("Loading tour config — path={}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        crate::get_config_root().join(CONFIG_FILE_NAME)
    }
}
