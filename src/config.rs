//! Render Configuration
//!
//! Persisted as pretty-printed JSON. Missing fields fall back to defaults so
//! older config files keep loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scale::{ScalerKind, MAX_SCALE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub scaler: ScalerKind,
    pub vsync: bool,
    /// Skip SIMD palette expansion even when the CPU supports it
    pub force_scalar: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scaler: ScalerKind::default(),
            vsync: true,
            force_scalar: false,
        }
    }
}

impl RenderConfig {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        if !config.scaler.is_valid() {
            return Err(ConfigError::BadScale {
                scale: config.scaler.scale(),
                max: MAX_SCALE,
            });
        }
        Ok(config)
    }
}
