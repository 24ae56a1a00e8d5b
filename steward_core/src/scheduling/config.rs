//! Scheduler configuration
//!
//! Configuration can be built in code, from a preset, or loaded from a TOML
//! or YAML file:
//!
//! ```toml
//! name = "teleop"
//! log_transitions = true
//!
//! [driver]
//! rate_hz = 50.0
//! max_ticks = 3000
//! ```

use crate::error::{StewardError, StewardResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the built-in [`TickDriver`](super::TickDriver) loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Tick frequency in Hz.
    pub rate_hz: f64,
    /// Stop after this many ticks (None = run until stopped).
    pub max_ticks: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            rate_hz: 50.0,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Scheduler name (for logging)
    pub name: String,
    /// Emit a debug record for every admit/preempt/block/finish.
    pub log_transitions: bool,
    pub driver: DriverConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl SchedulerConfig {
    /// 50 Hz loop with transition logging.
    pub fn standard() -> Self {
        Self {
            name: "Scheduler".to_string(),
            log_transitions: true,
            driver: DriverConfig::default(),
        }
    }

    /// Same loop, no per-transition logging.
    pub fn quiet() -> Self {
        Self {
            log_transitions: false,
            ..Self::standard()
        }
    }

    pub fn from_toml_str(s: &str) -> StewardResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> StewardResult<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> StewardResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(StewardError::config(format!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> StewardResult<()> {
        if self.name.trim().is_empty() {
            return Err(StewardError::config("scheduler name must not be empty"));
        }
        if !self.driver.rate_hz.is_finite() || self.driver.rate_hz <= 0.0 {
            return Err(StewardError::config(format!(
                "driver.rate_hz must be a positive number, got {}",
                self.driver.rate_hz
            )));
        }
        Ok(())
    }
}
