//! Notifier configuration
//!
//! The reactor reads a fresh [`NotifierConfig`] snapshot from its
//! [`ConfigStore`] on every ringing event, so changes made by the host take
//! effect with the next incoming call.
//!
//! Configuration files are TOML:
//!
//! ```toml
//! enabled = true
//! volume = 80     # 0..=100
//! unit_ms = 120   # 1..=250, length of a short pulse
//! ```

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::timing::{MAX_LEVEL, MAX_UNIT_MS, MIN_UNIT_MS, TimingProfile};

/// User settings consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Whether Morse notifications are used at all
    pub enabled: bool,
    /// Output level in percent
    pub volume: u8,
    /// Length of a short pulse in milliseconds
    pub unit_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            volume: MAX_LEVEL,
            unit_ms: 100,
        }
    }
}

impl NotifierConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&toml)
    }

    /// Check that every value is within its permitted range
    pub fn validate(&self) -> Result<()> {
        if self.volume > MAX_LEVEL {
            return Err(Error::invalid_value(
                "volume",
                self.volume,
                format!("must be at most {MAX_LEVEL}"),
            ));
        }
        if !(MIN_UNIT_MS..=MAX_UNIT_MS).contains(&self.unit_ms) {
            return Err(Error::invalid_value(
                "unit_ms",
                self.unit_ms,
                format!("must be between {MIN_UNIT_MS} and {MAX_UNIT_MS}"),
            ));
        }
        Ok(())
    }

    /// Timing profile for playback, out-of-range values clamped
    pub fn timing_profile(&self) -> TimingProfile {
        TimingProfile::new(self.unit_ms, self.volume)
    }
}

/// Source of the current configuration
pub trait ConfigStore: Send + Sync {
    /// Current settings
    fn snapshot(&self) -> NotifierConfig;
}

impl ConfigStore for NotifierConfig {
    fn snapshot(&self) -> NotifierConfig {
        self.clone()
    }
}

/// Configuration shared between the host and the engine
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<NotifierConfig>>,
}

impl SharedConfig {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Modify the settings in place
    pub fn update(&self, f: impl FnOnce(&mut NotifierConfig)) {
        f(&mut *self.inner.write());
    }

    /// Replace the settings after validating them
    pub fn replace(&self, config: NotifierConfig) -> Result<()> {
        config.validate()?;
        *self.inner.write() = config;
        Ok(())
    }
}

impl ConfigStore for SharedConfig {
    fn snapshot(&self) -> NotifierConfig {
        self.inner.read().clone()
    }
}
