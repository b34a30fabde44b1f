//! Runtime configuration loaded from JSON
//!
//! Every field has a default, so an empty object (or no file at all) is a
//! valid configuration.
//!
//! ```json
//! {
//!   "pollTimeoutMs": 10,
//!   "loopSleepMs": 16,
//!   "tickMs": 80,
//!   "activationKeys": ["enter", "space"],
//!   "ripple": { "steps": 6, "durationMs": 400 },
//!   "engineDeadlineMs": 5000
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keys::ActivationKeys;
use crate::runtime::PollerConfig;

/// Ripple animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RippleConfig {
    /// Number of rings drawn over the animation.
    pub steps: u16,
    /// Total animation time.
    pub duration_ms: u64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            steps: 6,
            duration_ms: 400,
        }
    }
}

impl RippleConfig {
    /// Animation time as a `Duration`.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelayConfig {
    pub poll_timeout_ms: u64,
    pub loop_sleep_ms: u64,
    /// Interval between ticks driving spinners and ripples.
    pub tick_ms: u64,
    /// Chords that activate the focused control.
    pub activation_keys: Vec<String>,
    pub ripple: RippleConfig,
    /// Fail submissions the engine does not answer in time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_deadline_ms: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        let poller = PollerConfig::default();
        Self {
            poll_timeout_ms: poller.poll_timeout.as_millis() as u64,
            loop_sleep_ms: poller.loop_sleep.as_millis() as u64,
            tick_ms: 80,
            activation_keys: vec!["enter".into(), "space".into()],
            ripple: RippleConfig::default(),
            engine_deadline_ms: None,
        }
    }
}

impl RelayConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), "Loaded relay config");
        Ok(config)
    }

    /// Parse and validate config text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and that every activation key parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tickMs",
                reason: "must be greater than zero",
            });
        }
        if self.ripple.steps == 0 {
            return Err(ConfigError::Invalid {
                field: "ripple.steps",
                reason: "must be greater than zero",
            });
        }
        if self.engine_deadline_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "engineDeadlineMs",
                reason: "must be greater than zero when set",
            });
        }
        self.activation_keys().map(|_| ())
    }

    /// Event poller timings.
    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            loop_sleep: Duration::from_millis(self.loop_sleep_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Parsed activation chords.
    pub fn activation_keys(&self) -> Result<ActivationKeys, ConfigError> {
        ActivationKeys::parse(&self.activation_keys)
    }

    pub fn engine_deadline(&self) -> Option<Duration> {
        self.engine_deadline_ms.map(Duration::from_millis)
    }
}
