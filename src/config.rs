//! Persisted typing settings.
//!
//! A [`Config`] holds everything about *how* to type, never *what* to type or
//! *when* to start; those always come from the command line.
//!
//! ```json
//! {
//!   "min_delay": 0.02,
//!   "max_delay": 0.05,
//!   "use_alt_enter": true,
//!   "cancel_key": "escape",
//!   "verbose": false
//! }
//! ```

use crate::error::{Result, TyperError};
use crate::job::validate_delays;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Lower bound of the pause after each keystroke, in seconds.
    #[serde(default = "default_min_delay")]
    pub min_delay: f64,

    /// Upper bound of the pause after each keystroke, in seconds.
    #[serde(default = "default_max_delay")]
    pub max_delay: f64,

    /// Send Alt+Enter instead of Enter for newlines.
    #[serde(default = "default_use_alt_enter")]
    pub use_alt_enter: bool,

    /// Key that ends hotkey mode.
    #[serde(default = "default_cancel_key")]
    pub cancel_key: String,

    #[serde(default)]
    pub verbose: bool,
}

fn default_min_delay() -> f64 {
    0.02
}

fn default_max_delay() -> f64 {
    0.05
}

fn default_use_alt_enter() -> bool {
    true
}

fn default_cancel_key() -> String {
    "escape".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
            use_alt_enter: default_use_alt_enter(),
            cancel_key: default_cancel_key(),
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| TyperError::config_load(path, e.to_string()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| TyperError::config_load(path, e.to_string()))?;
        Ok(config)
    }

    /// Writes the settings as pretty JSON. Invalid settings are never written.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| TyperError::config_save(path, e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_delays(self.min_delay, self.max_delay)
            .map_err(|e| TyperError::config_validation(e.to_string()))?;

        if self.cancel_key.trim().is_empty() {
            return Err(TyperError::config_validation("cancel_key cannot be empty"));
        }

        Ok(())
    }
}
