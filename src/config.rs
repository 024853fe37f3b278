//! Coordinator configuration
//!
//! Explicit configuration handed to the coordinator at construction, in
//! place of global settings lookups. Loadable from a YAML file; a missing
//! file falls back to defaults, a malformed one is an error.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the edit-to-highlight pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Edits at or above this many characters show a progress indicator;
    /// smaller edits highlight silently
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: usize,

    /// Quiet period before outline re-derivation, in milliseconds
    #[serde(default = "default_outline_debounce_ms")]
    pub outline_debounce_ms: u64,

    /// Minimum interval between fraction updates delivered to a presenter,
    /// in milliseconds
    #[serde(default = "default_fraction_throttle_ms")]
    pub fraction_throttle_ms: u64,

    /// Minimum interval between description updates delivered to a
    /// presenter, in milliseconds
    #[serde(default = "default_description_throttle_ms")]
    pub description_throttle_ms: u64,

    /// Dismiss the progress indicator automatically when analysis finishes
    #[serde(default = "default_auto_dismiss")]
    pub auto_dismiss: bool,
}

fn default_visibility_threshold() -> usize {
    1000
}

fn default_outline_debounce_ms() -> u64 {
    400
}

fn default_fraction_throttle_ms() -> u64 {
    200
}

fn default_description_throttle_ms() -> u64 {
    100
}

fn default_auto_dismiss() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: default_visibility_threshold(),
            outline_debounce_ms: default_outline_debounce_ms(),
            fraction_throttle_ms: default_fraction_throttle_ms(),
            description_throttle_ms: default_description_throttle_ms(),
            auto_dismiss: default_auto_dismiss(),
        }
    }
}

impl CoordinatorConfig {
    /// Quiet period before outline re-derivation
    pub fn outline_debounce(&self) -> Duration {
        Duration::from_millis(self.outline_debounce_ms)
    }

    /// Minimum interval between presenter fraction updates
    pub fn fraction_throttle(&self) -> Duration {
        Duration::from_millis(self.fraction_throttle_ms)
    }

    /// Minimum interval between presenter description updates
    pub fn description_throttle(&self) -> Duration {
        Duration::from_millis(self.description_throttle_ms)
    }

    /// Load config from a YAML file
    ///
    /// A missing file yields defaults; an unreadable or malformed file is
    /// an error with context.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        tracing::info!("Loaded coordinator config from {}", path.display());
        Ok(config)
    }
}
