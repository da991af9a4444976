//! Studio configuration module.
//!
//! Handles loading and validating `config.toml`. Configuration covers the
//! operational knobs of the export pipeline and the browser backend — the
//! composition model itself (templates, formats, clamp ranges) is fixed by
//! contract and not configurable.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [export]
//! settle_delay_ms = 400     # Post-navigation wait for fonts/images
//! pacing_delay_ms = 300     # Pause between consecutive slide files
//!
//! [browser]
//! window = [1280, 1500]     # Headless window; must hold the tallest canvas
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only slow down pacing
//! [export]
//! pacing_delay_ms = 800
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Studio configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Export pipeline delays.
    pub export: ExportConfig,
    /// Headless browser settings.
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Wait after navigation before capturing, so fonts and background
    /// images settle. Best-effort: capture proceeds after the wait even
    /// if a resource never arrives.
    pub settle_delay_ms: u64,
    /// Pause between consecutive slides. Rapid successive downloads get
    /// throttled and silently dropped without it.
    pub pacing_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 400,
            pacing_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Headless window size; must hold the tallest supported canvas.
    pub window: [u32; 2],
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self { window: [1280, 1500] }
    }
}

impl StudioConfig {
    /// Load from a TOML file. A missing file yields the defaults; a
    /// present but invalid file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.settle_delay_ms > 30_000 {
            return Err(ConfigError::Validation(
                "export.settle_delay_ms must be at most 30000".into(),
            ));
        }
        if self.export.pacing_delay_ms > 30_000 {
            return Err(ConfigError::Validation(
                "export.pacing_delay_ms must be at most 30000".into(),
            ));
        }
        let [w, h] = self.browser.window;
        if w < 1080 || h < 1350 {
            return Err(ConfigError::Validation(
                "browser.window must be at least 1080x1350 to hold the canvas".into(),
            ));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.export.settle_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.export.pacing_delay_ms)
    }

    /// The documented stock config printed by `gen-config`.
    pub fn stock_toml() -> &'static str {
        "\
# slideforge configuration - all options are optional, defaults shown

[export]
# Wait after navigation before capturing, so fonts and background images
# settle (milliseconds)
settle_delay_ms = 400
# Pause between consecutive slide files (milliseconds)
pacing_delay_ms = 300

[browser]
# Headless window size; must hold the tallest canvas (1080x1350)
window = [1280, 1500]
"
    }
}
