//! Profile configuration for azspeak.
//!
//! Loads a YAML profile from standard locations. Every section and field is
//! optional; anything missing falls back to the built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::token::{DEFAULT_MARGIN, DEFAULT_TRIAL_URL};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub trial_url: String,
    pub token_margin_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            trial_url: DEFAULT_TRIAL_URL.into(),
            token_margin_secs: DEFAULT_MARGIN.as_secs(),
        }
    }
}

impl AuthConfig {
    pub fn margin(&self) -> Duration {
        Duration::from_secs(self.token_margin_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Overrides the regional host, e.g. for a proxy
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Defaults for plain-text options. Values are validated like the
/// matching command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub voice: Option<String>,
    pub locale: Option<String>,
    pub style: Option<String>,
    pub rate: Option<String>,
    pub pitch: Option<String>,
    pub style_degree: Option<f32>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub container: Option<String>,
    pub quality: Option<i32>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub service: ServiceConfig,
    pub text: TextConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load the profile from a YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./azspeak.yaml
    /// 2. ~/.config/azspeak/config.yaml
    /// 3. /etc/azspeak/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("azspeak.yaml")),
                dirs::config_dir().map(|c| c.join("azspeak/config.yaml")),
                Some(PathBuf::from("/etc/azspeak/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            debug!("No profile found, using defaults");
            return Self::default();
        };

        Self::load_file(&config_path)
    }

    fn load_file(config_path: &Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded profile from {}", config_path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }
}
