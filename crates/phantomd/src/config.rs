//! Configuration management for phantomd.
//!
//! Loads settings from an explicit path, /etc/phantom/config.toml or the
//! per-user config directory, else uses defaults. Every field has a serde
//! default so partial files are valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// System-wide config file path
pub const CONFIG_PATH: &str = "/etc/phantom/config.toml";

/// Stroke capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Hard cap on strokes per session
    #[serde(default = "default_max_strokes")]
    pub max_strokes: usize,

    /// Minimum distance from the previous stroke (avatar-local units)
    #[serde(default = "default_min_stroke_distance")]
    pub min_stroke_distance: f32,

    /// Slider pressure used until the user moves the slider
    #[serde(default = "default_slider_pressure")]
    pub default_slider_pressure: f32,
}

fn default_max_strokes() -> usize {
    200
}

fn default_min_stroke_distance() -> f32 {
    0.015
}

fn default_slider_pressure() -> f32 {
    0.5
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_strokes: default_max_strokes(),
            min_stroke_distance: default_min_stroke_distance(),
            default_slider_pressure: default_slider_pressure(),
        }
    }
}

/// Session lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Radius for hover / replay lookups
    #[serde(default = "default_hover_threshold")]
    pub hover_threshold: f32,
}

fn default_hover_threshold() -> f32 {
    phantom_shared::session::DEFAULT_HOVER_THRESHOLD
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hover_threshold: default_hover_threshold(),
        }
    }
}

/// Haptic playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticsConfig {
    /// Disable to run without any haptic hardware
    #[serde(default = "default_haptics_enabled")]
    pub enabled: bool,

    /// Minimum interval between accepted play requests
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_haptics_enabled() -> bool {
    true
}

fn default_cooldown_ms() -> u64 {
    50
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_haptics_enabled(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl HapticsConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Report generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Artificial latency applied only on the rule-based path
    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_ms: u64,

    /// Budget for the external model before falling back
    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,
}

fn default_fallback_delay() -> u64 {
    1_500
}

fn default_model_timeout() -> u64 {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fallback_delay_ms: default_fallback_delay(),
            model_timeout_secs: default_model_timeout(),
        }
    }
}

impl ReportConfig {
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}

/// External report model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Off by default: the rule-based report needs nothing external
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model_name")]
    pub model: String,
}

fn default_model_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model_name() -> String {
    "qwen2.5:7b-instruct".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_model_endpoint(),
            model: default_model_name(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub haptics: HapticsConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    /// Load config from the standard locations, or return defaults
    pub fn load() -> Self {
        let mut candidates = vec![PathBuf::from(CONFIG_PATH)];
        if let Some(user) = user_config_path() {
            candidates.push(user);
        }

        for path in &candidates {
            if path.exists() {
                match Self::load_from_path(path) {
                    Ok(config) => return config,
                    Err(e) => warn!("Ignoring config {}: {:#}", path.display(), e),
                }
            }
        }

        warn!("Config not found, using defaults");
        Config::default()
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default configuration as TOML
    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }
}

/// Per-user config location (~/.config/phantom/config.toml on Linux)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("phantom").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.capture.max_strokes, 200);
        assert_eq!(config.capture.min_stroke_distance, 0.015);
        assert_eq!(config.haptics.cooldown(), Duration::from_millis(50));
        assert_eq!(config.session.hover_threshold, 0.06);
        assert!(!config.model.enabled);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[haptics]
cooldown_ms = 80

[model]
enabled = true
model = "llama3.2:3b"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.haptics.cooldown_ms, 80);
        assert!(config.haptics.enabled);
        assert!(config.model.enabled);
        assert_eq!(config.model.model, "llama3.2:3b");
        assert_eq!(config.model.endpoint, "http://127.0.0.1:11434");
        // Untouched sections keep defaults
        assert_eq!(config.capture.max_strokes, 200);
        assert_eq!(config.report.fallback_delay_ms, 1_500);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = Config::default_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.capture.max_strokes, 200);
        assert_eq!(parsed.report.model_timeout_secs, 20);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[capture]\nmax_strokes = 12\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.capture.max_strokes, 12);
    }

    #[test]
    fn test_load_from_invalid_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[capture\nmax_strokes = ").unwrap();
        assert!(Config::load_from_path(&path).is_err());
        assert!(Config::load_from_path(&dir.path().join("missing.toml")).is_err());
    }
}
