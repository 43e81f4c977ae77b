//! Controller configuration with documented constants
//!
//! Every tunable the command pipeline and the scroll animator read lives
//! here, with the reason for its default value.

use crate::core::error::{Result, VoxError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for the command controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    // === INTENT RESOLUTION ===
    /// Upper bound on one NLU round trip
    ///
    /// On expiry the command resolves to the "unrecognized" sentinel so
    /// the completion signal still fires. Long enough for a hosted model
    /// to answer a short classification prompt, short enough that a
    /// stalled request does not hold the microphone for long.
    pub nlu_timeout: Duration,

    // === SCROLL ANIMATION ===
    /// Offset applied per animation frame while scrolling (pixels)
    ///
    /// At 2.0 px and ~60 frames per second the list moves ~120 px/s,
    /// slow enough to read while it moves.
    pub scroll_step: f64,

    /// Time between animation frames
    ///
    /// 16 ms approximates a 60 Hz display refresh.
    pub frame_interval: Duration,

    // === FEEDBACK ===
    /// Captions kept by the caption log before the oldest is dropped
    pub max_captions: usize,

    // === LLM ===
    pub llm: LlmSettings,
}

/// Where and how to reach the NLU model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub api_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-haiku-20240307".into(),
            api_key_env: "LLM_API_KEY".into(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            nlu_timeout: Duration::from_secs(8),
            scroll_step: 2.0,
            frame_interval: Duration::from_millis(16),
            max_captions: 50,
            llm: LlmSettings::default(),
        }
    }
}

impl ControllerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.nlu_timeout.is_zero() {
            return Err("nlu_timeout must be greater than zero".into());
        }

        if !(self.scroll_step.is_finite() && self.scroll_step > 0.0) {
            return Err(format!(
                "scroll_step ({}) must be a positive number",
                self.scroll_step
            ));
        }

        if self.frame_interval.is_zero() {
            return Err("frame_interval must be greater than zero".into());
        }

        if self.max_captions == 0 {
            return Err("max_captions must be at least 1".into());
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string; missing keys keep defaults
    pub fn parse_toml(content: &str) -> Result<Self> {
        let file: TomlConfig = toml::from_str(content)?;
        let config = file.into_config();
        config.validate().map_err(VoxError::Config)?;
        Ok(config)
    }
}

/// TOML representation of the config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    nlu_timeout_ms: Option<u64>,
    scroll_step: Option<f64>,
    frame_interval_ms: Option<u64>,
    max_captions: Option<usize>,
    #[serde(default)]
    llm: TomlLlm,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlLlm {
    api_url: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
}

impl TomlConfig {
    fn into_config(self) -> ControllerConfig {
        let defaults = ControllerConfig::default();
        ControllerConfig {
            nlu_timeout: self
                .nlu_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.nlu_timeout),
            scroll_step: self.scroll_step.unwrap_or(defaults.scroll_step),
            frame_interval: self
                .frame_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.frame_interval),
            max_captions: self.max_captions.unwrap_or(defaults.max_captions),
            llm: LlmSettings {
                api_url: self.llm.api_url.unwrap_or(defaults.llm.api_url),
                model: self.llm.model.unwrap_or(defaults.llm.model),
                api_key_env: self.llm.api_key_env.unwrap_or(defaults.llm.api_key_env),
            },
        }
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<ControllerConfig> = OnceLock::new();

/// Get the global controller config (initializes with defaults if not set)
pub fn config() -> &'static ControllerConfig {
    CONFIG.get_or_init(ControllerConfig::default)
}

/// Set the global controller config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: ControllerConfig) -> std::result::Result<(), ControllerConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = ControllerConfig {
            scroll_step: 0.0,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = ControllerConfig::parse_toml(
            r#"
            nlu_timeout_ms = 2500
            scroll_step = 4.0

            [llm]
            model = "deepseek-chat"
            "#,
        )
        .unwrap();

        assert_eq!(config.nlu_timeout, Duration::from_millis(2500));
        assert_eq!(config.scroll_step, 4.0);
        assert_eq!(config.frame_interval, Duration::from_millis(16));
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.api_key_env, "LLM_API_KEY");
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let result = ControllerConfig::parse_toml("frame_interval_ms = 0");
        assert!(matches!(result, Err(VoxError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let result = ControllerConfig::parse_toml("scrol_step = 3.0");
        assert!(matches!(result, Err(VoxError::Toml(_))));
    }
}
