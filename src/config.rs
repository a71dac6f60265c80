//! Configuration file parser for ~/.config/marquee/config.toml.
//!
//! The config file is optional and a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use crate::controller::{ControllerSettings, DEFAULT_PREFETCH_DISTANCE};
use crate::source::TmdbSettings;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API token. Wins over the config file.
pub const TOKEN_ENV_VAR: &str = "TMDB_API_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys can be given.
/// `Debug` masks `api_token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub image_base_url: String,
    /// Bearer token. `TMDB_API_TOKEN` takes precedence.
    pub api_token: Option<String>,
    pub language: String,
    /// Quality threshold; also what ends pagination.
    pub min_vote_average: f64,
    /// Rows from the end of the list that trigger the next page.
    pub prefetch_distance: usize,
    pub request_timeout_secs: u64,
    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let tmdb = TmdbSettings::default();
        let controller = ControllerSettings::default();
        Self {
            api_base_url: tmdb.base_url,
            image_base_url: tmdb.image_base_url,
            api_token: None,
            language: tmdb.language,
            min_vote_average: controller.min_vote_average,
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
            request_timeout_secs: tmdb.timeout.as_secs(),
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("image_base_url", &self.image_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("language", &self.language)
            .field("min_vote_average", &self.min_vote_average)
            .field("prefetch_distance", &self.prefetch_distance)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 8] = [
    "api_base_url",
    "image_base_url",
    "api_token",
    "language",
    "min_vote_average",
    "prefetch_distance",
    "request_timeout_secs",
    "keybindings",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → defaults
    /// - Invalid TOML or wrong types → [`ConfigError::Parse`]
    /// - Out-of-range values → [`ConfigError::Invalid`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            api_base_url = %config.api_base_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_vote_average.is_finite() || self.min_vote_average < 0.0 {
            return Err(ConfigError::Invalid {
                key: "min_vote_average",
                reason: format!("must be a non-negative number, got {}", self.min_vote_average),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Source settings, with `env_token` (usually `TMDB_API_TOKEN`) taking
    /// precedence over the file's `api_token`.
    pub fn tmdb_settings(&self, env_token: Option<String>) -> TmdbSettings {
        let token = env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.api_token.clone())
            .map(SecretString::from);
        TmdbSettings {
            base_url: self.api_base_url.clone(),
            image_base_url: self.image_base_url.clone(),
            api_token: token,
            language: self.language.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            min_vote_average: self.min_vote_average,
            prefetch_distance: self.prefetch_distance,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.image_base_url, "https://image.tmdb.org/t/p");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.min_vote_average, 7.0);
        assert_eq!(config.prefetch_distance, 3);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.api_token.is_none());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/marquee_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.min_vote_average, 7.0);
    }

    #[test]
    fn test_blank_text_returns_default() {
        let config = Config::parse("  \n\n ").unwrap();
        assert_eq!(config.language, "en-US");
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::parse("min_vote_average = 8.5\n").unwrap();
        assert_eq!(config.min_vote_average, 8.5);
        assert_eq!(config.prefetch_distance, 3);
        assert_eq!(config.api_base_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_full_config_file() {
        let dir = std::env::temp_dir().join("marquee_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
api_base_url = "http://localhost:8080/3"
image_base_url = "https://images.example.com/p"
api_token = "file-token"
language = "de-DE"
min_vote_average = 6.5
prefetch_distance = 5
request_timeout_secs = 10

[keybindings]
quit = "Ctrl+q"
toggle_details = "Space"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080/3");
        assert_eq!(config.image_base_url, "https://images.example.com/p");
        assert_eq!(config.api_token.as_deref(), Some("file-token"));
        assert_eq!(config.language, "de-DE");
        assert_eq!(config.min_vote_average, 6.5);
        assert_eq!(config.prefetch_distance, 5);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(
            config.keybindings.get("toggle_details").map(String::as_str),
            Some("Space")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let err = Config::parse("prefetch_distance = \"three\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("language = \"fr-FR\"\ntheme = \"dark\"\n").unwrap();
        assert_eq!(config.language, "fr-FR");
    }

    #[test]
    fn test_negative_rating_rejected() {
        let err = Config::parse("min_vote_average = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "min_vote_average",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::parse("request_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "request_timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("marquee_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_token_wins_over_file() {
        let config = Config {
            api_token: Some("from-file".to_string()),
            ..Config::default()
        };

        let settings = config.tmdb_settings(Some("from-env".to_string()));
        let token = settings.api_token.unwrap();
        assert_eq!(token.expose_secret(), "from-env");

        let settings = config.tmdb_settings(Some("   ".to_string()));
        assert_eq!(settings.api_token.unwrap().expose_secret(), "from-file");

        let settings = config.tmdb_settings(None);
        assert_eq!(settings.api_token.unwrap().expose_secret(), "from-file");
    }

    #[test]
    fn test_settings_carry_values() {
        let config = Config::parse("request_timeout_secs = 12\nprefetch_distance = 1\n").unwrap();
        assert_eq!(config.tmdb_settings(None).timeout, Duration::from_secs(12));
        assert_eq!(config.controller_settings().prefetch_distance, 1);
    }

    #[test]
    fn test_debug_masks_api_token() {
        let config = Config {
            api_token: Some("super-secret-token".to_string()),
            ..Config::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
