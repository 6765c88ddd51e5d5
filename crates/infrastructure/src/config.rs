//! Client configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `<config_dir>/teacare/config.toml`, when present
//! 3. the legacy `API_BASE_URL` variable
//! 4. `TEACARE_*` variables (`TEACARE_BASE_URL`, `TEACARE_TOKEN_FILE`, ...)
//! 5. explicit overrides, usually command line flags

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_PREFIX: &str = "TEACARE";
const LEGACY_BASE_URL_VAR: &str = "API_BASE_URL";

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or merged.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The base URL is not an absolute HTTP(S) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// API base URL.
    pub base_url: Option<String>,
    /// Token file location.
    pub token_file: Option<PathBuf>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    base_url: String,
    #[serde(default)]
    token_file: Option<PathBuf>,
    timeout_secs: u64,
    user_agent: String,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Where the session tokens are persisted.
    pub token_file: PathBuf,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_file: default_token_file(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the process environment and the
    /// default configuration file.
    ///
    /// # Errors
    /// Returns an error if a source is malformed or the base URL is invalid.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(default_config_file().as_deref(), &env, overrides)
    }

    /// Loads the configuration from explicit sources.
    ///
    /// # Errors
    /// Returns an error if a source is malformed or the base URL is invalid.
    pub fn load_from(
        file: Option<&Path>,
        env: &HashMap<String, String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let legacy: HashMap<String, String> = env
            .get(LEGACY_BASE_URL_VAR)
            .map(|url| (LEGACY_BASE_URL_VAR.to_string(), url.clone()))
            .into_iter()
            .collect();

        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("user_agent", default_user_agent())?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let raw: RawConfig = builder
            .add_source(Environment::with_prefix("API").source(Some(legacy)))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            .set_override_option("base_url", overrides.base_url.clone())?
            .set_override_option(
                "token_file",
                overrides
                    .token_file
                    .as_ref()
                    .map(|path| path.to_string_lossy().into_owned()),
            )?
            .set_override_option("timeout_secs", overrides.timeout_secs)?
            .build()?
            .try_deserialize()?;

        let config = Self {
            base_url: normalize_base_url(&raw.base_url)?,
            token_file: raw.token_file.unwrap_or_else(default_token_file),
            timeout_secs: raw.timeout_secs,
            user_agent: raw.user_agent,
        };
        tracing::debug!(base_url = %config.base_url, token_file = %config.token_file.display(), "Configuration loaded");
        Ok(config)
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Validates a base URL and strips trailing slashes.
///
/// # Errors
/// Returns [`ConfigError::InvalidBaseUrl`] for relative or non-HTTP URLs.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(trimmed.to_string())
}

/// `<config_dir>/teacare/config.toml`.
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("teacare").join("config.toml"))
}

/// `<data_dir>/teacare/tokens.json`, or `.teacare/tokens.json` when the
/// platform has no data directory.
#[must_use]
pub fn default_token_file() -> PathBuf {
    dirs::data_dir()
        .map_or_else(|| PathBuf::from(".teacare"), |dir| dir.join("teacare"))
        .join("tokens.json")
}

fn default_user_agent() -> String {
    format!("teacare/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::load_from(None, &HashMap::new(), &ConfigOverrides::default())
            .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("teacare/"));
        assert!(config.token_file.ends_with("tokens.json"));
    }

    #[test]
    fn test_precedence() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"https://file.example/api\"\ntimeout_secs = 5").unwrap();

        let from_file =
            ClientConfig::load_from(Some(file.path()), &HashMap::new(), &ConfigOverrides::default())
                .unwrap();
        assert_eq!(from_file.base_url, "https://file.example/api");
        assert_eq!(from_file.timeout_secs, 5);

        let legacy = env(&[("API_BASE_URL", "https://legacy.example/api/")]);
        let config =
            ClientConfig::load_from(Some(file.path()), &legacy, &ConfigOverrides::default())
                .unwrap();
        assert_eq!(config.base_url, "https://legacy.example/api");

        let both = env(&[
            ("API_BASE_URL", "https://legacy.example/api"),
            ("TEACARE_BASE_URL", "https://env.example/api"),
            ("TEACARE_TIMEOUT_SECS", "12"),
        ]);
        let config =
            ClientConfig::load_from(Some(file.path()), &both, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.base_url, "https://env.example/api");
        assert_eq!(config.timeout_secs, 12);

        let overrides = ConfigOverrides {
            base_url: Some("https://flag.example".to_string()),
            token_file: Some(PathBuf::from("/tmp/t.json")),
            timeout_secs: None,
        };
        let config = ClientConfig::load_from(Some(file.path()), &both, &overrides).unwrap();
        assert_eq!(config.base_url, "https://flag.example");
        assert_eq!(config.token_file, PathBuf::from("/tmp/t.json"));
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config = ClientConfig::load_from(
            Some(Path::new("/nonexistent/teacare/config.toml")),
            &HashMap::new(),
            &ConfigOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            normalize_base_url("ftp://files.example"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert_eq!(
            normalize_base_url("https://api.example/v1//").unwrap(),
            "https://api.example/v1"
        );
    }
}
