use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com";
const DEFAULT_FEEDBACK_SERVICE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_SUMMARY_TRACE_PATH: &str = "result.txt";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the PDF digest server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API key sent to the Gemini generative language endpoint.
    pub gemini_api_key: String,
    /// Gemini model identifier used for every summarization call.
    pub gemini_model: String,
    /// Base URL of the Gemini API.
    pub gemini_url: String,
    /// Base URL of the translation endpoint.
    pub translate_url: String,
    /// Base URL of the service that stores volunteer feedback.
    pub feedback_service_url: String,
    /// File overwritten with the latest pre-translation summary.
    pub summary_trace_path: PathBuf,
    /// Upper bound, in seconds, for each external call made while serving a request.
    pub request_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            gemini_api_key: load_env("GEMINI_API_KEY")?,
            gemini_model: load_env_optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_url: load_env_optional("GEMINI_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            translate_url: load_env_optional("TRANSLATE_URL")
                .unwrap_or_else(|| DEFAULT_TRANSLATE_URL.to_string()),
            feedback_service_url: load_env_optional("FEEDBACK_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_FEEDBACK_SERVICE_URL.to_string()),
            summary_trace_path: load_env_optional("SUMMARY_TRACE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUMMARY_TRACE_PATH)),
            request_timeout_secs: load_env_optional("REQUEST_TIMEOUT_SECS")
                .map(|value| match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(secs),
                    _ => Err(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".into())),
                })
                .transpose()?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        gemini_model = %config.gemini_model,
        gemini_url = %config.gemini_url,
        translate_url = %config.translate_url,
        feedback_service_url = %config.feedback_service_url,
        trace_path = %config.summary_trace_path.display(),
        request_timeout_secs = config.request_timeout_secs,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 8] = [
        "GEMINI_API_KEY",
        "GEMINI_MODEL",
        "GEMINI_URL",
        "TRANSLATE_URL",
        "FEEDBACK_SERVICE_URL",
        "SUMMARY_TRACE_PATH",
        "REQUEST_TIMEOUT_SECS",
        "SERVER_PORT",
    ];

    fn with_env(pairs: &[(&str, &str)], check: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        // SAFETY: environment mutation is serialized through ENV_LOCK within this module.
        unsafe {
            for key in KEYS {
                env::remove_var(key);
            }
            for (key, value) in pairs {
                env::set_var(key, value);
            }
        }
        check();
    }

    #[test]
    fn from_env_applies_defaults() {
        with_env(&[("GEMINI_API_KEY", "secret")], || {
            let config = Config::from_env().expect("config");
            assert_eq!(config.gemini_api_key, "secret");
            assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
            assert_eq!(config.summary_trace_path, PathBuf::from("result.txt"));
            assert_eq!(config.request_timeout_secs, 120);
            assert!(config.server_port.is_none());
        });
    }

    #[test]
    fn from_env_requires_api_key() {
        with_env(&[("GEMINI_API_KEY", "  ")], || {
            let error = Config::from_env().expect_err("missing key");
            assert!(matches!(error, ConfigError::MissingVariable(key) if key == "GEMINI_API_KEY"));
        });
    }

    #[test]
    fn from_env_rejects_zero_timeout() {
        with_env(
            &[("GEMINI_API_KEY", "secret"), ("REQUEST_TIMEOUT_SECS", "0")],
            || {
                let error = Config::from_env().expect_err("invalid timeout");
                assert!(matches!(error, ConfigError::InvalidValue(_)));
            },
        );
    }

    #[test]
    fn from_env_parses_port() {
        with_env(
            &[("GEMINI_API_KEY", "secret"), ("SERVER_PORT", "8123")],
            || {
                let config = Config::from_env().expect("config");
                assert_eq!(config.server_port, Some(8123));
            },
        );
    }
}
