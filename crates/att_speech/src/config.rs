//! Configuration for the speech API client

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Production API base URL
pub const DEFAULT_API_BASE: &str = "https://api.att.com";

/// Speech-to-text resource path
pub const STT_RESOURCE: &str = "/speech/v3/speechToText";

/// Text-to-speech resource path
pub const TTS_RESOURCE: &str = "/speech/v3/textToSpeech";

/// OAuth token resource path
pub const OAUTH_RESOURCE: &str = "/oauth/token";

/// Client application name reported in `X-Arg`
pub const DEFAULT_CLIENT_APP: &str = "RustLibForATTSpeech";

/// Config file looked up by [`ClientConfig::load`] (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "att_speech";

/// Environment variable prefix, e.g. `ATT_APP_KEY`
pub const ENV_PREFIX: &str = "ATT";

/// Configuration for the speech API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application id (OAuth client id)
    #[serde(default)]
    pub app_key: String,

    /// Application secret (OAuth client secret)
    #[serde(default)]
    pub app_secret: String,

    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Speech-to-text resource path
    #[serde(default = "default_stt_resource")]
    pub stt_resource: String,

    /// Text-to-speech resource path
    #[serde(default = "default_tts_resource")]
    pub tts_resource: String,

    /// OAuth token resource path
    #[serde(default = "default_oauth_resource")]
    pub oauth_resource: String,

    /// Client application name reported in `X-Arg`
    #[serde(default = "default_client_app")]
    pub client_app: String,

    /// Client version reported in `X-Arg`
    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_stt_resource() -> String {
    STT_RESOURCE.to_string()
}

fn default_tts_resource() -> String {
    TTS_RESOURCE.to_string()
}

fn default_oauth_resource() -> String {
    OAUTH_RESOURCE.to_string()
}

fn default_client_app() -> String {
    DEFAULT_CLIENT_APP.to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

/// `ATT_*` variables, e.g. `ATT_APP_KEY` -> `app_key`
///
/// Values stay strings until deserialization so credentials such as `00123`
/// or `1e3` are not re-typed as numbers.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).prefix_separator("_")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            api_base: default_api_base(),
            stt_resource: default_stt_resource(),
            tts_resource: default_tts_resource(),
            oauth_resource: default_oauth_resource(),
            client_app: default_client_app(),
            client_version: default_client_version(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Create a config with credentials and default endpoints
    #[must_use]
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            ..Default::default()
        }
    }

    /// Load from an optional `att_speech.{toml,json,yaml}` in the working
    /// directory, overridden by `ATT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value has the wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_sources(
            config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
            environment(),
        )
    }

    /// Load from `path`, overridden by `ATT_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::from_sources(config::File::from(path).required(true), environment())
    }

    fn from_sources<S>(file: S, env: config::Environment) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder().add_source(file).add_source(env);

        builder.build()?.try_deserialize()
    }

    /// Validate the configuration
    ///
    /// Credentials are not checked; the token endpoint rejects bad ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base.is_empty() {
            return Err("API base URL must not be empty".to_string());
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!(
                "API base URL must start with http:// or https://, got {}",
                self.api_base
            ));
        }

        for (name, path) in [
            ("stt_resource", &self.stt_resource),
            ("tts_resource", &self.tts_resource),
            ("oauth_resource", &self.oauth_resource),
        ] {
            if !path.starts_with('/') {
                return Err(format!("{name} must start with '/', got {path}"));
            }
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
