#[cfg(feature = "cli")]
use clap::Parser;
use std::time::Duration;
use url::Url;

/// OpenRouter API root. Requests go to `{base_url}/chat/completions`.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_SITE_URL: &str = "https://smart-ai-keyboard.railway.app";
pub const DEFAULT_APP_NAME: &str = "Smart AI Keyboard";

/// # Relay Configuration
///
/// Loaded from command-line arguments, environment variables and an optional
/// `.env` file. Everything is fixed at startup.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "keyboard-relay"))]
#[cfg_attr(feature = "cli", command(about = "HTTP relay between the Smart AI Keyboard extension and OpenRouter"))]
#[cfg_attr(feature = "cli", command(version))]
pub struct Config {
    // =============================================================================
    // SERVER
    // =============================================================================

    /// Server port to listen on
    #[cfg_attr(feature = "cli", arg(short, long, env = "PORT", default_value = "3000"))]
    pub port: u16,

    /// Server host to bind to
    #[cfg_attr(feature = "cli", arg(long, env = "HOST", default_value = "0.0.0.0"))]
    pub host: String,

    // =============================================================================
    // UPSTREAM PROVIDER
    // =============================================================================

    /// OpenRouter API key (required for /enhance)
    #[cfg_attr(feature = "cli", arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true))]
    pub api_key: Option<String>,

    /// Upstream API root
    #[cfg_attr(feature = "cli", arg(long, default_value = OPENROUTER_BASE_URL))]
    pub base_url: String,

    /// Model identifier forwarded to the provider
    #[cfg_attr(feature = "cli", arg(long, env = "MODEL", default_value = DEFAULT_MODEL))]
    pub model: String,

    /// Sent upstream as HTTP-Referer
    #[cfg_attr(feature = "cli", arg(long, env = "YOUR_SITE_URL", default_value = DEFAULT_SITE_URL))]
    pub site_url: String,

    /// Sent upstream as X-Title
    #[cfg_attr(feature = "cli", arg(long, env = "YOUR_APP_NAME", default_value = DEFAULT_APP_NAME))]
    pub app_name: String,

    /// Upstream request timeout in seconds (transport default when unset)
    #[cfg_attr(feature = "cli", arg(long, env = "UPSTREAM_TIMEOUT_SECS"))]
    pub upstream_timeout_secs: Option<u64>,

    // =============================================================================
    // RATE LIMITING
    // =============================================================================

    /// Fixed window length in seconds
    #[cfg_attr(feature = "cli", arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "60"))]
    pub rate_limit_window_secs: u64,

    /// Requests allowed per client per window
    #[cfg_attr(feature = "cli", arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value = "30"))]
    pub rate_limit_max_requests: u32,

    // =============================================================================
    // LOGGING
    // =============================================================================

    /// Log level (error, warn, info, debug, trace)
    #[cfg_attr(feature = "cli", arg(long, env = "RUST_LOG", default_value = "info"))]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from the environment and command line.
    ///
    /// Loads `.env` if present, parses arguments, sets up logging and
    /// validates. Exits the process on invalid configuration.
    #[cfg(feature = "cli")]
    pub fn parse_args() -> Self {
        let _ = dotenv::dotenv();

        let config = Self::parse();

        config.setup_logging();

        if let Err(err) = config.validate() {
            tracing::error!("Configuration validation failed: {}", err);
            eprintln!("Configuration validation failed: {}", err);
            std::process::exit(1);
        }

        config
    }

    /// Deterministic configuration for tests; never reads the environment.
    pub fn for_test() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            api_key: Some("sk-or-test-key".to_string()),
            base_url: OPENROUTER_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            upstream_timeout_secs: None,
            rate_limit_window_secs: 60,
            rate_limit_max_requests: 30,
            log_level: "info".to_string(),
        }
    }

    /// The credential, with an empty value treated as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }

    /// Scheme and host of the upstream, safe for logs.
    pub fn safe_base_url(&self) -> String {
        match Url::parse(&self.base_url) {
            Ok(url) => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("unknown")),
            Err(_) => "invalid-url".to_string(),
        }
    }

    #[cfg(feature = "cli")]
    fn setup_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(&self.log_level)
            .with_target(false)
            .try_init();
    }

    /// Validate configuration values.
    ///
    /// A missing API key is reported as a warning only; `/enhance` turns it
    /// into a runtime error and `/health` exposes it.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0. Please specify a valid port number (1-65535).".to_string());
        }

        if self.host.is_empty() {
            return Err("Host cannot be empty. Please specify a valid host (e.g., '0.0.0.0').".to_string());
        }

        match Url::parse(&self.base_url) {
            Ok(url) => {
                if !["http", "https"].contains(&url.scheme()) {
                    return Err(format!(
                        "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
                        url.scheme()
                    ));
                }
                if url.host().is_none() {
                    return Err("Upstream base URL must include a host.".to_string());
                }
            }
            Err(err) => {
                return Err(format!("Invalid upstream base URL '{}': {}", self.base_url, err));
            }
        }

        if self.model.trim().is_empty() {
            return Err("Model cannot be empty. Please specify a valid model identifier.".to_string());
        }

        if self.rate_limit_window_secs == 0 {
            return Err("Rate limit window must be greater than 0 seconds.".to_string());
        }

        if self.rate_limit_max_requests == 0 {
            return Err("Rate limit must allow at least one request per window.".to_string());
        }

        if self.upstream_timeout_secs == Some(0) {
            return Err("Upstream timeout must be greater than 0 seconds when set.".to_string());
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log level '{}'. Valid options are: {}",
                self.log_level,
                valid_log_levels.join(", ")
            ));
        }

        if !self.has_api_key() {
            tracing::warn!("OPENROUTER_API_KEY is not set; /enhance will answer 500 until it is configured");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_test_is_valid() {
        assert!(Config::for_test().validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let mut config = Config::for_test();
        config.api_key = Some(String::new());
        assert!(!config.has_api_key());
        assert_eq!(config.api_key(), None);

        config.api_key = None;
        assert!(!config.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_safe_base_url_strips_path() {
        let config = Config::for_test();
        assert_eq!(config.safe_base_url(), "https://openrouter.ai");
    }

    #[test]
    fn test_rejects_zero_window() {
        let mut config = Config::for_test();
        config.rate_limit_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let mut config = Config::for_test();
        config.base_url = "ftp://openrouter.ai".to_string();
        assert!(config.validate().unwrap_err().contains("ftp"));
    }
}
