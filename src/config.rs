//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$SENDSHELL_CONFIG` (environment variable)
//! 2. `~/.config/sendshell/config.toml` (Linux/macOS)
//!    `%APPDATA%\sendshell\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! After loading, `SENDSHELL_API_BASE_URL` and `SENDSHELL_CLIENT_ID` override
//! the file. Nothing outside this module reads the environment for settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ComposerError, Result};

/// Gateway used when neither the file nor the environment names one.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";

/// Path of the send endpoint below the gateway base URL.
pub const DEFAULT_SEND_PATH: &str = "/api/mail/send";

/// Public OAuth client identifier registered for sendShell.
pub const DEFAULT_CLIENT_ID: &str =
    "522448730153-v3itg3ie7hcs7s7g9id1fjvjoe0fi460.apps.googleusercontent.com";

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
pub const SCOPE_GMAIL_SEND: &str = "https://www.googleapis.com/auth/gmail.send";
pub const SCOPE_USERINFO_EMAIL: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Environment variable overriding `gateway.base_url`.
pub const ENV_API_BASE_URL: &str = "SENDSHELL_API_BASE_URL";
/// Environment variable overriding `oauth.client_id`.
pub const ENV_CLIENT_ID: &str = "SENDSHELL_CLIENT_ID";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Mail gateway endpoint.
    pub gateway: GatewayConfig,
    /// OAuth implicit-grant settings.
    pub oauth: OAuthConfig,
    /// Draft validation rules.
    pub compose: ComposeConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// UI language code ("en", "es"). Defaults to system locale.
    pub language: Option<String>,
}

/// Where and how messages are submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Scheme, host and optional port of the gateway.
    pub base_url: String,
    /// Endpoint path appended to `base_url`.
    pub send_path: String,
    /// Client-side request timeout in seconds (0 = wait for the gateway).
    pub timeout_secs: u64,
}

/// OAuth implicit-grant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Public client identifier (not a secret).
    pub client_id: String,
    /// Provider authorization endpoint.
    pub auth_endpoint: String,
    /// Userinfo endpoint queried for the signed-in address.
    pub userinfo_endpoint: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
    /// Loopback port receiving the browser redirect (0 = any free port).
    pub redirect_port: u16,
    /// How long to wait for the user to finish in the browser.
    pub login_timeout_secs: u64,
    /// Launch the system browser automatically.
    pub open_browser: bool,
}

/// Draft validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Require and send a `to` address.
    pub require_recipient: bool,
    /// Largest attachment accepted, in bytes (0 = unlimited).
    pub max_attachment_size: u64,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
            language: None,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            send_path: DEFAULT_SEND_PATH.to_string(),
            timeout_secs: 0,
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            auth_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            userinfo_endpoint: GOOGLE_USERINFO_ENDPOINT.to_string(),
            scopes: vec![
                SCOPE_GMAIL_SEND.to_string(),
                SCOPE_USERINFO_EMAIL.to_string(),
            ],
            redirect_port: 8765,
            login_timeout_secs: 300,
            open_browser: true,
        }
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            require_recipient: true,
            max_attachment_size: 25 * 1024 * 1024, // 25 MB
        }
    }
}

// ── Derived values ──────────────────────────────────────────────

impl GatewayConfig {
    /// Full URL of the send endpoint.
    pub fn send_url(&self) -> Result<Url> {
        let base = parse_url(&self.base_url)?;
        // Join against a base with a trailing slash so a path prefix in
        // `base_url` (e.g. `https://host/mailer`) is kept.
        let mut prefix = base.clone();
        if !prefix.path().ends_with('/') {
            let path = format!("{}/", prefix.path());
            prefix.set_path(&path);
        }
        prefix
            .join(self.send_path.trim_start_matches('/'))
            .map_err(|e| ComposerError::InvalidUrl {
                url: format!("{}{}", self.base_url, self.send_path),
                reason: e.to_string(),
            })
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl OAuthConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs.max(1))
    }
}

/// Parse an absolute http(s) URL.
pub fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ComposerError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ComposerError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations, then apply environment
/// overrides.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    let mut config = load_config_file();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

fn load_config_file() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Apply environment overrides. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(base_url = %url, "Gateway URL from environment");
        config.gateway.base_url = url.trim().to_string();
    }
    if let Some(id) = lookup(ENV_CLIENT_ID).filter(|v| !v.trim().is_empty()) {
        config.oauth.client_id = id.trim().to_string();
    }
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(path)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("SENDSHELL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("sendshell").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sendshell")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("sendshell.log")
}
