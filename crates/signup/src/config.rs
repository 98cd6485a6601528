//! Signup server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SIGNUP_BASE_URL` - Public URL of the signup page
//! - `SIGNUP_CSRF_TOKEN` - Token sent as `X-CSRF-TOKEN` to the registration API
//! - `SIGNUP_IDENTITY_TOKEN` - Bearer token for the CPF lookup API
//!
//! ## Optional
//! - `SIGNUP_HOST` - Bind address (default: 127.0.0.1)
//! - `SIGNUP_PORT` - Listen port (default: 3000)
//! - `SIGNUP_REGISTRATION_URL` - Registration endpoint (default: federalassociados `submitLp`)
//! - `SIGNUP_IDENTITY_BASE_URL` - CPF lookup base URL (default: federalassociados API)
//! - `SIGNUP_ADDRESS_BASE_URL` - CEP lookup base URL (default: `https://viacep.com.br`)
//! - `SIGNUP_FORM_IDLE_MINUTES` - Idle time before a form session is dropped (default: 30)
//! - `SIGNUP_REFERRERS_FILE` - YAML file replacing the built-in representative list
//! - `SIGNUP_STATIC_DIR` - Stylesheet directory (default: crates/signup/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use member_signup_core::referrer::DEFAULT_REFERRER_ID;
use member_signup_core::{Referrer, ReferrerDirectory};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_REGISTRATION_URL: &str = "https://api.federalassociados.com.br/api/submitLp";
const DEFAULT_IDENTITY_BASE_URL: &str = "https://api.federalassociados.com.br";
const DEFAULT_ADDRESS_BASE_URL: &str = "https://viacep.com.br";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Invalid referrers file {0}: {1}")]
    InvalidReferrers(String, String),
}

/// Signup server configuration.
#[derive(Debug, Clone)]
pub struct SignupConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the signup page
    pub base_url: String,
    /// External API endpoints and credentials
    pub api: ApiConfig,
    /// Idle time before a form session is dropped
    pub form_idle: Duration,
    /// Optional YAML file with the representative list
    pub referrers_file: Option<PathBuf>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Endpoints and credentials of the registration, identity and address APIs.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ApiConfig {
    /// Full URL the registration payload is posted to
    pub registration_url: String,
    /// Token sent in the `X-CSRF-TOKEN` header
    pub csrf_token: SecretString,
    /// Base URL of the CPF lookup (`/api/check_cpf_lp/{cpf}` is appended)
    pub identity_base_url: String,
    /// Bearer token for the CPF lookup
    pub identity_token: SecretString,
    /// Base URL of the CEP lookup (`/ws/{cep}/json/` is appended)
    pub address_base_url: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("registration_url", &self.registration_url)
            .field("csrf_token", &"[REDACTED]")
            .field("identity_base_url", &self.identity_base_url)
            .field("identity_token", &"[REDACTED]")
            .field("address_base_url", &self.address_base_url)
            .finish()
    }
}

impl SignupConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SIGNUP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SIGNUP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SIGNUP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SIGNUP_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SIGNUP_BASE_URL")?;
        validate_url(&base_url, "SIGNUP_BASE_URL")?;

        let form_idle =
            parse_idle_minutes(&get_env_or_default("SIGNUP_FORM_IDLE_MINUTES", "30"))?;

        Ok(Self {
            host,
            port,
            base_url,
            api: ApiConfig::from_env()?,
            form_idle,
            referrers_file: get_optional_env("SIGNUP_REFERRERS_FILE").map(PathBuf::from),
            static_dir: PathBuf::from(get_env_or_default(
                "SIGNUP_STATIC_DIR",
                "crates/signup/static",
            )),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the page is served over HTTPS (controls the secure cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Build the representative directory.
    ///
    /// Uses `SIGNUP_REFERRERS_FILE` when set, the built-in list otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidReferrers` if the file cannot be read or
    /// parsed, or if its default id is not in the list.
    pub fn referrer_directory(&self) -> Result<ReferrerDirectory, ConfigError> {
        self.referrers_file
            .as_deref()
            .map_or_else(|| Ok(ReferrerDirectory::builtin()), load_referrers)
    }
}

impl ApiConfig {
    /// Load the API endpoints and credentials from environment variables.
    ///
    /// Does not read `.env`; [`SignupConfig::from_env`] and the CLI do that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL is malformed or a token is missing or
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let registration_url =
            get_env_or_default("SIGNUP_REGISTRATION_URL", DEFAULT_REGISTRATION_URL);
        validate_url(&registration_url, "SIGNUP_REGISTRATION_URL")?;
        let identity_base_url =
            get_env_or_default("SIGNUP_IDENTITY_BASE_URL", DEFAULT_IDENTITY_BASE_URL);
        validate_url(&identity_base_url, "SIGNUP_IDENTITY_BASE_URL")?;
        let address_base_url =
            get_env_or_default("SIGNUP_ADDRESS_BASE_URL", DEFAULT_ADDRESS_BASE_URL);
        validate_url(&address_base_url, "SIGNUP_ADDRESS_BASE_URL")?;

        Ok(Self {
            registration_url,
            csrf_token: get_validated_secret("SIGNUP_CSRF_TOKEN")?,
            identity_base_url,
            identity_token: get_validated_secret("SIGNUP_IDENTITY_TOKEN")?,
            address_base_url,
        })
    }
}

/// Layout of `SIGNUP_REFERRERS_FILE`.
#[derive(Debug, Deserialize)]
struct ReferrersFile {
    #[serde(default = "default_referrer_id")]
    default: String,
    referrers: Vec<Referrer>,
}

fn default_referrer_id() -> String {
    DEFAULT_REFERRER_ID.to_string()
}

/// Load the representative directory from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError::InvalidReferrers` if the file cannot be read or
/// parsed, or if its default id is not in the list.
pub fn load_referrers(path: &Path) -> Result<ReferrerDirectory, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidReferrers(path.display().to_string(), message);

    let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let file: ReferrersFile = serde_yaml::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

    ReferrerDirectory::new(file.referrers, file.default).map_err(|e| invalid(e.to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Longest accepted form idle time (one week).
const MAX_FORM_IDLE_MINUTES: u64 = 7 * 24 * 60;

/// Parse the form idle time, given in minutes.
fn parse_idle_minutes(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("SIGNUP_FORM_IDLE_MINUTES".to_string(), reason)
    };
    let minutes = raw.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    minutes
        .checked_mul(60)
        .filter(|_| minutes <= MAX_FORM_IDLE_MINUTES)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid(format!("{minutes} minutes is out of range")))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a value is an absolute http(s) URL.
fn validate_url(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the token issued by the API."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
