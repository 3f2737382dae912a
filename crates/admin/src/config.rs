//! Admin console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_PROJECT_ID` - Firebase project the document store lives in
//! - `FIREBASE_API_KEY` - Web API key for the store and identity endpoints
//!
//! ## Optional
//! - `DISPATCH_HOST` - Bind address (default: 127.0.0.1)
//! - `DISPATCH_PORT` - Listen port (default: 3001)
//! - `DISPATCH_BASE_URL` - Public URL for the console (default: derived from host/port)
//! - `STORE_BACKEND` - `firestore` or `memory` (default: firestore)
//! - `STORE_TIMEOUT_SECS` - Per-request timeout for remote calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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
}

/// Which [`crate::store::DocumentStore`] backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// The real Firestore REST backend.
    Firestore,
    /// In-process store, for local development without credentials.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{other}' (expected firestore or memory)")),
        }
    }
}

/// Admin console configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the console
    pub base_url: String,
    /// Firebase project and key
    pub firebase: FirebaseConfig,
    /// Which document store backend to use
    pub store_backend: StoreBackend,
    /// Per-request timeout for calls to the store and identity service
    pub store_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Firebase project configuration.
///
/// Implements `Debug` manually to redact the API key. The same key
/// authorizes both the Firestore REST endpoints and the Identity Toolkit
/// endpoints.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Firebase project id (e.g., dispatch-prod)
    pub project_id: String,
    /// Web API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl FirebaseConfig {
    fn from_env(backend: StoreBackend) -> Result<Self, ConfigError> {
        // The memory backend needs no credentials; accept placeholders so
        // a bare `STORE_BACKEND=memory` run works.
        if backend == StoreBackend::Memory {
            return Ok(Self {
                project_id: get_env_or_default("FIREBASE_PROJECT_ID", "dispatch-local"),
                api_key: SecretString::from(get_env_or_default("FIREBASE_API_KEY", "unused")),
            });
        }
        Ok(Self {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: get_validated_secret("FIREBASE_API_KEY")?,
        })
    }
}

impl AdminConfig {
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

        let host = get_env_or_default("DISPATCH_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DISPATCH_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DISPATCH_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DISPATCH_PORT".to_string(), e.to_string()))?;
        let base_url =
            get_env_or_default("DISPATCH_BASE_URL", &format!("http://{host}:{port}"));

        let store_backend = get_env_or_default("STORE_BACKEND", "firestore")
            .parse::<StoreBackend>()
            .map_err(|e| ConfigError::InvalidEnvVar("STORE_BACKEND".to_string(), e))?;
        let store_timeout_secs = get_env_or_default("STORE_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let firebase = FirebaseConfig::from_env(store_backend)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            firebase,
            store_backend,
            store_timeout: Duration::from_secs(store_timeout_secs),
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
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
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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
    let len = s.len() as f64;
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("AIzaB3xY9mK2nL5pQ7rT0uW4zC6vD8eF1", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!(
            "firestore".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert_eq!(
            "memory".parse::<StoreBackend>().unwrap(),
            StoreBackend::Memory
        );
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            firebase: FirebaseConfig {
                project_id: "dispatch-test".to_string(),
                api_key: SecretString::from("AIzaB3xY9mK2nL5pQ7rT0uW4zC6vD8eF1"),
            },
            store_backend: StoreBackend::Memory,
            store_timeout: Duration::from_secs(10),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_firebase_config_debug_redacts_key() {
        let config = FirebaseConfig {
            project_id: "dispatch-test".to_string(),
            api_key: SecretString::from("AIzaB3xY9mK2nL5pQ7rT0uW4zC6vD8eF1"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("dispatch-test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIzaB3xY9mK2nL5pQ7rT0uW4zC6vD8eF1"));
    }
}
