//! Error types for the Chatter core library.
//!
//! Every failure the client can observe is a [`ChatterError`]. Subscription
//! failures flip the connectivity flag; write failures (send, clear) surface a
//! notice to the user. Neither is fatal to the application.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Config | Config file, environment, and validation errors |
//! | E2001-E2099 | Backend | Realtime database transport, status, and stream errors |
//! | E3001-E3099 | Client | Guards enforced before any network I/O |
//! | E9001-E9099 | General | Internal, IO, and serialization errors |

use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Configuration for reconnect behavior with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, `0` meaning unlimited
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 for doubling)
    pub backoff_multiplier: f64,
    /// Whether to add jitter so many clients don't reconnect in lockstep
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Retry settings for re-establishing a dropped subscription stream.
    pub fn for_subscription(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Fixed, fast retries. Used by tests and the in-memory backend.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts == 0 || attempt < self.max_attempts
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt.min(32) as i32);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.jitter {
            // up to 25% extra
            capped_delay * (1.0 + rand_jitter() * 0.25)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Cheap jitter source based on the current timestamp, in `0.0..1.0`.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

/// The main error type for the Chatter core library.
#[derive(Debug, Error)]
pub enum ChatterError {
    // ========================================================================
    // Config Errors (E1001-E1099)
    // ========================================================================
    /// A required setting is absent
    #[error("[E1001] Missing required configuration: {0}")]
    MissingConfig(String),

    /// A setting is present but unusable
    #[error("[E1002] Invalid configuration value for {key}: {message}")]
    InvalidConfigValue { key: String, message: String },

    /// A config source could not be read or parsed
    #[error("[E1003] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    // ========================================================================
    // Backend Errors (E2001-E2099)
    // ========================================================================
    /// Could not reach the database host
    #[error("[E2001] Connection to realtime database failed: {0}")]
    ConnectionFailed(String),

    /// The database answered with a non-success status
    #[error("[E2002] Realtime database request failed: {0}")]
    RequestFailed(String),

    /// Security rules rejected the request
    #[error("[E2003] Permission denied by realtime database: {0}")]
    PermissionDenied(String),

    /// Too many requests
    #[error("[E2004] Realtime database rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Request timed out
    #[error("[E2005] Realtime database request timed out after {0} seconds")]
    Timeout(u64),

    /// The event stream ended without being cancelled by us
    #[error("[E2006] Subscription stream closed: {0}")]
    StreamClosed(String),

    /// The server cancelled the subscription
    #[error("[E2007] Subscription cancelled by server: {0}")]
    SubscriptionCancelled(String),

    /// A response or stream event had an unexpected shape
    #[error("[E2008] Invalid payload from realtime database: {0}")]
    InvalidPayload(String),

    // ========================================================================
    // Client Errors (E3001-E3099)
    // ========================================================================
    /// Writes are refused while the subscription is down
    #[error("[E3001] Connection lost; message was not sent")]
    Offline,

    /// Blank or whitespace-only message text
    #[error("[E3002] Message text is empty")]
    EmptyMessage,

    /// Blank nickname
    #[error("[E3003] Nickname must not be empty")]
    InvalidNickname,

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO operation failed
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization or deserialization failed
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Chatter operations.
pub type ChatterResult<T> = Result<T, ChatterError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for ChatterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatterError::Timeout(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS)
        } else if err.is_connect() {
            ChatterError::ConnectionFailed(err.to_string())
        } else if let Some(status) = err.status() {
            ChatterError::from_status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            ChatterError::InvalidPayload(err.to_string())
        } else {
            ChatterError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatterError {
    fn from(err: serde_json::Error) -> Self {
        ChatterError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ChatterError {
    fn from(err: std::io::Error) -> Self {
        ChatterError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for ChatterError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ChatterError::MissingConfig(key),
            config::ConfigError::FileParse { uri, cause } => ChatterError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => ChatterError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => ChatterError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl ChatterError {
    /// Map a non-success HTTP status from the database onto an error.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => ChatterError::PermissionDenied(body),
            429 => ChatterError::RateLimited {
                retry_after_secs: 60,
            },
            408 | 504 => ChatterError::Timeout(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            _ => ChatterError::RequestFailed(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ChatterError::MissingConfig(_)
                | ChatterError::InvalidConfigValue { .. }
                | ChatterError::ConfigParseError(_)
        )
    }

    /// Returns true if this error came from the realtime database.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            ChatterError::ConnectionFailed(_)
                | ChatterError::RequestFailed(_)
                | ChatterError::PermissionDenied(_)
                | ChatterError::RateLimited { .. }
                | ChatterError::Timeout(_)
                | ChatterError::StreamClosed(_)
                | ChatterError::SubscriptionCancelled(_)
                | ChatterError::InvalidPayload(_)
        )
    }

    /// Returns true if the operation might succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChatterError::ConnectionFailed(_)
                | ChatterError::RateLimited { .. }
                | ChatterError::Timeout(_)
                | ChatterError::StreamClosed(_)
                | ChatterError::Offline
        )
    }

    /// Returns an error code suitable for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatterError::MissingConfig(_) => "E1001",
            ChatterError::InvalidConfigValue { .. } => "E1002",
            ChatterError::ConfigParseError(_) => "E1003",
            ChatterError::ConnectionFailed(_) => "E2001",
            ChatterError::RequestFailed(_) => "E2002",
            ChatterError::PermissionDenied(_) => "E2003",
            ChatterError::RateLimited { .. } => "E2004",
            ChatterError::Timeout(_) => "E2005",
            ChatterError::StreamClosed(_) => "E2006",
            ChatterError::SubscriptionCancelled(_) => "E2007",
            ChatterError::InvalidPayload(_) => "E2008",
            ChatterError::Offline => "E3001",
            ChatterError::EmptyMessage => "E3002",
            ChatterError::InvalidNickname => "E3003",
            ChatterError::Internal(_) => "E9001",
            ChatterError::IoError(_) => "E9002",
            ChatterError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            ChatterError::MissingConfig(_) => {
                Some("Set firebase.databaseURL in chatter.toml or FIREBASE_DATABASE_URL")
            }
            ChatterError::ConnectionFailed(_) | ChatterError::Offline => {
                Some("Check your internet connection")
            }
            ChatterError::PermissionDenied(_) | ChatterError::SubscriptionCancelled(_) => {
                Some("Check the database security rules or firebase.auth_token")
            }
            ChatterError::RateLimited { .. } => Some("Wait a moment before sending again"),
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatterError::ConnectionFailed("dns".to_string());
        assert_eq!(
            err.to_string(),
            "[E2001] Connection to realtime database failed: dns"
        );

        let err = ChatterError::Offline;
        assert!(err.to_string().starts_with("[E3001]"));
    }

    #[test]
    fn test_error_categorization() {
        assert!(ChatterError::MissingConfig("x".into()).is_config_error());
        assert!(!ChatterError::MissingConfig("x".into()).is_backend_error());
        assert!(ChatterError::StreamClosed("eof".into()).is_backend_error());
        assert!(!ChatterError::Offline.is_backend_error());
    }

    #[test]
    fn test_is_transient() {
        assert!(ChatterError::ConnectionFailed("x".into()).is_transient());
        assert!(ChatterError::StreamClosed("x".into()).is_transient());
        assert!(ChatterError::Timeout(10).is_transient());
        assert!(!ChatterError::PermissionDenied("x".into()).is_transient());
        assert!(!ChatterError::SubscriptionCancelled("x".into()).is_transient());
        assert!(!ChatterError::EmptyMessage.is_transient());
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ChatterError::from_status(401, "Unauthorized"),
            ChatterError::PermissionDenied(_)
        ));
        assert!(matches!(
            ChatterError::from_status(403, "Forbidden"),
            ChatterError::PermissionDenied(_)
        ));
        assert!(matches!(
            ChatterError::from_status(429, ""),
            ChatterError::RateLimited { .. }
        ));
        match ChatterError::from_status(500, "boom") {
            ChatterError::RequestFailed(msg) => assert_eq!(msg, "HTTP 500: boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_codes_unique_prefix() {
        assert_eq!(ChatterError::Offline.error_code(), "E3001");
        assert_eq!(ChatterError::InvalidPayload("x".into()).error_code(), "E2008");
        assert_eq!(ChatterError::Internal("x".into()).error_code(), "E9001");
    }

    #[test]
    fn test_user_suggestions() {
        assert!(ChatterError::Offline.user_suggestion().is_some());
        assert!(ChatterError::PermissionDenied("x".into())
            .user_suggestion()
            .is_some());
        assert!(ChatterError::Internal("x".into()).user_suggestion().is_none());
    }

    #[test]
    fn test_retry_delay_calculation() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(1));
    }

    #[test]
    fn test_retry_jitter_bounds() {
        let config = RetryConfig::for_subscription(0);
        let delay = config.delay_for_attempt(0);
        assert!(delay >= Duration::from_millis(500));
        assert!(delay <= Duration::from_millis(625));
    }

    #[test]
    fn test_allows_attempt() {
        let unlimited = RetryConfig::for_subscription(0);
        assert!(unlimited.allows_attempt(1_000));

        let bounded = RetryConfig::immediate(2);
        assert!(bounded.allows_attempt(0));
        assert!(bounded.allows_attempt(1));
        assert!(!bounded.allows_attempt(2));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ChatterError = io.into();
        assert!(matches!(err, ChatterError::IoError(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: ChatterError = json_err.into();
        assert!(matches!(err, ChatterError::SerializationError(_)));
    }
}
