//! Error types for the updates crate

use std::fmt;

use thiserror::Error;

/// Result type alias for update operations
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised while building an update client.
///
/// The client operations themselves never return these; network and cache
/// trouble degrades to "no update" or an invalid license instead.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// HTTP transport could not be built
    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: lodestar_http::HttpError,
    },

    /// URL parsing errors
    #[error("Invalid server URL '{url}': {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl UpdateError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Why a single server attempt did not produce a usable answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// Connection refused, timeout, TLS failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Response arrived with a status other than 200
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// 200 response whose body could not be used
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Server refused the request with an explanatory message
    #[error("rejected: {0}")]
    Rejected(String),
}

/// One failed server in a fallback sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAttempt {
    pub server: String,
    pub error: AttemptError,
}

impl fmt::Display for ServerAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.server, self.error)
    }
}

/// Why an update check produced no answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    #[error("no update servers configured")]
    NoServers,

    #[error("all {} update servers failed", .0.len())]
    AllServersFailed(Vec<ServerAttempt>),

    #[error("version comparison failed: {0}")]
    InvalidVersion(String),
}
