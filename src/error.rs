use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while resolving credentials, talking to a provider or
/// loading settings.
///
/// Integrations never let these escape `execute`; they are logged and
/// collapsed into [`crate::IntegrationResult::Error`]. Rust callers that use
/// the lower-level clients can still match on them.
#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("No credentials found for provider '{provider}' with strategy '{strategy}'")]
    CredentialsMissing { provider: String, strategy: String },

    #[error("{provider} {field} not provided")]
    MissingCredentialField { provider: String, field: String },

    // Configuration errors (permanent failures)
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    // Network errors
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Network timeout after {timeout:?}: {message}")]
    NetworkTimeout { timeout: Duration, message: String },

    #[error("Upstream error: {status} from {endpoint}{}", .detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    Upstream {
        status: u16,
        endpoint: String,
        detail: Option<String>,
    },

    // Parse errors
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Operation cancelled")]
    Cancelled,

    // Registry errors
    #[error("Unknown integration: {0}")]
    UnknownIntegration(String),

    #[error("Duplicate integration id: {0}")]
    DuplicateIntegration(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Coarse failure classes an integration can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resolver had nothing for the provider/strategy pair
    CredentialsMissing,
    /// Credentials or settings present but unusable
    Configuration,
    /// Network failure, timeout or non-2xx status
    Upstream,
    /// Body could not be read as the expected structure
    MalformedResponse,
    /// Caller cancelled the operation
    Cancelled,
    /// Anything else
    Internal,
}

impl Error {
    /// Wrap a transport error, dropping the request URL.
    ///
    /// Request URLs carry the API key as a query parameter, so they must not
    /// end up in messages or logs.
    pub fn http(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }

    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialsMissing { .. } => ErrorKind::CredentialsMissing,
            Self::MissingCredentialField { .. } | Self::Config(_) | Self::InvalidInput { .. } => {
                ErrorKind::Configuration
            }
            Self::Http(_) | Self::NetworkTimeout { .. } | Self::Upstream { .. } => {
                ErrorKind::Upstream
            }
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::UnknownIntegration(_)
            | Self::DuplicateIntegration(_)
            | Self::Logging(_)
            | Self::Serde(_) => ErrorKind::Internal,
        }
    }

    /// Render the error together with every `source()` below it.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let _ = write!(rendered, ": caused by: {cause}");
            source = cause.source();
        }
        rendered
    }
}

pub type Result<T> = std::result::Result<T, Error>;
