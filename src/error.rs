//! Error handling for the Airthings exporter.

/// A specialized `Result` type for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// The main error type for exporter operations.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Access token could not be obtained
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Request never produced a response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Exposition formatting failed
    #[error("Failed to encode metrics: {0}")]
    Encode(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Create a new authentication error
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new decode error
    pub fn decode_error(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new encoding error
    pub fn encode_error(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Whether this error came from token acquisition.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<std::fmt::Error> for ExporterError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
