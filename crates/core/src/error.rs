//! Error types for the fair-price engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by external data providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the fair-price engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (malformed or out-of-domain input).
    #[error("Data error: {0}")]
    Data(String),

    /// Insufficient data for computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Quoted or reference price is non-positive or non-finite.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Commodity name did not resolve against the catalog.
    #[error("Unknown commodity: {0}")]
    UnknownCommodity(String),

    /// Failure reported by an external data provider, passed through unchanged.
    #[error("Upstream error from {provider}: {source}")]
    Upstream {
        provider: String,
        source: BoxError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create an invalid price error.
    pub fn invalid_price(msg: impl Into<String>) -> Self {
        Error::InvalidPrice(msg.into())
    }

    /// Create an unknown commodity error.
    pub fn unknown_commodity(name: impl Into<String>) -> Self {
        Error::UnknownCommodity(name.into())
    }

    /// Wrap a provider failure.
    pub fn upstream(provider: impl Into<String>, source: BoxError) -> Self {
        Error::Upstream {
            provider: provider.into(),
            source,
        }
    }

    /// Whether this is an insufficient data error.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Error::InsufficientData(_))
    }
}
