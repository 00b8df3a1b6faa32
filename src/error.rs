//! Unified error handling for the geotriage crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors available where a caller needs the detail.
//!
//! # Architecture
//!
//! - [`GeoErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Lookup failures never reach the disambiguation engine: the geocoder
//! boundary logs them and degrades to "no result". The variants below surface
//! from construction (configuration, reference data) and from the CLI.

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{LookupError, ReferenceError};

/// Common trait for all geotriage error types
pub trait GeoErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, upstream status)
    Network,
    /// Parsing and decoding errors
    Parsing,
    /// Static reference dataset errors
    ReferenceData,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::ReferenceData => "reference_data",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the geotriage crate
#[derive(Error, Debug)]
pub enum Error {
    /// Geocoder lookup errors
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Reference dataset errors
    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GeoErrorTrait for LookupError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::ServerError(_) | Self::Timeout => ErrorCategory::Network,
            Self::Decode(_) => ErrorCategory::Parsing,
            Self::InvalidUrl(_) => ErrorCategory::Config,
        }
    }
}

impl GeoErrorTrait for ReferenceError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::ReferenceData
    }
}

impl GeoErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Lookup(e) => e.is_recoverable(),
            Self::Reference(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Toml(_) => false,
            Self::Http(_) => true, // HTTP errors are often transient
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Lookup(e) => e.category(),
            Self::Reference(_) => ErrorCategory::ReferenceData,
            Self::Http(_) => ErrorCategory::Network,
            Self::Json(_) | Self::Toml(_) => ErrorCategory::Parsing,
            Self::Io(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let lookup_err = Error::Lookup(LookupError::Timeout);
        assert_eq!(lookup_err.category(), ErrorCategory::Network);

        let decode_err = Error::Lookup(LookupError::Decode("bad json".into()));
        assert_eq!(decode_err.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Lookup(LookupError::Timeout).is_recoverable());
        assert!(Error::Lookup(LookupError::ServerError(503)).is_recoverable());
        assert!(!Error::Lookup(LookupError::ServerError(404)).is_recoverable());
    }

    #[test]
    fn test_reference_error_is_fatal() {
        let err: Error = ReferenceError::DuplicateAlias {
            alias: "UK".into(),
            first: "united kingdom".into(),
            second: "ukraine".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::ReferenceData);
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("'UK'"));
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("PHOTON_SERVER is not set");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.to_string(), "Something went wrong");
    }
}
