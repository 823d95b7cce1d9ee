//! Nominatim client error types

use thiserror::Error;

/// Error code for URLs that could not be assembled from the configuration
pub const MALFORMED_URL: &str = "NOMINATIM_CLIENT:MALFORMED_URL";

/// Error code for every failure that happens while talking to the service
pub const GENERAL_REQUEST_ERROR: &str = "NOMINATIM_CLIENT:GENERAL_REQUEST_ERROR";

/// Errors that can occur during geocoding operations
///
/// None of these are retried by the client; they all propagate to the caller.
#[derive(Debug, Error)]
pub enum NominatimError {
    /// The endpoint plus parameters did not form a valid URL
    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl {
        /// The URL that failed to parse
        url: String,
        /// Parser message
        reason: String,
    },

    /// The service answered with a status code >= 400
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body (empty if it could not be read)
        body: String,
    },

    /// Connection to the service failed (DNS, refused, I/O)
    #[error("Connection failed: {message}")]
    Connection {
        /// Human-readable context
        message: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NominatimError {
    /// Wrap a transport error, mapping timeouts to [`NominatimError::Timeout`]
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if err.is_decode() {
            Self::Connection {
                message: "reading response body failed".to_string(),
                source: err,
            }
        } else {
            let message = err.url().map_or_else(
                || "request failed".to_string(),
                |url| format!("connecting to {url} failed"),
            );
            Self::Connection {
                message,
                source: err,
            }
        }
    }

    /// Stable error code for this failure
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedUrl { .. } | Self::Configuration(_) => MALFORMED_URL,
            _ => GENERAL_REQUEST_ERROR,
        }
    }

    /// HTTP status of the failed response, if the service answered at all
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for errors caused by local configuration
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MalformedUrl { .. } | Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = NominatimError::MalformedUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(err.error_code(), MALFORMED_URL);
        assert!(err.is_configuration_error());

        let err = NominatimError::Http {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.error_code(), GENERAL_REQUEST_ERROR);
        assert!(!err.is_configuration_error());

        let err = NominatimError::Timeout { timeout_secs: 5 };
        assert_eq!(err.error_code(), GENERAL_REQUEST_ERROR);
    }

    #[test]
    fn test_status() {
        let err = NominatimError::Http {
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            NominatimError::Configuration("x".to_string()).status(),
            None
        );
    }

    #[test]
    fn test_error_display() {
        let err = NominatimError::Http {
            status: 404,
            body: "Page not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Page not found"));

        let err = NominatimError::Timeout { timeout_secs: 10 };
        assert!(err.to_string().contains("10"));

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = NominatimError::Decode(json_err);
        assert!(err.to_string().starts_with("Decode error"));
    }
}
