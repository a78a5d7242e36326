//! Caller-side error types
//!
//! Network-level failures (timeouts, connection errors, non-2xx statuses) are
//! never surfaced through this module: they are folded into
//! [`ApiResponse::Failure`](crate::ApiResponse). `Error` covers the cases the
//! caller must fix before a request can be sent, plus success-path JSON decode
//! failures, which deliberately propagate instead of being enveloped.

use thiserror::Error;

/// Result type for webapi-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that are not wrapped into the response envelope
#[derive(Debug, Error)]
pub enum Error {
    /// An authenticated request was attempted without a configured provider
    #[error("an authentication provider must be configured for authenticated requests")]
    MissingAuthenticationProvider,

    /// Invalid base URI or request path
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form body could not be URL-encoded
    #[error("Form encoding error: {0}")]
    UrlEncoding(#[from] serde_urlencoded::ser::Error),

    /// An authentication header name or value is not valid for HTTP
    #[error("Invalid header: {0}")]
    Header(String),

    /// Transport construction failed
    #[error("Client build error: {0}")]
    Build(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_provider_display() {
        let error = Error::MissingAuthenticationProvider;
        assert_eq!(
            format!("{}", error),
            "an authentication provider must be configured for authenticated requests"
        );
    }

    #[test]
    fn test_header_display() {
        let error = Error::Header("invalid header value".to_string());
        assert_eq!(format!("{}", error), "Invalid header: invalid header value");
    }

    #[test]
    fn test_build_display() {
        let error = Error::Build("invalid config".to_string());
        assert_eq!(format!("{}", error), "Client build error: invalid config");
    }

    #[test]
    fn test_from_serde_json_error() {
        let result: std::result::Result<String, _> = serde_json::from_str("not valid json");
        let json_error = result.expect_err("Invalid JSON should produce an error");
        let error: Error = json_error.into();

        match error {
            Error::Json(err) => {
                assert!(
                    err.to_string().contains("expected"),
                    "Error message should describe JSON error"
                );
            }
            _ => panic!("Expected Error::Json"),
        }
    }

    #[test]
    fn test_from_url_parse_error() {
        let parse_error = url::Url::parse("not a url").expect_err("Invalid URL should fail");
        let error: Error = parse_error.into();
        assert!(matches!(error, Error::Url(_)));
    }
}
