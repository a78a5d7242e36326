//! Response envelope types

/// Status code reported when a call never produced an HTTP response
/// (timeout, DNS failure, connection refused, ...)
pub const STATUS_NO_RESPONSE: i32 = -1;

/// The kind of failure carried by a [`ApiResponse::Failure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport error, non-2xx status or any other non-timeout failure
    General,
    /// The request exceeded the configured timeout
    Timeout,
}

/// The result of one API call
///
/// Exactly one variant is populated. A status code is always present:
/// failures that never reached the network carry [`STATUS_NO_RESPONSE`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// The server answered with a 2xx status and the body was decoded
    Success {
        /// HTTP status code of the response
        status_code: u16,
        /// Decoded response payload
        results: T,
    },
    /// The call failed: transport error, timeout or non-2xx status
    Failure {
        /// HTTP status code, or [`STATUS_NO_RESPONSE`] if no response arrived
        status_code: i32,
        /// Raw response body for HTTP failures, transport error text otherwise
        error_message: String,
        /// Failure classification
        error_kind: ErrorKind,
    },
}

impl<T> ApiResponse<T> {
    /// Create a successful response envelope
    pub fn success(results: T, status_code: u16) -> Self {
        Self::Success {
            status_code,
            results,
        }
    }

    /// Create a failed response envelope
    pub fn failure(error_message: impl Into<String>, status_code: i32, kind: ErrorKind) -> Self {
        Self::Failure {
            status_code,
            error_message: error_message.into(),
            error_kind: kind,
        }
    }

    /// Whether the call completed with a 2xx status
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Status code of the response, [`STATUS_NO_RESPONSE`] when the call
    /// never produced one
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Success { status_code, .. } => i32::from(*status_code),
            Self::Failure { status_code, .. } => *status_code,
        }
    }

    /// The decoded payload of a successful call
    pub fn results(&self) -> Option<&T> {
        match self {
            Self::Success { results, .. } => Some(results),
            Self::Failure { .. } => None,
        }
    }

    /// Consume the envelope, returning the payload of a successful call
    pub fn into_results(self) -> Option<T> {
        match self {
            Self::Success { results, .. } => Some(results),
            Self::Failure { .. } => None,
        }
    }

    /// Error message of a failed call
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_message, .. } => Some(error_message),
        }
    }

    /// Failure classification of a failed call
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_kind, .. } => Some(*error_kind),
        }
    }
}
