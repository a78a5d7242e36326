//! Authentication providers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Produces the headers that mark a request as authenticated
///
/// Headers are recomputed on demand; the client snapshots them once when the
/// provider is assigned.
pub trait AuthenticationProvider: Send + Sync {
    /// The headers to inject into authenticated requests
    fn authentication_headers(&self) -> BTreeMap<String, String>;
}

/// The OAuth token types understood by [`OAuthProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OAuthTokenType {
    /// Bearer token
    #[default]
    Bearer,
}

impl OAuthTokenType {
    /// The authorization scheme string for this token type
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
        }
    }
}

/// OAuth authentication provider yielding an `Authorization` header
///
/// Token and scheme are fixed at construction; there is no refresh handling.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    token_type: OAuthTokenType,
    auth_token: String,
}

impl OAuthProvider {
    /// Create a bearer token provider
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            token_type: OAuthTokenType::Bearer,
            auth_token: auth_token.into(),
        }
    }

    /// Create a provider with an explicit token type
    pub fn with_token_type(auth_token: impl Into<String>, token_type: OAuthTokenType) -> Self {
        Self {
            token_type,
            auth_token: auth_token.into(),
        }
    }

    /// The configured token
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// The configured token type
    pub fn token_type(&self) -> OAuthTokenType {
        self.token_type
    }
}

impl AuthenticationProvider for OAuthProvider {
    fn authentication_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            "Authorization".to_string(),
            format!("{} {}", self.token_type.scheme(), self.auth_token),
        )])
    }
}

/// The response of an OAuth token endpoint request
///
/// `expires_in` is carried for callers that want to schedule re-authentication
/// themselves; [`OAuthProvider`] does not act on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    /// Type of the issued token (usually `bearer`)
    #[serde(default)]
    pub token_type: Option<String>,
    /// The access token
    #[serde(default)]
    pub access_token: Option<String>,
    /// Expiration time in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Error code, present on failed token requests
    #[serde(default)]
    pub error: Option<String>,
    /// Error description, present on failed token requests
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AuthTokenResponse {
    /// Whether the token request succeeded (no error fields populated)
    pub fn is_success(&self) -> bool {
        let blank = |field: &Option<String>| {
            field
                .as_deref()
                .is_none_or(|value| value.trim().is_empty())
        };
        blank(&self.error) && blank(&self.error_description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_headers() {
        let provider = OAuthProvider::new("token123");
        let headers = provider.authentication_headers();

        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer token123")
        );
    }

    #[test]
    fn test_token_type_scheme() {
        assert_eq!(OAuthTokenType::Bearer.scheme(), "Bearer");
        let provider = OAuthProvider::with_token_type("abc", OAuthTokenType::Bearer);
        assert_eq!(provider.token_type(), OAuthTokenType::Bearer);
        assert_eq!(provider.auth_token(), "abc");
    }

    #[test]
    fn test_token_response_success() {
        let response: AuthTokenResponse = serde_json::from_str(
            r#"{"token_type": "bearer", "access_token": "abc", "expires_in": 3600}"#,
        )
        .expect("Token response should deserialize");

        assert!(response.is_success());
        assert_eq!(response.access_token.as_deref(), Some("abc"));
        assert_eq!(response.expires_in, Some(3600));
    }

    #[test]
    fn test_token_response_error() {
        let response: AuthTokenResponse = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "bad credentials"}"#,
        )
        .expect("Token response should deserialize");

        assert!(!response.is_success());
        assert_eq!(response.error.as_deref(), Some("invalid_grant"));
    }

    #[test]
    fn test_token_response_blank_error_is_success() {
        let response: AuthTokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "error": "  "}"#)
                .expect("Token response should deserialize");
        assert!(response.is_success());
    }
}
