//! Web API client

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::AuthenticationProvider;
use crate::error::{Error, Result};
use crate::request::{ApiRequest, QueryValue};
use crate::response::{ApiResponse, ErrorKind, STATUS_NO_RESPONSE};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How a request should be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Authentication {
    /// Send on the anonymous transport
    #[default]
    Anonymous,
    /// Send on the authenticated transport; fail fast without a provider
    Required,
    /// Send on the authenticated transport when a provider is configured,
    /// fall back to the anonymous transport otherwise
    Optional,
}

/// Authenticated transport with the header snapshot it was built from
///
/// The snapshot is kept so the transport can be rebuilt with the same headers
/// when the timeout changes.
#[derive(Debug, Clone)]
struct AuthenticatedTransport {
    client: reqwest::Client,
    headers: HeaderMap,
}

/// Client for a JSON-speaking HTTP API
///
/// Owns a base URI, a timeout and a pair of transports: one anonymous, one
/// carrying the authentication headers snapshotted when the
/// [`AuthenticationProvider`] was assigned. All network-level failures are
/// folded into the returned [`ApiResponse`] envelope; only caller errors and
/// success-path JSON decode failures surface as [`Error`].
///
/// Property mutators take `&mut self`, so they cannot race in-flight requests.
pub struct WebApiClient {
    base_uri: String,
    timeout: Duration,
    client: reqwest::Client,
    authenticated: Option<AuthenticatedTransport>,
    auth_provider: Option<Arc<dyn AuthenticationProvider>>,
}

impl std::fmt::Debug for WebApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebApiClient")
            .field("base_uri", &self.base_uri)
            .field("timeout", &self.timeout)
            .field("has_auth_provider", &self.auth_provider.is_some())
            .finish_non_exhaustive()
    }
}

impl WebApiClient {
    /// Create a client for the given base URI with the default 15 s timeout
    pub fn new(base_uri: impl Into<String>) -> Result<Self> {
        let timeout = DEFAULT_TIMEOUT;
        let client = Self::build_transport(timeout, None)?;
        Ok(Self {
            base_uri: base_uri.into(),
            timeout,
            client,
            authenticated: None,
            auth_provider: None,
        })
    }

    /// The base URI used for endpoint resolution
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Replace the base URI used for endpoint resolution
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = base_uri.into();
    }

    /// The configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the request timeout, rebuilding both transports
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        self.client = Self::build_transport(timeout, None)?;
        if let Some(transport) = self.authenticated.take() {
            let client = Self::build_transport(timeout, Some(transport.headers.clone()))?;
            self.authenticated = Some(AuthenticatedTransport {
                client,
                headers: transport.headers,
            });
        }
        Ok(())
    }

    /// The configured authentication provider
    pub fn authentication_provider(&self) -> Option<&Arc<dyn AuthenticationProvider>> {
        self.auth_provider.as_ref()
    }

    /// Assign or clear the authentication provider
    ///
    /// The provider's headers are captured eagerly here and baked into the
    /// authenticated transport; they are not re-read per request. Reassigning
    /// the provider reconstructs the transport with a fresh snapshot.
    pub fn set_authentication_provider(
        &mut self,
        provider: Option<Arc<dyn AuthenticationProvider>>,
    ) -> Result<()> {
        match provider {
            Some(provider) => {
                let headers = Self::header_map(&provider.authentication_headers())?;
                let client = Self::build_transport(self.timeout, Some(headers.clone()))?;
                self.authenticated = Some(AuthenticatedTransport { client, headers });
                self.auth_provider = Some(provider);
            }
            None => {
                self.authenticated = None;
                self.auth_provider = None;
            }
        }
        Ok(())
    }

    /// Execute an API request and decode the 2xx response body as JSON
    ///
    /// Timeouts, connection errors and non-2xx statuses are returned inside
    /// the envelope. A 2xx body that fails to decode propagates as
    /// [`Error::Json`].
    pub async fn request<T, R>(
        &self,
        api_request: &R,
        auth: Authentication,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        R: ApiRequest + ?Sized,
    {
        match self.dispatch(api_request, auth).await? {
            Ok(response) => Self::process_response(response).await,
            Err(err) => Ok(Self::transport_failure(err)),
        }
    }

    /// Execute an API request and return the raw response bytes
    ///
    /// A 2xx status yields the body bytes as the success payload; any other
    /// status yields a failure envelope carrying the body text.
    pub async fn download<R>(
        &self,
        api_request: &R,
        auth: Authentication,
    ) -> Result<ApiResponse<Vec<u8>>>
    where
        R: ApiRequest + ?Sized,
    {
        let response = match self.dispatch(api_request, auth).await? {
            Ok(response) => response,
            Err(err) => return Ok(Self::transport_failure(err)),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return Ok(Self::transport_failure(err)),
        };

        if status.is_success() {
            Ok(ApiResponse::success(bytes, status.as_u16()))
        } else {
            Ok(ApiResponse::failure(
                String::from_utf8_lossy(&bytes).into_owned(),
                i32::from(status.as_u16()),
                ErrorKind::General,
            ))
        }
    }

    /// GET `{base_uri}/{action}` and decode the JSON response
    pub async fn get<T>(&self, action: &str, auth: Authentication) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let transport = self.transport_for(auth)?;
        let url = self.action_url(action);
        tracing::debug!("GET {}", url);

        match transport.get(&url).send().await {
            Ok(response) => Self::process_response(response).await,
            Err(err) => Ok(Self::transport_failure(err)),
        }
    }

    /// POST a JSON body to `{base_uri}/{action}` and decode the JSON response
    pub async fn post_json<B, T>(
        &self,
        action: &str,
        body: &B,
        auth: Authentication,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let transport = self.transport_for(auth)?;
        let url = self.action_url(action);
        tracing::debug!("POST {}", url);

        match transport.post(&url).json(body).send().await {
            Ok(response) => Self::process_response(response).await,
            Err(err) => Ok(Self::transport_failure(err)),
        }
    }

    /// POST a URL-encoded form to `{base_uri}/{action}` and decode the JSON
    /// response
    pub async fn post_form<F, T>(
        &self,
        action: &str,
        form: &F,
        auth: Authentication,
    ) -> Result<ApiResponse<T>>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let transport = self.transport_for(auth)?;
        let url = self.action_url(action);
        tracing::debug!("POST {}", url);

        match transport.post(&url).form(form).send().await {
            Ok(response) => Self::process_response(response).await,
            Err(err) => Ok(Self::transport_failure(err)),
        }
    }

    /// PUT a JSON body to `{base_uri}/{action}` and decode the JSON response
    pub async fn put_json<B, T>(
        &self,
        action: &str,
        body: &B,
        auth: Authentication,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let transport = self.transport_for(auth)?;
        let url = self.action_url(action);
        tracing::debug!("PUT {}", url);

        match transport.put(&url).json(body).send().await {
            Ok(response) => Self::process_response(response).await,
            Err(err) => Ok(Self::transport_failure(err)),
        }
    }

    /// Resolve the descriptor into a reqwest request and send it
    ///
    /// The outer `Result` carries caller errors (missing provider, invalid
    /// base URI, content rendering); the inner one carries transport errors
    /// destined for the failure envelope.
    async fn dispatch<R>(
        &self,
        api_request: &R,
        auth: Authentication,
    ) -> Result<std::result::Result<reqwest::Response, reqwest::Error>>
    where
        R: ApiRequest + ?Sized,
    {
        let transport = self.transport_for(auth)?;
        let url = self.build_uri(api_request.path(), api_request.query_params())?;
        let method = api_request.method();
        tracing::debug!("{} {}", method, url);

        let mut builder = transport.request(method.as_reqwest(), url);

        if let Some(headers) = api_request.headers() {
            for (key, value) in headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
        }

        // Content only rides on POST and PUT
        if method.allows_body() {
            if let Some(content) = api_request.content() {
                let (body, content_type) = content.render()?.into_parts();
                builder = builder.header(CONTENT_TYPE, content_type).body(body);
            }
        }

        Ok(builder.send().await)
    }

    /// Map a 2xx response into a decoded success envelope, anything else into
    /// a failure envelope carrying the raw body
    async fn process_response<T>(response: reqwest::Response) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => return Ok(Self::transport_failure(err)),
            };
            tracing::trace!("response ({}): {}", status, body);

            // Decode failures on the success path propagate to the caller
            let results = serde_json::from_str(&body)?;
            return Ok(ApiResponse::success(results, status.as_u16()));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::trace!("response ({}): {}", status, body);
        Ok(ApiResponse::failure(
            body,
            i32::from(status.as_u16()),
            ErrorKind::General,
        ))
    }

    fn transport_failure<T>(err: reqwest::Error) -> ApiResponse<T> {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::General
        };
        tracing::debug!("request failed without a response: {}", err);
        ApiResponse::failure(err.to_string(), STATUS_NO_RESPONSE, kind)
    }

    fn transport_for(&self, auth: Authentication) -> Result<&reqwest::Client> {
        match auth {
            Authentication::Anonymous => Ok(&self.client),
            Authentication::Required => self
                .authenticated
                .as_ref()
                .map(|transport| &transport.client)
                .ok_or(Error::MissingAuthenticationProvider),
            Authentication::Optional => Ok(self
                .authenticated
                .as_ref()
                .map_or(&self.client, |transport| &transport.client)),
        }
    }

    /// Base URI + path + naive `key=value` query string
    ///
    /// The path replaces any path on the base URI; query values are rendered
    /// as-is, without percent-encoding.
    fn build_uri(&self, path: &str, query: Option<&BTreeMap<String, QueryValue>>) -> Result<Url> {
        let mut url = Url::parse(&self.base_uri)?;
        url.set_path(path);

        if let Some(params) = query {
            if !params.is_empty() {
                let query_string = params
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join("&");
                url.set_query(Some(&query_string));
            }
        }

        Ok(url)
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/{}", self.base_uri, action)
    }

    fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (key, value) in headers {
            let name =
                HeaderName::try_from(key.as_str()).map_err(|e| Error::Header(e.to_string()))?;
            let value =
                HeaderValue::try_from(value.as_str()).map_err(|e| Error::Header(e.to_string()))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn build_transport(
        timeout: Duration,
        default_headers: Option<HeaderMap>,
    ) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(headers) = default_headers {
            builder = builder.default_headers(headers);
        }
        builder.build().map_err(|e| Error::Build(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::OAuthProvider;

    #[test]
    fn test_client_new() {
        let client = WebApiClient::new("http://localhost").expect("Client should build");
        assert_eq!(client.base_uri(), "http://localhost");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert!(client.authentication_provider().is_none());
    }

    #[test]
    fn test_set_timeout_rebuilds_transports() {
        let mut client = WebApiClient::new("http://localhost").expect("Client should build");
        client
            .set_authentication_provider(Some(Arc::new(OAuthProvider::new("abc"))))
            .expect("Provider assignment should succeed");

        client
            .set_timeout(Duration::from_secs(3))
            .expect("Timeout change should succeed");
        assert_eq!(client.timeout(), Duration::from_secs(3));
        assert!(client.authentication_provider().is_some());
    }

    #[test]
    fn test_clearing_provider_drops_authenticated_transport() {
        let mut client = WebApiClient::new("http://localhost").expect("Client should build");
        client
            .set_authentication_provider(Some(Arc::new(OAuthProvider::new("abc"))))
            .expect("Provider assignment should succeed");
        client
            .set_authentication_provider(None)
            .expect("Clearing the provider should succeed");

        assert!(client.authentication_provider().is_none());
        assert!(matches!(
            client.transport_for(Authentication::Required),
            Err(Error::MissingAuthenticationProvider)
        ));
    }

    #[test]
    fn test_invalid_auth_header_is_rejected() {
        struct BadProvider;

        impl AuthenticationProvider for BadProvider {
            fn authentication_headers(&self) -> BTreeMap<String, String> {
                BTreeMap::from([("bad header name".to_string(), "value".to_string())])
            }
        }

        let mut client = WebApiClient::new("http://localhost").expect("Client should build");
        let result = client.set_authentication_provider(Some(Arc::new(BadProvider)));
        assert!(matches!(result, Err(Error::Header(_))));
    }

    #[test]
    fn test_build_uri_path_and_query() {
        let client = WebApiClient::new("http://localhost:8080/ignored").expect("Client");
        let mut params = BTreeMap::new();
        params.insert("limit".to_string(), QueryValue::Float(3.5));
        params.insert("name".to_string(), QueryValue::from("ada"));

        let url = client
            .build_uri("api/users", Some(&params))
            .expect("URL should build");
        assert_eq!(url.as_str(), "http://localhost:8080/api/users?limit=3.5&name=ada");
    }

    #[test]
    fn test_build_uri_without_query() {
        let client = WebApiClient::new("http://localhost:8080").expect("Client");
        let url = client.build_uri("ping", None).expect("URL should build");
        assert_eq!(url.as_str(), "http://localhost:8080/ping");

        let empty = BTreeMap::new();
        let url = client
            .build_uri("ping", Some(&empty))
            .expect("URL should build");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_action_url_is_simple_concatenation() {
        let client = WebApiClient::new("http://localhost:8080/v1").expect("Client");
        assert_eq!(client.action_url("things"), "http://localhost:8080/v1/things");
    }

    #[test]
    fn test_invalid_base_uri_surfaces_as_url_error() {
        let client = WebApiClient::new("not a base uri").expect("Client should build");
        let result = client.build_uri("ping", None);
        assert!(matches!(result, Err(Error::Url(_))));
    }
}
