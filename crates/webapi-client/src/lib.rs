//! Typed HTTP Web API client
//!
//! This crate wraps [`reqwest`] behind a small request/response contract:
//! callers describe one API call with a [`RequestBuilder`] (or a hand-written
//! [`ApiRequest`] impl), execute it through a [`WebApiClient`], and receive an
//! [`ApiResponse`] envelope — a decoded success payload or a failure carrying
//! the raw body, status code and error kind. Network-level failures never
//! surface as errors; callers branch on [`ApiResponse::is_success`] instead.
//!
//! Authenticated requests go through a second transport whose headers are
//! snapshotted from the configured [`AuthenticationProvider`] at assignment
//! time.
//!
//! # Example
//!
//! ```no_run
//! use serde::Deserialize;
//! use webapi_client::{Authentication, RequestBuilder, RequestMethod, WebApiClient};
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! async fn example() -> Result<(), webapi_client::Error> {
//!     let client = WebApiClient::new("https://api.example.com")?;
//!     let request = RequestBuilder::new()
//!         .method(RequestMethod::Get)
//!         .path("users/42")
//!         .query_param("verbose", "true")
//!         .build();
//!
//!     let response = client.request::<User, _>(&request, Authentication::Anonymous).await?;
//!     if let Some(user) = response.results() {
//!         println!("{}", user.name);
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod content;
mod error;
mod request;
mod response;

pub use auth::{AuthTokenResponse, AuthenticationProvider, OAuthProvider, OAuthTokenType};
pub use client::{Authentication, WebApiClient};
pub use content::{RenderedContent, RequestContent};
pub use error::{Error, Result};
pub use request::{ApiRequest, QueryValue, Request, RequestBuilder, RequestMethod};
pub use response::{ApiResponse, ErrorKind, STATUS_NO_RESPONSE};
