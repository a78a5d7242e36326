//! Request content strategies
//!
//! Each [`RequestContent`] variant knows how to render itself into transport
//! body bytes plus the matching `Content-Type` header value.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;

/// Body content attached to a POST or PUT request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestContent {
    /// JSON-serialized payload, sent as `application/json`
    Json(serde_json::Value),
    /// Flat key/value form, sent as `application/x-www-form-urlencoded`
    Form(BTreeMap<String, String>),
    /// A single named file part, sent as `multipart/form-data`
    Multipart {
        /// Raw file bytes
        bytes: Vec<u8>,
        /// Form field name of the part
        name: String,
        /// File name reported for the part
        file_name: String,
        /// Content type of the part itself
        content_type: String,
    },
}

impl RequestContent {
    /// JSON content from any serializable payload
    pub fn json<B>(payload: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        Ok(Self::Json(serde_json::to_value(payload)?))
    }

    /// URL-encoded form content from flat key/value pairs
    pub fn form<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            values
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Multipart content wrapping raw bytes as a single named file part
    pub fn multipart(
        bytes: Vec<u8>,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::Multipart {
            bytes,
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Render this content into body bytes and a `Content-Type` header value
    pub fn render(&self) -> Result<RenderedContent> {
        match self {
            Self::Json(value) => Ok(RenderedContent {
                body: serde_json::to_vec(value)?,
                content_type: "application/json".to_string(),
            }),
            Self::Form(values) => Ok(RenderedContent {
                body: serde_urlencoded::to_string(values)?.into_bytes(),
                content_type: "application/x-www-form-urlencoded".to_string(),
            }),
            Self::Multipart {
                bytes,
                name,
                file_name,
                content_type,
            } => {
                let boundary = Uuid::new_v4().simple().to_string();
                let mut body = Vec::with_capacity(bytes.len() + 256);
                body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                body.extend_from_slice(bytes);
                body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

                Ok(RenderedContent {
                    body,
                    content_type: format!("multipart/form-data; boundary={boundary}"),
                })
            }
        }
    }
}

/// Transport-ready request body
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedContent {
    body: Vec<u8>,
    content_type: String,
}

impl RenderedContent {
    /// The rendered body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The `Content-Type` header value for the rendered body
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Consume the rendered content, returning `(body, content_type)`
    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.body, self.content_type)
    }
}
