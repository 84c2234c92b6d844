//! Transport seam between the pipeline and the network.
//!
//! DESIGN
//! ======
//! The pipeline never touches reqwest directly. It describes a call as a
//! [`PendingRequest`] (kept so it can be replayed after a refresh) and hands it
//! to a [`Transport`]. Status codes come back as data, not errors: only
//! connection-level failures are `Err`, so the pipeline decides what a 401 or a
//! 500 means.
//!
//! Multipart uploads are described by [`MultipartForm`] rather than a
//! `reqwest::multipart::Form`, which is consumed on send and so cannot be
//! replayed after a refresh.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;

pub const AUTHORIZATION: &str = "authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// An outbound call, retained until its response (or its replay's) resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    /// Path below the API prefix, e.g. `/users/profile`.
    pub path: String,
    /// Query pairs in order; repeated keys encode arrays (`tags=a&tags=b`).
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Multipart body; mutually exclusive with `body`.
    pub form: Option<MultipartForm>,
    /// Lower-cased header names.
    pub headers: BTreeMap<String, String>,
}

impl PendingRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None, form: None, headers: BTreeMap::new() }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be serialized.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?);
        self.form = None;
        Ok(self)
    }

    /// Attach a multipart body, replacing any JSON body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.form = Some(form);
        self.body = None;
        self
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Add the pair only when `value` is present.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn query_all<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.query.extend(values.into_iter().map(|v| (key.to_owned(), v.to_string())));
        self
    }

    /// Bearer token currently attached, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).and_then(|v| v.strip_prefix("Bearer "))
    }

    pub fn set_bearer(&mut self, token: &str) {
        self.headers.insert(AUTHORIZATION.to_owned(), format!("Bearer {token}"));
    }

    pub fn clear_bearer(&mut self) {
        self.headers.remove(AUTHORIZATION);
    }
}

// =============================================================================
// MULTIPART
// =============================================================================

/// A file part: name, content type and the whole payload in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub const DEFAULT_MIME_TYPE: &'static str = "application/octet-stream";

    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { file_name: file_name.into(), mime_type: Self::DEFAULT_MIME_TYPE.to_owned(), bytes: bytes.into() }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File(Attachment),
}

/// Ordered multipart fields. Cloneable so the request can be replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<(String, FormPart)>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.parts.push((name.to_owned(), FormPart::Text(value.to_string())));
        self
    }

    #[must_use]
    pub fn text_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    #[must_use]
    pub fn file(mut self, name: &str, attachment: Attachment) -> Self {
        self.parts.push((name.to_owned(), FormPart::File(attachment)));
        self
    }

    /// Text value of the first field called `name`.
    #[must_use]
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(field, part)| match part {
            FormPart::Text(value) if field == name => Some(value.as_str()),
            _ => None,
        })
    }

    fn to_reqwest(&self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name.clone(), value.clone()),
                FormPart::File(file) => {
                    let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.mime_type)
                        .map_err(|e| ApiError::Encode(format!("invalid mime type {}: {e}", file.mime_type)))?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// Body as text; invalid UTF-8 is replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not the expected JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends one request and reports the raw outcome.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] for connection-level failures only;
    /// every HTTP status, 401 included, is an `Ok`.
    async fn send(&self, request: &PendingRequest) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed transport rooted at `base_url + api_prefix`.
pub struct HttpTransport {
    http: reqwest::Client,
    api_root: String,
}

impl HttpTransport {
    /// Build a transport using the config's timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self { http, api_root: config.api_root() })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PendingRequest) -> Result<RawResponse, ApiError> {
        let url = format!("{}{}", self.api_root, request.path);
        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        let mut builder = self.http.request(request.method.into(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        } else if let Some(form) = &request.form {
            builder = builder.multipart(form.to_reqwest()?);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(RawResponse { status, body: body.to_vec() })
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport(format!("request timed out: {e}"))
    } else {
        ApiError::Transport(e.to_string())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
