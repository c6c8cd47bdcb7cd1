//! HTTP transport seam
//!
//! The protocol core never touches HTTP directly; it goes through the
//! [`Transport`] trait, which carries no protocol knowledge. The bundled
//! [`HttpTransport`] implementation wraps `reqwest` with bounded timeouts
//! (the remote service is third-party, so unbounded waits would stall
//! callers indefinitely). Embedders and tests can substitute their own
//! implementation.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Default connect timeout for the bundled transport
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default overall request timeout for the bundled transport
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uniform response shape returned by every transport call
///
/// The core inspects nothing about the transport beyond these four fields.
#[derive(Clone, Debug, Default)]
pub struct TransportResponse {
    /// Whether the HTTP status indicated success (2xx)
    pub successful: bool,

    /// Raw HTTP status code
    pub status: u16,

    /// Response body bytes (empty on error responses)
    pub body: Vec<u8>,

    /// Server-supplied error text for non-success responses
    pub error_text: String,
}

/// Header name/value pair
pub type Header = (String, String);

/// Query or form parameter name/value pair
pub type Param = (String, String);

/// Pluggable HTTP collaborator
///
/// Implementations perform one request per call, return the uniform
/// [`TransportResponse`], and surface network failures as errors. No
/// retries, no redirects-with-side-effects, no protocol knowledge.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET with query parameters.
    async fn get(
        &self,
        url: &str,
        headers: &[Header],
        params: &[Param],
    ) -> Result<TransportResponse>;

    /// GET with a pre-encoded query string (used when the server supplied
    /// the cursor already encoded and re-encoding would corrupt it).
    async fn get_raw_query(
        &self,
        url: &str,
        headers: &[Header],
        raw_query: &str,
    ) -> Result<TransportResponse>;

    /// POST a form-encoded parameter body.
    async fn post_form(
        &self,
        url: &str,
        headers: &[Header],
        params: &[Param],
    ) -> Result<TransportResponse>;

    /// POST a binary body (sent as `application/x-protobuf`).
    async fn post_bytes(
        &self,
        url: &str,
        headers: &[Header],
        body: &[u8],
    ) -> Result<TransportResponse>;
}

/// Bundled `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default bounded timeouts.
    pub fn new() -> Result<Self> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with explicit connect/request timeouts.
    pub fn with_timeouts(connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    fn apply_headers(
        mut request: reqwest::RequestBuilder,
        headers: &[Header],
    ) -> reqwest::RequestBuilder {
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }

    async fn finish(request: reqwest::RequestBuilder) -> Result<TransportResponse> {
        let response = request.send().await?;
        let status = response.status();
        let successful = status.is_success();

        if successful {
            let body = response.bytes().await?.to_vec();
            Ok(TransportResponse {
                successful,
                status: status.as_u16(),
                body,
                error_text: String::new(),
            })
        } else {
            // Error bodies are short server-side diagnostics; keep them as
            // text so the caller can surface a reason string.
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), error = %error_text, "non-success response");
            Ok(TransportResponse {
                successful,
                status: status.as_u16(),
                body: Vec::new(),
                error_text,
            })
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[Header],
        params: &[Param],
    ) -> Result<TransportResponse> {
        let request = Self::apply_headers(self.client.get(url).query(params), headers);
        Self::finish(request).await
    }

    async fn get_raw_query(
        &self,
        url: &str,
        headers: &[Header],
        raw_query: &str,
    ) -> Result<TransportResponse> {
        let full_url = if raw_query.is_empty() {
            url.to_string()
        } else if url.contains('?') {
            format!("{url}&{raw_query}")
        } else {
            format!("{url}?{raw_query}")
        };
        let request = Self::apply_headers(self.client.get(full_url), headers);
        Self::finish(request).await
    }

    async fn post_form(
        &self,
        url: &str,
        headers: &[Header],
        params: &[Param],
    ) -> Result<TransportResponse> {
        let request = Self::apply_headers(self.client.post(url).form(params), headers);
        Self::finish(request).await
    }

    async fn post_bytes(
        &self,
        url: &str,
        headers: &[Header],
        body: &[u8],
    ) -> Result<TransportResponse> {
        let mut request = self.client.post(url).body(body.to_vec());
        // Binary bodies default to the protocol content type; callers may
        // override it by supplying their own.
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            request = request.header("Content-Type", "application/x-protobuf");
        }
        let request = Self::apply_headers(request, headers);
        Self::finish(request).await
    }
}
