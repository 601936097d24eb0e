//! HTTP collaborator
//!
//! Every network call the resolver makes goes through [`HttpClient`], so the
//! transport can be swapped (pooling, proxies, test doubles) without touching
//! the dispatch logic. [`ReqwestClient`] is the default implementation.

use crate::error::ResolveError;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Upper bound on a response body; API payloads are far smaller
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Status, content type and body of a completed request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy)
    pub body: String,
}

impl HttpResponse {
    /// True for exactly HTTP 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// True when the Content-Type starts with `application/json`
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("application/json"))
    }

    /// Deserialize the body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ResolveError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn any status other than 200 into an error
    pub fn require_ok(self) -> Result<Self, ResolveError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(ResolveError::Status {
                status: self.status,
            })
        }
    }
}

/// Outbound HTTP capability consumed by the resolver
///
/// Implementations report transport problems (timeouts, refused
/// connections, oversized bodies) as `Err`; any HTTP status, including
/// errors, is a successful `HttpResponse`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url`, giving up after `timeout`
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ResolveError>;

    /// POST `body` as JSON to `url`, giving up after `timeout`
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, ResolveError>;
}

/// [`HttpClient`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client sending `user_agent` (or the default) on every request
    pub fn new(user_agent: Option<&str>) -> Result<Self, ResolveError> {
        let mut headers = HeaderMap::new();
        let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*;q=0.8"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ResolveError::ClientBuildError)?;

        Ok(Self { client })
    }

    async fn finish(response: reqwest::Response) -> Result<HttpResponse, ResolveError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = read_body_limited(response, MAX_BODY_BYTES).await?;

        Ok(HttpResponse {
            status,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ResolveError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(ResolveError::from_reqwest)?;
        Self::finish(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, ResolveError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(ResolveError::from_reqwest)?;
        Self::finish(response).await
    }
}

/// Read the response body, refusing anything over `limit` bytes
async fn read_body_limited(response: reqwest::Response, limit: usize) -> Result<Bytes, ResolveError> {
    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(ResolveError::BodyTooLarge { limit });
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(ResolveError::from_reqwest)?;
        if body.len() + bytes.len() > limit {
            return Err(ResolveError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&bytes);
    }

    Ok(Bytes::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            content_type: content_type.map(|s| s.to_string()),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_is_ok_only_for_200() {
        assert!(response(200, None, "").is_ok());
        assert!(!response(201, None, "").is_ok());
        assert!(!response(404, None, "").is_ok());
    }

    #[test]
    fn test_is_json() {
        assert!(response(200, Some("application/json"), "").is_json());
        assert!(response(200, Some("application/json; charset=utf-8"), "").is_json());
        assert!(response(200, Some("Application/JSON"), "").is_json());
        assert!(!response(200, Some("text/html"), "").is_json());
        assert!(!response(200, None, "").is_json());
    }

    #[test]
    fn test_json_decoding() {
        let value: serde_json::Value = response(200, None, r#"{"a":1}"#).json().unwrap();
        assert_eq!(value["a"], 1);

        let err = response(200, None, "not json")
            .json::<serde_json::Value>()
            .unwrap_err();
        assert!(matches!(err, ResolveError::Decode(_)));
    }

    #[test]
    fn test_require_ok() {
        assert!(response(200, None, "").require_ok().is_ok());
        assert!(matches!(
            response(503, None, "").require_ok(),
            Err(ResolveError::Status { status: 503 })
        ));
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::new(None).is_ok());
        assert!(ReqwestClient::new(Some("Custom/1.0")).is_ok());
        // Invalid header values fall back to the default agent
        assert!(ReqwestClient::new(Some("bad\nagent")).is_ok());
    }
}
