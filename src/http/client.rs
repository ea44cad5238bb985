//! HTTP implementation of the gateway boundary.
//!
//! The base URL is injected by the caller (config file or `--server`);
//! nothing here guesses one.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Gateway, GatewayError};
use crate::types::{
    DigestResult, ExplainAnswer, HealthStatus, IndexResult, OnboardResult, PreflightResult,
    SnippetRequest,
};

/// Gateway client backed by `reqwest`.
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ExplainRequest<'a> {
    question: &'a str,
}

#[derive(Serialize)]
struct PathRequest<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct DigestRequest<'a> {
    path: &'a str,
    days: u32,
}

#[derive(Serialize)]
struct OnboardRequest<'a> {
    path: &'a str,
    index: bool,
}

impl HttpGateway {
    /// Create a new client pointing at the given gateway URL.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Return the base URL (for display/logging).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a snippet fetch, query parameters percent-encoded.
    pub fn snippet_url(&self, request: &SnippetRequest) -> String {
        format!(
            "{}/snippet?file={}&start={}&end={}",
            self.base_url,
            urlencoding::encode(&request.file),
            request.start,
            request.end
        )
    }

    fn transport_error(url: &str, err: &reqwest::Error) -> GatewayError {
        GatewayError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Turn a non-success response into a status error, reading `detail`.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(status, body = %body, "gateway returned error status");
        Err(GatewayError::from_status(status, &body))
    }

    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        what: &'static str,
    ) -> Result<T, GatewayError> {
        resp.json().await.map_err(|e| GatewayError::Decode {
            what,
            message: e.to_string(),
        })
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
        what: &'static str,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, route);
        tracing::debug!(%url, "POST");

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, &e))?;

        let resp = Self::check_status(resp).await?;
        Self::decode(resp, what).await
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let url = format!("{}/health", self.base_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, &e))?;

        let resp = Self::check_status(resp).await?;
        Self::decode(resp, "health").await
    }

    async fn explain(&self, question: &str) -> Result<ExplainAnswer, GatewayError> {
        self.post_json("/explain", &ExplainRequest { question }, "explain")
            .await
    }

    async fn preflight(&self, path: &str) -> Result<PreflightResult, GatewayError> {
        self.post_json("/preflight", &PathRequest { path }, "preflight")
            .await
    }

    async fn index(&self, path: &str) -> Result<IndexResult, GatewayError> {
        self.post_json("/index", &PathRequest { path }, "index")
            .await
    }

    async fn change_digest(&self, path: &str, days: u32) -> Result<DigestResult, GatewayError> {
        self.post_json("/change-digest", &DigestRequest { path, days }, "change digest")
            .await
    }

    async fn onboard(&self, path: &str, index: bool) -> Result<OnboardResult, GatewayError> {
        self.post_json("/onboard", &OnboardRequest { path, index }, "onboard")
            .await
    }

    async fn snippet(&self, request: &SnippetRequest) -> Result<String, GatewayError> {
        if !request.is_well_formed() {
            return Err(GatewayError::InvalidRequest(format!(
                "snippet range {request} ends before it starts"
            )));
        }
        let url = self.snippet_url(request);
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, &e))?;

        let resp = Self::check_status(resp).await?;
        resp.text().await.map_err(|e| GatewayError::Decode {
            what: "snippet",
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = HttpGateway::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_client_preserves_url_without_trailing_slash() {
        let client = HttpGateway::new("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_snippet_url_carries_range() {
        let client = HttpGateway::new("http://localhost:8000");
        let req = SnippetRequest {
            file: "a.py".into(),
            start: 10,
            end: 20,
        };
        assert_eq!(
            client.snippet_url(&req),
            "http://localhost:8000/snippet?file=a.py&start=10&end=20"
        );
    }

    #[test]
    fn test_snippet_url_encodes_file() {
        let client = HttpGateway::new("http://localhost:8000");
        let req = SnippetRequest {
            file: "src/my file.py".into(),
            start: 1,
            end: 2,
        };
        assert!(client
            .snippet_url(&req)
            .contains("file=src%2Fmy%20file.py"));
    }

    #[tokio::test]
    async fn test_inverted_snippet_range_rejected_locally() {
        let client = HttpGateway::new("http://127.0.0.1:19999");
        let req = SnippetRequest {
            file: "a.py".into(),
            start: 20,
            end: 10,
        };
        let err = client.snippet(&req).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_client_connection_refused() {
        let client = HttpGateway::new("http://127.0.0.1:19999");
        let result = client.health().await;
        let err = result.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
        assert!(
            err.to_string().contains("failed to reach gateway"),
            "Unexpected error: {err}"
        );
    }
}
