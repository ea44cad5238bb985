//! Boundary to the RepoGuide gateway.
//!
//! Controllers only see the [`Gateway`] trait; [`client::HttpGateway`] is the
//! real implementation and tests substitute their own.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{
    DigestResult, ExplainAnswer, HealthStatus, IndexResult, OnboardResult, PreflightResult,
    SnippetRequest,
};

pub use client::HttpGateway;

/// Failure of a single gateway call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The request never produced a response
    #[error("failed to reach gateway at {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success status; `message` is the server's `detail` or `HTTP <code>`
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Success status with a body that did not match the expected shape
    #[error("failed to parse {what} response: {message}")]
    Decode { what: &'static str, message: String },

    /// Rejected before any request was sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Build a status error from a response body.
    ///
    /// A string `detail` is used as-is, any other JSON `detail` is serialized,
    /// and a missing or unparseable body falls back to `HTTP <code>`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned())
            .and_then(|d| match d {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) if s.is_empty() => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            });

        GatewayError::Status {
            status,
            message: detail.unwrap_or_else(|| format!("HTTP {status}")),
        }
    }
}

/// Operations exposed by the gateway. All of them are uncancellable and have
/// no client-side timeout.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, GatewayError>;

    async fn explain(&self, question: &str) -> Result<ExplainAnswer, GatewayError>;

    async fn preflight(&self, path: &str) -> Result<PreflightResult, GatewayError>;

    async fn index(&self, path: &str) -> Result<IndexResult, GatewayError>;

    async fn change_digest(&self, path: &str, days: u32) -> Result<DigestResult, GatewayError>;

    async fn onboard(&self, path: &str, index: bool) -> Result<OnboardResult, GatewayError>;

    /// Raw text of a source excerpt
    async fn snippet(&self, request: &SnippetRequest) -> Result<String, GatewayError>;
}
