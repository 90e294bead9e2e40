//! HTTP implementation of [`RagBackend`]
//!
//! Talks to the RAG service over `reqwest`. Any transport failure,
//! non-2xx status, or body that does not match the expected shape becomes
//! an `Err`.

use crate::backend::{ChatReply, ChatRequest, Document, HealthStatus, IngestReceipt, RagBackend};
use crate::config::BackendConfig;
use crate::error::{RagConsoleError, Result};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Multipart field carrying the uploaded document
const INGEST_FIELD: &str = "file";

/// HTTP client for the RAG backend
///
/// # Examples
///
/// ```
/// use ragconsole::backend::HttpBackend;
/// use ragconsole::config::BackendConfig;
///
/// let backend = HttpBackend::new(&BackendConfig::default()).unwrap();
/// assert_eq!(backend.base_url(), "http://localhost:8000");
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                RagConsoleError::Backend(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::info!(
            "Initialized RAG backend client: base_url={}, timeout={}s",
            base_url,
            config.timeout_seconds
        );

        Ok(Self { client, base_url })
    }

    /// Backend base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Fails on non-2xx, otherwise parses the body as `T`
async fn parse_body<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
    to_error: fn(String) -> RagConsoleError,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        tracing::warn!("{} returned error {}: {}", endpoint, status, error_text);
        return Err(to_error(format!("{} returned status {}", endpoint, status)).into());
    }

    let body = response.text().await.map_err(|e| {
        tracing::warn!("Failed to read {} response body: {}", endpoint, e);
        to_error(format!("Failed to read {} response: {}", endpoint, e))
    })?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!("Failed to parse {} response: {}", endpoint, e);
        to_error(format!("Malformed {} response: {}", endpoint, e)).into()
    })
}

#[async_trait]
impl RagBackend for HttpBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        let url = self.endpoint("chat");
        tracing::debug!("POST {} ({} chars)", url, message.len());

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Chat request failed: {}", e);
                RagConsoleError::Http(e)
            })?;

        parse_body(response, "/chat", RagConsoleError::Backend).await
    }

    async fn ingest(&self, document: Document) -> Result<IngestReceipt> {
        let url = self.endpoint("ingest");
        tracing::debug!(
            "POST {} (file={}, {} bytes)",
            url,
            document.file_name,
            document.bytes.len()
        );

        let part = Part::bytes(document.bytes).file_name(document.file_name);
        let form = Form::new().part(INGEST_FIELD, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Ingest request failed: {}", e);
                RagConsoleError::Http(e)
            })?;

        parse_body(response, "/ingest", RagConsoleError::Ingest).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("health");
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(RagConsoleError::Http)?;

        parse_body(response, "/health", RagConsoleError::Backend).await
    }
}
