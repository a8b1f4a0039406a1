//! HTTP reference clients for the embedding and rerank providers
//!
//! The embedding client speaks the OpenAI-compatible `/v1/embeddings` shape
//! (OpenAI, Azure, LM Studio, vLLM, text-embeddings-inference). The rerank
//! client speaks the Voyage-style `/v1/rerank` shape.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::traits::{
    EmbeddingProvider, ProviderError, ProviderResult, RerankProvider, RerankSignal,
};
use crate::config::{EmbeddingProviderConfig, RerankProviderConfig};
use crate::types::QueryVector;
use async_trait::async_trait;
use tracing::{debug, info, warn};

fn build_client(
    api_key: Option<&str>,
    env_var: &str,
    endpoint: &str,
    timeout_secs: u64,
) -> ProviderResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let api_key = api_key
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok());

    if let Some(key) = &api_key {
        let auth_value = format!("Bearer {}", key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ProviderError::Config(format!("invalid API key format: {}", e)))?,
        );
    } else {
        warn!("no API key provided for {}", endpoint);
    }

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {}", e)))
}

fn rate_limit_error(response: &reqwest::Response) -> ProviderError {
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|s| s * 1000);
    ProviderError::RateLimited {
        retry_after_ms: retry_after,
    }
}

/// Service error body, `{"error": {"message": ...}}` shape
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());

    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(&error_text) {
        return ProviderError::Request(format!("API error ({}): {}", status, parsed.error.message));
    }
    ProviderError::Request(format!("HTTP error ({}): {}", status, error_text))
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

/// OpenAI-compatible HTTP embedding provider
#[derive(Debug)]
pub struct HttpEmbeddingProvider {
    client: Client,
    config: EmbeddingProviderConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(config: EmbeddingProviderConfig) -> ProviderResult<Self> {
        info!(
            "initializing HTTP embedding provider: endpoint={}, model={}, dimensions={}",
            config.endpoint, config.model, config.dimensions
        );
        let client = build_client(
            config.api_key.as_deref(),
            "EMBEDDING_API_KEY",
            &config.endpoint,
            config.timeout_secs,
        )?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> ProviderResult<QueryVector> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: vec![text],
            // Only models that accept an output dimensionality get one
            dimensions: if self.config.model.contains("text-embedding-3") {
                Some(self.config.dimensions)
            } else {
                None
            },
            encoding_format: "float",
        };

        debug!("sending embedding request to {}", self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(rate_limit_error(&response));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("failed to parse response: {}", e)))?;

        if let Some(usage) = &body.usage {
            debug!("embedding request used {} tokens", usage.total_tokens);
        }

        let mut data = body.data;
        data.sort_by_key(|d| d.index);
        data.into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Decode("no embedding returned".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

// ---------------------------------------------------------------------------
// Reranking
// ---------------------------------------------------------------------------

/// Voyage-style HTTP rerank provider
#[derive(Debug)]
pub struct HttpRerankProvider {
    client: Client,
    config: RerankProviderConfig,
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: &'a [String],
    model: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    #[serde(default)]
    data: Vec<RerankSignal>,
    #[serde(default)]
    usage: Option<RerankUsage>,
}

#[derive(Debug, Deserialize)]
struct RerankUsage {
    total_tokens: usize,
}

impl HttpRerankProvider {
    pub fn new(config: RerankProviderConfig) -> ProviderResult<Self> {
        info!(
            "initializing HTTP rerank provider: endpoint={}",
            config.endpoint
        );
        let client = build_client(
            config.api_key.as_deref(),
            "RERANK_API_KEY",
            &config.endpoint,
            config.timeout_secs,
        )?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RerankProvider for HttpRerankProvider {
    async fn score(
        &self,
        query: &str,
        documents: &[String],
        top_k: usize,
        model: &str,
    ) -> ProviderResult<Vec<RerankSignal>> {
        let request = RerankRequest {
            query,
            documents,
            model,
            top_k,
        };

        debug!(
            "sending rerank request to {} for {} documents",
            self.config.endpoint,
            documents.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(rate_limit_error(&response));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: RerankResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("failed to parse response: {}", e)))?;

        if let Some(usage) = &body.usage {
            debug!("rerank request used {} tokens", usage.total_tokens);
        }

        Ok(body.data)
    }
}
