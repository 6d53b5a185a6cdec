//! Remote embedding provider for OpenAI-compatible `/embeddings` endpoints.
//!
//! Works against OpenAI itself and the self-hosted servers that mimic its
//! API (text-embeddings-inference, vLLM, Ollama's compatibility layer).
//!
//! # Feature Gate
//!
//! This module requires the `embedding-http` feature.

use crate::embedding::EmbeddingProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillmatch_core::{Error, Result};
use std::time::Duration;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding provider backed by an HTTP embeddings endpoint.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

impl HttpEmbeddingProvider {
    /// Create a provider posting to `{base_url}/embeddings`.
    ///
    /// The remote service does not report its dimension up front, so it
    /// must be supplied and is checked against every response.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(Error::config("embedding.model is required for 'http'"));
        }
        if dimension == 0 {
            return Err(Error::config("embedding.dimension is required for 'http'"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
            dimension,
        })
    }

    /// The resolved embeddings URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding_unavailable("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            Error::embedding_unavailable(format!("Failed to call {}: {e}", self.endpoint))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::embedding_unavailable(format!(
                "Embeddings endpoint returned {status}: {error_text}"
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::embedding_unavailable(format!("Failed to parse embeddings response: {e}"))
        })?;

        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != texts.len() {
            return Err(Error::embedding_unavailable(format!(
                "Endpoint returned {} embeddings for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "http"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish()
    }
}
