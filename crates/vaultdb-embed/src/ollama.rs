//! Blocking client for a local Ollama server's embeddings endpoint.
//!
//! One HTTP request per text. Connection failures, timeouts, non-2xx
//! statuses (an unknown model answers 404) and malformed bodies all surface
//! as [`Error::Embedding`]; nothing is retried.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use vaultdb_core::config::EmbeddingConfig;
use vaultdb_core::traits::Embedder;
use vaultdb_core::types::Embedding;
use vaultdb_core::{Error, Result};

#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    id: String,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!("embedding.base_url must be an http(s) URL, got '{}'", config.base_url)));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/embeddings", base),
            model: config.model.clone(),
            id: format!("ollama:{}", config.model),
        })
    }

    pub fn model(&self) -> &str { &self.model }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    fn failure(&self, reason: impl Into<String>) -> Error {
        Error::Embedding { model: self.model.clone(), reason: reason.into() }
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request to {} timed out", self.endpoint)
        } else if err.is_connect() {
            format!("could not connect to {} (is `ollama serve` running?)", self.endpoint)
        } else {
            err.to_string()
        }
    }
}

impl Embedder for OllamaEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn embed_text(&self, text: &str) -> Result<Embedding> {
        let request = EmbeddingRequest { model: &self.model, prompt: text };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| self.failure(self.describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(self.failure(format!("server returned {}: {}", status, body.trim())));
        }
        let parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| self.failure(format!("failed to parse embedding response: {}", e)))?;
        if parsed.embedding.is_empty() {
            return Err(self.failure("server returned an empty embedding"));
        }
        tracing::trace!(model = %self.model, dim = parsed.embedding.len(), "embedded text");
        Ok(parsed.embedding)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
