//! vaultdb-embed
//!
//! Embedding backends for the ingestion pipeline: an Ollama HTTP client for
//! real runs and a hash-based fake for tests and offline development, plus a
//! single-sentence connectivity probe.

pub mod fake;
pub mod ollama;
pub mod probe;

pub use fake::{FakeEmbedder, FAKE_EMBEDDING_DIM};
pub use ollama::OllamaEmbedder;
pub use probe::{probe, ProbeReport, PROBE_TEXT};

use vaultdb_core::config::EmbeddingConfig;
use vaultdb_core::traits::Embedder;
use vaultdb_core::Result;

/// `APP_USE_FAKE_EMBEDDINGS=1` (or `true`) swaps in the [`FakeEmbedder`].
pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() {
        tracing::info!("🧪 Using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::default()));
    }
    tracing::info!(model = %config.model, url = %config.base_url, "using Ollama embeddings");
    Ok(Box::new(OllamaEmbedder::new(config)?))
}
