use vaultdb_core::config::EmbeddingConfig;
use vaultdb_embed::{embedder_from_config, probe};

fn main() -> anyhow::Result<()> {
    let config = EmbeddingConfig { model: std::env::args().nth(1).unwrap_or_else(|| EmbeddingConfig::default().model), ..EmbeddingConfig::default() };
    let embedder = embedder_from_config(&config)?;
    let report = probe(embedder.as_ref())?;
    println!("id={} dim={}", report.embedder_id, report.dimensions);
    Ok(())
}
