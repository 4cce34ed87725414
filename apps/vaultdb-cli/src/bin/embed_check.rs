use anyhow::Result;
use clap::Parser;

use vaultdb_core::config::{Config, EmbeddingConfig};
use vaultdb_embed::{embedder_from_config, probe, PROBE_TEXT};

#[derive(Parser, Debug)]
#[command(name = "vaultdb-embed-check", about = "Embed one fixed sentence to verify the embedding service is reachable")]
struct CheckCli {
    /// Model to probe (defaults to embedding.model from config)
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long)]
    url: Option<String>,
}

fn embedding_config(cli: &CheckCli) -> EmbeddingConfig {
    let mut config = Config::load()
        .and_then(|c| c.get::<EmbeddingConfig>("embedding"))
        .unwrap_or_default();
    if let Some(model) = &cli.model { config.model = model.clone(); }
    if let Some(url) = &cli.url { config.base_url = url.clone(); }
    config
}

/// Always exits 0: failures are reported, not propagated.
fn main() -> Result<()> {
    vaultdb_cli::init_tracing();
    let cli = CheckCli::parse();
    let config = embedding_config(&cli);

    println!("--- Testing embedding model: {} ---", config.model);
    println!("Embedding test sentence: '{}'", PROBE_TEXT);
    let result = embedder_from_config(&config).and_then(|embedder| probe(embedder.as_ref()));
    match result {
        Ok(report) => {
            println!("\n✅ Success! Embedding created.");
            report.write_report(&mut std::io::stdout().lock())?;
        }
        Err(err) => {
            println!("\n❌ An error occurred: {err}");
            println!("\nTroubleshooting tips:");
            println!("1. Is the Ollama application running? ({})", config.base_url);
            println!("2. Did you pull the model? Run 'ollama pull {}'", config.model);
            println!("3. Is the model name correct? Check 'ollama list'.");
        }
    }
    println!("\n--- Test complete ---");
    Ok(())
}
