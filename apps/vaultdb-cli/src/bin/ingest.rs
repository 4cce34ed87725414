use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use vaultdb_core::config::Config;
use vaultdb_ingest::{IngestOutcome, IngestPipeline};

#[derive(Parser, Debug)]
#[command(name = "vaultdb-ingest", about = "Chunk, embed and store a vault of notes in a local LanceDB index")]
struct IngestCli {
    /// Root of the document tree (overrides vault_path / OBSIDIAN_VAULT_PATH)
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Directory holding the LanceDB index
    #[arg(long)]
    persist_dir: Option<PathBuf>,

    /// Ollama model used for embeddings
    #[arg(long)]
    model: Option<String>,

    /// Glob selecting files under the vault root
    #[arg(long)]
    glob: Option<String>,

    /// Maximum characters per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters repeated between consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Abort on the first file that cannot be read
    #[arg(long)]
    strict: bool,

    /// Load files one at a time
    #[arg(long)]
    sequential: bool,
}

/// Only the flags actually given end up in the figment.
#[derive(Serialize, Default)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    vault_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persist_dir: Option<PathBuf>,
    embedding: EmbeddingOverrides,
    loader: LoaderOverrides,
    splitter: SplitterOverrides,
}

#[derive(Serialize, Default)]
struct EmbeddingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

#[derive(Serialize, Default)]
struct LoaderOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    glob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    silent_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multithreading: Option<bool>,
}

#[derive(Serialize, Default)]
struct SplitterOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunk_overlap: Option<usize>,
}

impl From<IngestCli> for Overrides {
    fn from(cli: IngestCli) -> Self {
        Self {
            vault_path: cli.vault,
            persist_dir: cli.persist_dir,
            embedding: EmbeddingOverrides { model: cli.model },
            loader: LoaderOverrides {
                glob: cli.glob,
                silent_errors: cli.strict.then_some(false),
                multithreading: cli.sequential.then_some(false),
            },
            splitter: SplitterOverrides { chunk_size: cli.chunk_size, chunk_overlap: cli.chunk_overlap },
        }
    }
}

fn run() -> Result<()> {
    let cli = IngestCli::parse();
    let config = Config::load().context("loading configuration")?.merge(Overrides::from(cli));
    let settings = config.settings()?;
    tracing::info!(vault = %settings.vault_path.display(), persist_dir = %settings.persist_dir.display(), model = %settings.embedding.model, "starting ingestion");

    let embedder = vaultdb_embed::embedder_from_config(&settings.embedding)?;
    let pipeline = IngestPipeline::new(&settings, embedder)?;
    let mut stdout = std::io::stdout().lock();
    match pipeline.run(&mut stdout)? {
        IngestOutcome::Completed(stats) => tracing::info!(?stats, "done"),
        outcome => tracing::info!(?outcome, "stopped early"),
    }
    Ok(())
}

fn main() -> ExitCode {
    vaultdb_cli::init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(vaultdb_cli::exit_code(&err) as u8)
        }
    }
}
