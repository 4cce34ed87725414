//! vaultdb-ingest
//!
//! The batch pipeline: scan the vault, load every matching file, split into
//! overlapping chunks, embed every chunk, then append the records to the
//! LanceDB store. Each stage materializes its whole output before the next
//! one starts.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use vaultdb_core::config::IngestSettings;
use vaultdb_core::loader::DocumentLoader;
use vaultdb_core::scanner::scan_directory;
use vaultdb_core::splitter::RecursiveCharacterSplitter;
use vaultdb_core::traits::Embedder;
use vaultdb_core::Result;
use vaultdb_vector::VectorStoreWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    pub documents: usize,
    pub chunks: usize,
    pub records: usize,
    pub dimensions: usize,
}

/// How a run ended. The two early stops are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    PathNotFound(PathBuf),
    NoDocuments,
    Completed(IngestStats),
}

pub struct IngestPipeline {
    settings: IngestSettings,
    loader: DocumentLoader,
    splitter: RecursiveCharacterSplitter,
    embedder: Box<dyn Embedder>,
}

impl IngestPipeline {
    /// Validates loader and splitter settings up front so a bad config fails
    /// before any filesystem access.
    pub fn new(settings: &IngestSettings, embedder: Box<dyn Embedder>) -> Result<Self> {
        let loader = DocumentLoader::new(settings.loader.clone())?;
        let splitter = RecursiveCharacterSplitter::new(settings.splitter.clone())?;
        Ok(Self { settings: settings.clone(), loader, splitter, embedder })
    }

    pub fn settings(&self) -> &IngestSettings { &self.settings }

    pub fn run<W: Write>(&self, out: &mut W) -> Result<IngestOutcome> {
        let started = Instant::now();
        let vault = self.settings.vault_path.as_path();
        writeln!(out, "--- Starting Document Ingestion ---")?;

        if !vault.exists() {
            writeln!(out, "Error: Vault path does not exist: {}", vault.display())?;
            tracing::warn!(path = %vault.display(), "vault path missing, nothing to ingest");
            return Ok(IngestOutcome::PathNotFound(vault.to_path_buf()));
        }

        let ext = glob_extension(&self.settings.loader.glob).unwrap_or("md");
        let scan = scan_directory(vault, ext, true);
        tracing::info!(total = scan.total_files, matching = scan.matching_files, ext, "scanned vault");

        writeln!(out, "Loading documents from: {}", vault.display())?;
        let t = Instant::now();
        let documents = self.loader.load(vault)?;
        tracing::info!(documents = documents.len(), elapsed_ms = t.elapsed().as_millis() as u64, "load stage done");
        if documents.is_empty() {
            writeln!(out, "No documents matching '{}' found in the vault. Exiting.", self.settings.loader.glob)?;
            return Ok(IngestOutcome::NoDocuments);
        }
        writeln!(out, "Successfully loaded {} documents.", documents.len())?;

        writeln!(out, "Splitting documents into chunks...")?;
        let t = Instant::now();
        let chunks = self.splitter.split_documents(&documents);
        tracing::info!(chunks = chunks.len(), elapsed_ms = t.elapsed().as_millis() as u64, "split stage done");
        writeln!(out, "Split documents into {} chunks.", chunks.len())?;

        writeln!(out, "Embedding chunks with: {}", self.embedder.embedder_id())?;
        let t = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        tracing::info!(vectors = embeddings.len(), dimensions, elapsed_ms = t.elapsed().as_millis() as u64, "embed stage done");

        writeln!(out, "Creating and persisting vector store at: {}", self.settings.persist_dir.display())?;
        let t = Instant::now();
        let records = self.persist(&chunks, &embeddings)?;
        tracing::info!(records, elapsed_ms = t.elapsed().as_millis() as u64, "store stage done");

        writeln!(out, "--- Ingestion Complete ---")?;
        writeln!(out, "Vector store updated at '{}' (table '{}'). You can now query your vault.", self.settings.persist_dir.display(), self.settings.table)?;
        tracing::info!(total_ms = started.elapsed().as_millis() as u64, "ingestion finished");

        Ok(IngestOutcome::Completed(IngestStats { documents: documents.len(), chunks: chunks.len(), records, dimensions }))
    }

    fn persist(&self, chunks: &[vaultdb_core::types::Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let writer = VectorStoreWriter::open(&self.settings.persist_dir, &self.settings.table)
                .await?
                .with_batch_size(self.settings.store.batch_size)
                .with_progress(self.settings.loader.show_progress);
            writer.write(chunks, embeddings, self.embedder.embedder_id()).await
        })
    }
}

/// `"**/*.md"` -> `Some("md")`; patterns without a plain trailing extension
/// yield `None`.
fn glob_extension(glob: &str) -> Option<&str> {
    let name = Path::new(glob).file_name()?.to_str()?;
    let ext = name.strip_prefix("*.")?;
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}
