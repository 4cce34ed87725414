use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::tempdir;
use vaultdb_core::config::IngestSettings;
use vaultdb_core::traits::Embedder;
use vaultdb_core::types::Embedding;
use vaultdb_core::{Error, Result};
use vaultdb_embed::FakeEmbedder;
use vaultdb_ingest::{IngestOutcome, IngestPipeline, IngestStats};

/// Counts service calls; delegates to the fake.
struct CountingEmbedder {
    inner: FakeEmbedder,
    calls: Arc<AtomicUsize>,
}

impl Embedder for CountingEmbedder {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_text(text)
    }
}

/// Fails on the n-th call, like a service that drops mid-run.
struct FlakyEmbedder {
    fail_at: usize,
    calls: AtomicUsize,
}

impl Embedder for FlakyEmbedder {
    fn embedder_id(&self) -> &str { "flaky" }
    fn embed_text(&self, _text: &str) -> Result<Embedding> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.fail_at {
            return Err(Error::Embedding { model: "flaky".into(), reason: "could not connect to http://localhost:11434".into() });
        }
        Ok(vec![0.0; 8])
    }
}

fn counting(dim: usize) -> (Box<dyn Embedder>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (Box::new(CountingEmbedder { inner: FakeEmbedder::new(dim), calls: calls.clone() }), calls)
}

fn settings(vault: &Path, persist: &Path) -> IngestSettings {
    let mut s = IngestSettings::with_vault(vault);
    s.persist_dir = persist.to_path_buf();
    s
}

fn count(persist: &Path, table: &str) -> usize {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(vaultdb_vector::count_records(persist, table)).unwrap()
}

/// 499 four-char words plus one five-char word, single spaces: 2500 chars.
fn words_2500() -> String {
    let mut words: Vec<String> = (0..499).map(|i| format!("w{:03}", i)).collect();
    words.push("w499.".to_string());
    words.join(" ")
}

#[test]
fn one_markdown_file_becomes_one_record() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    fs::write(vault.path().join("a.md"), "x".repeat(600)).unwrap();
    fs::write(vault.path().join("b.txt"), "not markdown").unwrap();

    let (embedder, calls) = counting(16);
    let pipeline = IngestPipeline::new(&settings(vault.path(), store.path()), embedder).unwrap();
    let mut out = Vec::new();
    let outcome = pipeline.run(&mut out).unwrap();

    assert_eq!(outcome, IngestOutcome::Completed(IngestStats { documents: 1, chunks: 1, records: 1, dimensions: 16 }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(count(store.path(), "documents"), 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Successfully loaded 1 documents."));
    assert!(text.contains("--- Ingestion Complete ---"));
}

#[test]
fn long_document_is_split_and_stored_per_chunk() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    fs::create_dir_all(vault.path().join("notes/deep")).unwrap();
    fs::write(vault.path().join("notes/deep/long.md"), words_2500()).unwrap();

    let pipeline = IngestPipeline::new(&settings(vault.path(), store.path()), Box::new(FakeEmbedder::new(32))).unwrap();
    let outcome = pipeline.run(&mut std::io::sink()).unwrap();
    let IngestOutcome::Completed(stats) = outcome else { panic!("expected completion, got {outcome:?}") };
    assert_eq!(stats.chunks, 3);
    assert_eq!(stats.records, 3);

    let rt = tokio::runtime::Runtime::new().unwrap();
    let recs = rt.block_on(vaultdb_vector::read_records(store.path(), "documents")).unwrap();
    assert_eq!(recs.iter().map(|r| r.chunk_index).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(recs.iter().all(|r| r.text.chars().count() <= 1000 && r.vector.len() == 32));
    assert!(recs.iter().all(|r| r.source_path.ends_with("long.md") && r.embedder_id == "fake:d32"));
}

#[test]
fn empty_vault_stops_before_embedding() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    let persist = store.path().join("index");

    let (embedder, calls) = counting(8);
    let pipeline = IngestPipeline::new(&settings(vault.path(), &persist), embedder).unwrap();
    let mut out = Vec::new();
    assert_eq!(pipeline.run(&mut out).unwrap(), IngestOutcome::NoDocuments);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!persist.exists(), "store must not be opened");
    assert!(String::from_utf8(out).unwrap().contains("Exiting."));
}

#[test]
fn missing_vault_stops_immediately() {
    let store = tempdir().unwrap();
    let persist = store.path().join("index");
    let missing = store.path().join("no-such-vault");

    let (embedder, calls) = counting(8);
    let pipeline = IngestPipeline::new(&settings(&missing, &persist), embedder).unwrap();
    let mut out = Vec::new();
    assert_eq!(pipeline.run(&mut out).unwrap(), IngestOutcome::PathNotFound(missing.clone()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!persist.exists());
    assert!(String::from_utf8(out).unwrap().contains("Vault path does not exist"));
}

#[test]
fn embedding_failure_writes_nothing() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    let persist = store.path().join("index");
    for i in 0..3 {
        fs::write(vault.path().join(format!("n{i}.md")), format!("note {i}")).unwrap();
    }

    let embedder = Box::new(FlakyEmbedder { fail_at: 3, calls: AtomicUsize::new(0) });
    let pipeline = IngestPipeline::new(&settings(vault.path(), &persist), embedder).unwrap();
    let err = pipeline.run(&mut std::io::sink()).unwrap_err();
    assert!(matches!(err, Error::Embedding { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!persist.exists(), "no partial persistence");
}

#[test]
fn strict_loading_aborts_on_unreadable_file() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    fs::write(vault.path().join("good.md"), "fine").unwrap();
    fs::write(vault.path().join("bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let mut s = settings(vault.path(), store.path());
    s.loader.silent_errors = false;
    let (embedder, calls) = counting(8);
    let err = IngestPipeline::new(&s, embedder).unwrap().run(&mut std::io::sink()).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    s.loader.silent_errors = true;
    let outcome = IngestPipeline::new(&s, Box::new(FakeEmbedder::new(8))).unwrap().run(&mut std::io::sink()).unwrap();
    assert!(matches!(outcome, IngestOutcome::Completed(IngestStats { documents: 1, .. })));
}

#[test]
fn rerun_appends_duplicates() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    fs::write(vault.path().join("a.md"), "alpha").unwrap();
    let s = settings(vault.path(), store.path());
    for _ in 0..2 {
        IngestPipeline::new(&s, Box::new(FakeEmbedder::new(8))).unwrap().run(&mut std::io::sink()).unwrap();
    }
    assert_eq!(count(store.path(), "documents"), 2);
}

#[test]
fn switching_to_a_wider_model_is_rejected() {
    let vault = tempdir().unwrap();
    let store = tempdir().unwrap();
    fs::write(vault.path().join("a.md"), "alpha").unwrap();
    let s = settings(vault.path(), store.path());

    IngestPipeline::new(&s, Box::new(FakeEmbedder::new(8))).unwrap().run(&mut std::io::sink()).unwrap();
    let err = IngestPipeline::new(&s, Box::new(FakeEmbedder::new(16))).unwrap().run(&mut std::io::sink()).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 8, actual: 16 }));
    assert_eq!(count(store.path(), "documents"), 1);
}

#[test]
fn overlap_not_below_chunk_size_is_a_config_error() {
    let vault = tempdir().unwrap();
    let mut s = IngestSettings::with_vault(vault.path());
    s.splitter.chunk_size = 100;
    s.splitter.chunk_overlap = 100;
    let err = IngestPipeline::new(&s, Box::new(FakeEmbedder::new(8))).err().expect("invalid config");
    assert!(matches!(err, Error::InvalidConfig(_)));
}
