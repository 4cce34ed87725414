//! Domain types flowing through the ingestion pipeline.

use serde::{Deserialize, Serialize};

/// Provenance carried from a source file onto every chunk cut from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub source_path: String,
}

/// One parsed input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMeta,
}

impl Document {
    pub fn new(text: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: DocumentMeta { source_path: source_path.into() } }
    }
}

/// A bounded, possibly overlapping slice of a document's text.
///
/// - `chunk_index`: 0-based position within the parent document
/// - `start_offset`: character offset in the parent text where `text` begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: DocumentMeta,
    pub chunk_index: usize,
    pub start_offset: usize,
}

pub type Embedding = Vec<f32>;
