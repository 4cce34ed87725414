//! LanceDB persistence for embedded chunks.
//!
//! One table holds one row per chunk: identity, provenance, the chunk text,
//! the id of the embedder that produced the vector, and the vector itself.
//! Writes always append.

pub mod schema;
pub mod table;
pub mod writer;

pub use schema::{build_record_schema, VECTOR_COLUMN};
pub use table::{count_records, open_db, read_records, StoredRecord};
pub use writer::{VectorStoreWriter, DEFAULT_BATCH_SIZE};
