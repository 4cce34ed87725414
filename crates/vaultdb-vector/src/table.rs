//! LanceDB connection and housekeeping helpers.
//!
//! Opening creates the persistence directory if needed; table lookups treat a
//! missing table as "nothing written yet" rather than an error.

use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use lancedb::{connect, Connection, Table};
use std::fmt::Display;
use std::path::Path;

use vaultdb_core::{Error, Result};

use crate::schema::vector_dim;

pub(crate) fn store_err<E: Display>(e: E) -> Error {
    Error::Store(e.to_string())
}

/// Connect to the LanceDB directory at `path`, creating the directory first.
pub async fn open_db(path: &Path) -> Result<Connection> {
    std::fs::create_dir_all(path)?;
    connect(path.to_string_lossy().as_ref()).execute().await.map_err(store_err)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(store_err)?;
    Ok(names.iter().any(|n| n == name))
}

pub async fn open_table(conn: &Connection, name: &str) -> Result<Option<Table>> {
    if !table_exists(conn, name).await? {
        return Ok(None);
    }
    conn.open_table(name).execute().await.map(Some).map_err(store_err)
}

/// Vector width of an existing table, `None` when the table is absent.
pub async fn table_vector_dim(conn: &Connection, name: &str) -> Result<Option<usize>> {
    let Some(table) = open_table(conn, name).await? else { return Ok(None) };
    let schema = table.schema().await.map_err(store_err)?;
    vector_dim(&schema)
        .map(Some)
        .ok_or_else(|| Error::Store(format!("table '{}' has no fixed-size '{}' column", name, crate::schema::VECTOR_COLUMN)))
}

/// Row count of `name` under `path`; 0 when the table does not exist yet.
pub async fn count_records(path: &Path, name: &str) -> Result<usize> {
    let conn = open_db(path).await?;
    match open_table(&conn, name).await? {
        Some(table) => table.count_rows(None).await.map_err(store_err),
        None => Ok(0),
    }
}

/// One row read back from the chunks table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub source_path: String,
    pub chunk_index: usize,
    pub start_offset: usize,
    pub text: String,
    pub embedder_id: String,
    pub vector: Vec<f32>,
}

/// Read every row of `name`, ordered by `(source_path, chunk_index)`.
pub async fn read_records(path: &Path, name: &str) -> Result<Vec<StoredRecord>> {
    let conn = open_db(path).await?;
    let Some(table) = open_table(&conn, name).await? else { return Ok(Vec::new()) };
    let mut stream = table.query().execute().await.map_err(store_err)?;
    let mut out = Vec::new();
    while let Some(batch) = stream.try_next().await.map_err(store_err)? {
        decode_batch(&batch, &mut out)?;
    }
    out.sort_by(|a, b| a.source_path.cmp(&b.source_path).then(a.chunk_index.cmp(&b.chunk_index)));
    Ok(out)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::Store(format!("column '{}' missing or of unexpected type", name)))
}

fn decode_batch(batch: &RecordBatch, out: &mut Vec<StoredRecord>) -> Result<()> {
    let ids = column::<StringArray>(batch, "id")?;
    let sources = column::<StringArray>(batch, "source_path")?;
    let indices = column::<Int32Array>(batch, "chunk_index")?;
    let offsets = column::<Int32Array>(batch, "start_offset")?;
    let texts = column::<StringArray>(batch, "text")?;
    let embedders = column::<StringArray>(batch, "embedder_id")?;
    let vectors = column::<FixedSizeListArray>(batch, crate::schema::VECTOR_COLUMN)?;
    for i in 0..batch.num_rows() {
        let vector = if vectors.is_valid(i) {
            let values = vectors.value(i);
            values
                .as_any()
                .downcast_ref::<Float32Array>()
                .map(|a| a.values().to_vec())
                .ok_or_else(|| Error::Store("vector items are not Float32".to_string()))?
        } else {
            Vec::new()
        };
        out.push(StoredRecord {
            id: ids.value(i).to_string(),
            source_path: sources.value(i).to_string(),
            chunk_index: usize::try_from(indices.value(i)).unwrap_or_default(),
            start_offset: usize::try_from(offsets.value(i)).unwrap_or_default(),
            text: texts.value(i).to_string(),
            embedder_id: embedders.value(i).to_string(),
            vector,
        });
    }
    Ok(())
}
