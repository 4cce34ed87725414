use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use vaultdb_core::types::{Chunk, Embedding};
use vaultdb_core::{Error, Result};

use crate::schema::build_record_schema;
use crate::table::{open_db, open_table, store_err, table_vector_dim};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Appends `(chunk, vector)` records to one LanceDB table.
///
/// Every call appends; nothing is deduplicated or upserted. Batches are
/// committed one by one, so a failure part-way leaves the earlier batches in
/// place.
pub struct VectorStoreWriter {
	db: Connection,
	path: PathBuf,
	table_name: String,
	batch_size: usize,
	show_progress: bool,
}

impl VectorStoreWriter {
	pub async fn open(persist_dir: &Path, table_name: &str) -> Result<Self> {
		let db = open_db(persist_dir).await?;
		Ok(Self { db, path: persist_dir.to_path_buf(), table_name: table_name.to_string(), batch_size: DEFAULT_BATCH_SIZE, show_progress: false })
	}

	pub fn with_batch_size(mut self, batch_size: usize) -> Self { self.batch_size = batch_size.max(1); self }

	pub fn with_progress(mut self, show_progress: bool) -> Self { self.show_progress = show_progress; self }

	pub fn path(&self) -> &Path { &self.path }

	pub fn table_name(&self) -> &str { &self.table_name }

	/// Write one record per chunk; returns the number of records appended.
	pub async fn write(&self, chunks: &[Chunk], embeddings: &[Embedding], embedder_id: &str) -> Result<usize> {
		if chunks.len() != embeddings.len() {
			return Err(Error::Store(format!("{} chunks but {} embeddings", chunks.len(), embeddings.len())));
		}
		let Some(first) = embeddings.first() else {
			tracing::info!("No chunks to write");
			return Ok(0);
		};
		let dim = first.len();
		if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
			return Err(Error::DimensionMismatch { expected: dim, actual: bad.len() });
		}
		if let Some(existing) = table_vector_dim(&self.db, &self.table_name).await? {
			if existing != dim {
				return Err(Error::DimensionMismatch { expected: existing, actual: dim });
			}
		}
		let dim_i32 = i32::try_from(dim).map_err(|_| Error::Store(format!("vector width {} does not fit the schema", dim)))?;

		tracing::info!(records = chunks.len(), table = %self.table_name, dim, "writing records to LanceDB");
		let pb = if self.show_progress { progress_bar(chunks.len() as u64) } else { ProgressBar::hidden() };
		let mut written = 0usize;
		for (batch_chunks, batch_embs) in chunks.chunks(self.batch_size).zip(embeddings.chunks(self.batch_size)) {
			let batch = to_record_batch(batch_chunks, batch_embs, embedder_id, dim_i32)?;
			self.insert_batch(batch).await?;
			written += batch_chunks.len();
			pb.set_position(written as u64);
		}
		pb.finish_and_clear();
		tracing::debug!(written, "LanceDB write complete");
		Ok(written)
	}

	async fn insert_batch(&self, batch: RecordBatch) -> Result<()> {
		let schema = batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
		match open_table(&self.db, &self.table_name).await? {
			Some(table) => {
				table.add(reader).execute().await.map_err(store_err)?;
			}
			None => {
				self.db.create_table(&self.table_name, reader).execute().await.map_err(store_err)?;
			}
		}
		Ok(())
	}
}

fn to_record_batch(chunks: &[Chunk], embeddings: &[Embedding], embedder_id: &str, dim: i32) -> Result<RecordBatch> {
	let now = Utc::now().timestamp_millis();
	let mut ids = Vec::with_capacity(chunks.len());
	let mut sources = Vec::with_capacity(chunks.len());
	let mut indices = Vec::with_capacity(chunks.len());
	let mut offsets = Vec::with_capacity(chunks.len());
	let mut texts = Vec::with_capacity(chunks.len());
	let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());
	let width = usize::try_from(dim).unwrap_or_default();
	for (chunk, embedding) in chunks.iter().zip(embeddings) {
		if embedding.len() != width {
			return Err(Error::DimensionMismatch { expected: width, actual: embedding.len() });
		}
		ids.push(Uuid::new_v4().to_string());
		sources.push(chunk.metadata.source_path.clone());
		indices.push(to_i32(chunk.chunk_index)?);
		offsets.push(to_i32(chunk.start_offset)?);
		texts.push(chunk.text.clone());
		vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
	}
	let n = chunks.len();
	RecordBatch::try_new(
		build_record_schema(dim),
		vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(sources)),
			Arc::new(Int32Array::from(indices)),
			Arc::new(Int32Array::from(offsets)),
			Arc::new(StringArray::from(texts)),
			Arc::new(StringArray::from(vec![embedder_id.to_string(); n])),
			Arc::new(TimestampMillisecondArray::from(vec![now; n])),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
		],
	)
	.map_err(store_err)
}

fn to_i32(v: usize) -> Result<i32> {
	i32::try_from(v).map_err(|_| Error::Store(format!("value {} overflows an Int32 column", v)))
}

fn progress_bar(len: u64) -> ProgressBar {
	let pb = ProgressBar::new(len);
	if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%)") {
		pb.set_style(style.progress_chars("#>-"));
	}
	pb
}
