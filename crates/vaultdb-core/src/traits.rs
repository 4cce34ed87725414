use crate::error::{Error, Result};
use crate::types::Embedding;

pub trait Embedder: Send + Sync {
    /// Stable identifier of the backing model, stored next to every vector.
    fn embedder_id(&self) -> &str;

    /// One service call, one vector.
    fn embed_text(&self, text: &str) -> Result<Embedding>;

    /// Embeds each text in order with one `embed_text` call per text.
    /// Fails on the first error and on vectors of differing length.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out: Vec<Embedding> = Vec::with_capacity(texts.len());
        for text in texts {
            let v = self.embed_text(text)?;
            if let Some(first) = out.first() {
                if first.len() != v.len() {
                    return Err(Error::DimensionMismatch { expected: first.len(), actual: v.len() });
                }
            }
            out.push(v);
        }
        Ok(out)
    }
}
