//! Connectivity smoke test: embed one fixed sentence and describe the vector.

use std::io::{self, Write};

use vaultdb_core::traits::Embedder;
use vaultdb_core::Result;

pub const PROBE_TEXT: &str = "The silver dragon sleeps on a hoard of gold.";

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub embedder_id: String,
    pub dimensions: usize,
    pub all_finite: bool,
    pub head: Vec<f32>,
    pub tail: Vec<f32>,
}

pub fn probe(embedder: &dyn Embedder) -> Result<ProbeReport> {
    let v = embedder.embed_text(PROBE_TEXT)?;
    let n = v.len().min(5);
    Ok(ProbeReport {
        embedder_id: embedder.embedder_id().to_string(),
        dimensions: v.len(),
        all_finite: v.iter().all(|x| x.is_finite()),
        head: v[..n].to_vec(),
        tail: v[v.len() - n..].to_vec(),
    })
}

impl ProbeReport {
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Embedder: {}", self.embedder_id)?;
        writeln!(out, "  - Element type: f32")?;
        writeln!(out, "  - All values finite: {}", if self.all_finite { "Yes" } else { "No" })?;
        writeln!(out, "  - Number of dimensions (vector length): {}", self.dimensions)?;
        writeln!(out, "  - First 5 dimensions: {}", rounded(&self.head))?;
        writeln!(out, "  - Last 5 dimensions: {}", rounded(&self.tail))?;
        Ok(())
    }
}

fn rounded(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|x| format!("{:.3}", x)).collect();
    format!("[{}]", parts.join(", "))
}
