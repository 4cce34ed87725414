//! Glob-driven document loading.
//!
//! Candidates are the regular files under the root whose root-relative path
//! matches the configured glob. Each candidate is parsed as UTF-8 text into a
//! [`Document`]. A parse failure either aborts the load or is skipped with a
//! warning depending on `silent_errors`.

use globset::{GlobBuilder, GlobMatcher};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub glob: String,
    pub multithreading: bool,
    pub silent_errors: bool,
    pub show_progress: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { glob: "**/*.md".to_string(), multithreading: true, silent_errors: true, show_progress: false }
    }
}

pub struct DocumentLoader {
    config: LoaderConfig,
    matcher: GlobMatcher,
}

impl DocumentLoader {
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let matcher = GlobBuilder::new(&config.glob)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("invalid glob '{}': {}", config.glob, e)))?
            .compile_matcher();
        Ok(Self { config, matcher })
    }

    pub fn config(&self) -> &LoaderConfig { &self.config }

    /// Every regular file under `root` matching the glob, sorted.
    pub fn candidates(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => { tracing::warn!("skipping unreadable entry: {}", err); None }
            })
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let rel = e.path().strip_prefix(root).unwrap_or(e.path());
                self.matcher.is_match(rel)
            })
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// Parse every candidate under `root`. The order of the returned documents
    /// follows candidate order but callers should not rely on it.
    pub fn load(&self, root: &Path) -> Result<Vec<Document>> {
        let files = self.candidates(root);
        tracing::debug!(candidates = files.len(), glob = %self.config.glob, "loading documents");
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let pb = if self.config.show_progress { progress_bar(files.len() as u64) } else { ProgressBar::hidden() };
        let parse = |path: &PathBuf| {
            let parsed = parse_file(path);
            pb.inc(1);
            parsed
        };
        let results: Vec<Result<Document>> = if self.config.multithreading {
            files.par_iter().map(parse).collect()
        } else {
            files.iter().map(parse).collect()
        };
        pb.finish_and_clear();

        let mut documents = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(doc) => documents.push(doc),
                Err(err) if self.config.silent_errors => tracing::warn!("skipping document: {}", err),
                Err(err) => return Err(err),
            }
        }
        Ok(documents)
    }
}

fn parse_file(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| Error::Parse { path: path.to_path_buf(), reason: e.to_string() })?;
    let text = String::from_utf8(bytes).map_err(|e| Error::Parse { path: path.to_path_buf(), reason: e.to_string() })?;
    Ok(Document::new(text, path.to_string_lossy()))
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%)") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
