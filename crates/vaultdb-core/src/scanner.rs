//! Directory scan and human-readable inventory.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub root: PathBuf,
    pub extension: String,
    pub matching_only: bool,
    pub total_files: usize,
    pub matching_files: usize,
    /// All files, or only the matching ones when `matching_only` is set. Sorted.
    pub files: Vec<PathBuf>,
}

/// Walk `root` recursively and classify regular files by `extension`
/// (case-insensitive, no leading dot). The caller checks that `root` exists.
pub fn scan_directory(root: &Path, extension: &str, matching_only: bool) -> ScanReport {
    let extension = extension.trim_start_matches('.').to_string();
    let mut total_files = 0usize;
    let mut matching_files = 0usize;
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| match e {
        Ok(entry) => Some(entry),
        Err(err) => { tracing::warn!("scan: skipping unreadable entry: {}", err); None }
    }) {
        if !entry.file_type().is_file() { continue; }
        total_files += 1;
        let matches = has_extension(entry.path(), &extension);
        if matches { matching_files += 1; }
        if matches || !matching_only { files.push(entry.into_path()); }
    }
    files.sort();
    ScanReport { root: root.to_path_buf(), extension, matching_only, total_files, matching_files, files }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

impl ScanReport {
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mode = if self.matching_only { format!("only .{} files", self.extension) } else { "all files".to_string() };
        writeln!(out, "📁 Scanning: {}", self.root.display())?;
        writeln!(out, "Mode: {}", mode)?;
        writeln!(out, "{}", "-".repeat(60))?;
        for path in &self.files {
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            writeln!(out, "  {}", rel.display())?;
        }
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Total files: {}", self.total_files)?;
        writeln!(out, ".{} files: {}", self.extension, self.matching_files)?;
        Ok(())
    }
}
