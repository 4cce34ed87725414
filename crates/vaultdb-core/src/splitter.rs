//! Recursive character text splitting with overlap.
//!
//! The splitter tries separators from coarsest to finest (paragraph, line,
//! word, character). Text is cut before every occurrence of the first
//! separator present, so each separator stays attached to the piece that
//! follows it. Pieces that are still too long are split again with the
//! remaining separators, and short pieces are greedily merged back into
//! windows of at most `chunk_size` characters. When a window is emitted its
//! tail of at most `chunk_overlap` characters seeds the next window.
//!
//! Pieces are byte spans of the input, so every chunk is a contiguous slice of
//! the source text (minus surrounding whitespace) and its offset is exact.
//! All lengths are counted in `char`s, not bytes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SplitterConfig {
    /// `chunk_overlap` must be strictly below `chunk_size`. Violations are
    /// reported, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("splitter.chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "splitter.chunk_overlap ({}) must be smaller than splitter.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    config: SplitterConfig,
}

impl RecursiveCharacterSplitter {
    pub fn new(config: SplitterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitterConfig { &self.config }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_spans(text).into_iter().map(|r| text[r].to_string()).collect()
    }

    /// Split every document and flatten the result, preserving document order.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for doc in documents {
            let (mut byte_pos, mut char_pos) = (0usize, 0usize);
            for (chunk_index, span) in self.split_spans(&doc.text).into_iter().enumerate() {
                char_pos += char_len(&doc.text[byte_pos..span.start]);
                byte_pos = span.start;
                chunks.push(Chunk {
                    text: doc.text[span].to_string(),
                    metadata: doc.metadata.clone(),
                    chunk_index,
                    start_offset: char_pos,
                });
            }
        }
        chunks
    }

    /// Trimmed byte ranges of the chunks of `text`, in order.
    fn split_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        if char_len(text) <= self.config.chunk_size {
            push_trimmed(text, 0..text.len(), &mut out);
        } else {
            self.split_recursive(text, 0..text.len(), &self.config.separators, &mut out);
        }
        out
    }

    fn split_recursive(&self, text: &str, range: Range<usize>, separators: &[String], out: &mut Vec<Range<usize>>) {
        let (separator, rest) = pick_separator(&text[range.clone()], separators);
        let mut pending: Vec<Range<usize>> = Vec::new();
        for piece in pieces(text, range, separator) {
            if char_len(&text[piece.clone()]) < self.config.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                self.merge(text, &pending, out);
                pending.clear();
            }
            if rest.is_empty() {
                push_trimmed(text, piece, out);
            } else {
                self.split_recursive(text, piece, rest, out);
            }
        }
        if !pending.is_empty() {
            self.merge(text, &pending, out);
        }
    }

    /// Greedily pack adjacent pieces into windows, carrying an overlap tail
    /// between them.
    fn merge(&self, text: &str, pieces: &[Range<usize>], out: &mut Vec<Range<usize>>) {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
        let mut total = 0usize;
        for piece in pieces {
            let len = char_len(&text[piece.clone()]);
            if total + len > size && !window.is_empty() {
                push_window(text, &window, out);
                while total > overlap || (total > 0 && total + len > size) {
                    let Some((_, front_len)) = window.pop_front() else { break };
                    total -= front_len;
                }
            }
            total += len;
            window.push_back((piece.clone(), len));
        }
        push_window(text, &window, out);
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return ("", &[]);
        }
        if text.contains(sep.as_str()) {
            return (sep.as_str(), &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Cut `range` before every occurrence of `separator`; an empty separator
/// cuts between characters. The pieces cover `range` exactly.
fn pieces(text: &str, range: Range<usize>, separator: &str) -> Vec<Range<usize>> {
    let base = range.start;
    let slice = &text[range];
    if separator.is_empty() {
        return slice.char_indices().map(|(i, c)| base + i..base + i + c.len_utf8()).collect();
    }
    let mut starts = vec![0];
    starts.extend(slice.match_indices(separator).map(|(i, _)| i).filter(|&i| i > 0));
    starts.push(slice.len());
    starts.windows(2).map(|w| base + w[0]..base + w[1]).collect()
}

fn push_window(text: &str, window: &VecDeque<(Range<usize>, usize)>, out: &mut Vec<Range<usize>>) {
    if let (Some((first, _)), Some((last, _))) = (window.front(), window.back()) {
        push_trimmed(text, first.start..last.end, out);
    }
}

fn push_trimmed(text: &str, range: Range<usize>, out: &mut Vec<Range<usize>>) {
    let s = &text[range.clone()];
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = s.len() - s.trim_start().len();
    out.push(range.start + lead..range.start + lead + trimmed.len());
}

fn char_len(s: &str) -> usize { s.chars().count() }
