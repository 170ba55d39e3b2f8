//! Corpus cache: the addressable, immutable enumeration of indexed chunks.
//!
//! The cache is built once at engine construction by enumerating the vector
//! index, and assigns each chunk a stable integer id equal to its position
//! in enumeration order. That id is the only key used to correlate results
//! across the lexical and semantic retrieval channels, and its ordering
//! doubles as the deterministic tie-break (first appearance in the corpus).

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Maximum length, in grapheme clusters, of a source snippet.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// A chunk record as stored and enumerated by a vector index.
///
/// This is the ingestion-side shape: content plus provenance metadata,
/// without an id. Ids are assigned by [`CorpusCache`] at enumeration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// The chunk's text content.
    pub content: String,
    /// 1-based page number in the source document, when known.
    #[serde(default)]
    pub page: Option<u32>,
    /// Name of the file the chunk was extracted from.
    #[serde(default)]
    pub source_file: String,
}

impl ChunkRecord {
    /// Create a new chunk record.
    pub fn new<S: Into<String>>(content: S, page: Option<u32>, source_file: S) -> Self {
        Self {
            content: content.into(),
            page,
            source_file: source_file.into(),
        }
    }
}

/// An indexed chunk with its stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id: the chunk's position in corpus enumeration order.
    pub id: u64,
    /// The chunk's text content.
    pub content: String,
    /// 1-based page number in the source document, when known.
    pub page: Option<u32>,
    /// Name of the file the chunk was extracted from.
    pub source_file: String,
}

impl Chunk {
    /// Build a chunk from a record, binding it to a stable id.
    pub fn from_record(id: u64, record: ChunkRecord) -> Self {
        Self {
            id,
            content: record.content,
            page: record.page,
            source_file: record.source_file,
        }
    }

    /// A short excerpt of the content, at most `max_chars` grapheme clusters.
    ///
    /// Truncated excerpts end in `...`, counted inside the limit.
    pub fn snippet(&self, max_chars: usize) -> String {
        snippet_of(&self.content, max_chars)
    }
}

/// Truncate text to at most `max_chars` grapheme clusters, ellipsis included.
pub fn snippet_of(text: &str, max_chars: usize) -> String {
    let total = text.graphemes(true).count();
    if total <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.graphemes(true).take(keep).collect();
    out.push_str("...");
    out
}

/// The immutable in-memory enumeration of all indexed chunks.
///
/// Built once, read-only thereafter; concurrent readers need no locking.
#[derive(Debug, Clone, Default)]
pub struct CorpusCache {
    chunks: Vec<Chunk>,
}

impl CorpusCache {
    /// Build a cache from records in enumeration order, assigning ids 0..n.
    pub fn from_records(records: Vec<ChunkRecord>) -> Self {
        let chunks = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Chunk::from_record(i as u64, record))
            .collect();
        Self { chunks }
    }

    /// An empty cache, used when the vector index cannot be enumerated.
    pub fn empty() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Look up a chunk by its stable id.
    pub fn get(&self, id: u64) -> Option<&Chunk> {
        self.chunks.get(id as usize)
    }

    /// All chunks in id order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks in the corpus.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the corpus holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterate over chunks in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }
}
