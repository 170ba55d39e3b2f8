//! Vector index trait, flat implementation, and persisted artifact.
//!
//! The engine consumes a [`VectorIndex`] built elsewhere: ingestion embeds
//! chunk records, stores them in a [`FlatVectorIndex`], and persists the
//! whole thing (index plus the trained embedder) as a single-file
//! [`IndexArtifact`]. Loading the artifact restores the exact embedding
//! function used at ingestion, which is what keeps query-time vectors
//! comparable with stored ones.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::corpus::ChunkRecord;
use crate::embedding::{Embedder, EmbeddingConfig, TfIdfEmbedder};
use crate::error::{KontosError, Result};
use crate::vector::distance::DistanceMetric;
use crate::vector::types::Vector;

/// Magic bytes identifying a kontos index artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"KNTS";

/// Current artifact format version.
const ARTIFACT_VERSION: u32 = 1;

/// A nearest-neighbor hit returned by a vector index.
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// Position of the entry in the index's stable enumeration order.
    pub ordinal: u64,
    /// The stored chunk record.
    pub record: ChunkRecord,
    /// Raw distance from the query vector (metric-dependent, >= 0).
    pub distance: f32,
}

/// Nearest-neighbor search over chunk embeddings.
///
/// Entry ordinals are stable for the index's lifetime: hits from
/// `search_by_vector` refer to positions in the order `enumerate` yields,
/// which is also the order the corpus cache assigns chunk ids in. Hits carry
/// their record so callers can resolve content even when enumeration was
/// refused and no corpus cache exists.
pub trait VectorIndex: Send + Sync {
    /// Number of entries in the index.
    fn len(&self) -> usize;

    /// Whether the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension of stored entries.
    fn dimension(&self) -> usize;

    /// Enumerate all entries in stable ordinal order.
    ///
    /// Indexes that cannot serve unrestricted enumeration return an error;
    /// the engine then disables the lexical channel and runs semantic-only.
    fn enumerate(&self) -> Result<Vec<ChunkRecord>>;

    /// Return the `k` nearest entries to `query`, ascending by distance.
    fn search_by_vector(&self, query: &[f32], k: usize) -> Result<Vec<VectorHit>>;
}

/// A brute-force vector index scanning every stored embedding.
///
/// Documentation corpora are a few thousand chunks at most; a flat scan with
/// a parallel distance batch stays well under a millisecond at that scale
/// and has none of the recall loss of approximate structures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatVectorIndex {
    metric: DistanceMetric,
    dimension: usize,
    records: Vec<ChunkRecord>,
    embeddings: Vec<Vector>,
}

impl FlatVectorIndex {
    /// Create an empty index for the given metric and dimension.
    pub fn new(metric: DistanceMetric, dimension: usize) -> Self {
        Self {
            metric,
            dimension,
            records: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    /// Append a record and its embedding, assigning it the next ordinal.
    pub fn add(&mut self, record: ChunkRecord, embedding: Vector) -> Result<()> {
        if embedding.dimension() != self.dimension {
            return Err(KontosError::index(format!(
                "embedding dimension {} does not match index dimension {}",
                embedding.dimension(),
                self.dimension
            )));
        }
        if !embedding.is_valid() {
            return Err(KontosError::index(
                "embedding contains non-finite components",
            ));
        }
        self.records.push(record);
        self.embeddings.push(embedding);
        Ok(())
    }

    /// The distance metric this index scores with.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl VectorIndex for FlatVectorIndex {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn enumerate(&self) -> Result<Vec<ChunkRecord>> {
        Ok(self.records.clone())
    }

    fn search_by_vector(&self, query: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        if query.len() != self.dimension {
            return Err(KontosError::invalid_argument(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }
        if k == 0 || self.records.is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<&[f32]> = self.embeddings.iter().map(|v| v.as_slice()).collect();
        let distances = self.metric.batch_distance_parallel(query, &stored)?;

        let mut scored: Vec<(usize, f32)> = distances.into_iter().enumerate().collect();
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(ordinal, distance)| VectorHit {
                ordinal: ordinal as u64,
                record: self.records[ordinal].clone(),
                distance,
            })
            .collect())
    }
}

/// Metadata describing a persisted index artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Artifact format version the file was written with.
    pub format_version: u32,
    /// Build timestamp.
    pub created_at: DateTime<Utc>,
    /// Distance metric the index scores with.
    pub distance_metric: DistanceMetric,
    /// Embedding dimension.
    pub dimension: usize,
    /// Number of indexed chunks.
    pub chunk_count: usize,
}

/// A vector index bundled with the embedder that produced it.
///
/// File layout: magic `KNTS`, format version (u32 LE), payload length
/// (u64 LE), bincode payload, CRC32 of the payload (u32 LE).
#[derive(Debug, Clone)]
pub struct IndexArtifact {
    /// Build-time metadata.
    pub metadata: ArtifactMetadata,
    /// The trained ingestion-time embedder.
    pub embedder: TfIdfEmbedder,
    /// The indexed entries and embeddings.
    pub index: FlatVectorIndex,
}

#[derive(Serialize)]
struct ArtifactPayloadRef<'a> {
    metadata: &'a ArtifactMetadata,
    embedder: &'a TfIdfEmbedder,
    index: &'a FlatVectorIndex,
}

#[derive(Deserialize)]
struct ArtifactPayload {
    metadata: ArtifactMetadata,
    embedder: TfIdfEmbedder,
    index: FlatVectorIndex,
}

impl IndexArtifact {
    /// Build an artifact from prepared chunk records.
    ///
    /// Trains a TF-IDF embedder over the record contents, embeds every
    /// record, and assembles a flat index in record order.
    pub fn build(
        records: Vec<ChunkRecord>,
        embedding_config: EmbeddingConfig,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        let mut embedder = TfIdfEmbedder::new(embedding_config);
        embedder.train(&contents);

        let mut index = FlatVectorIndex::new(metric, embedder.dimension());
        for record in records {
            let embedding = embedder.encode(&record.content)?;
            index.add(record, embedding)?;
        }

        let metadata = ArtifactMetadata {
            format_version: ARTIFACT_VERSION,
            created_at: Utc::now(),
            distance_metric: metric,
            dimension: embedder.dimension(),
            chunk_count: index.len(),
        };

        Ok(Self {
            metadata,
            embedder,
            index,
        })
    }

    /// Write the artifact to a file, replacing any existing one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let payload = ArtifactPayloadRef {
            metadata: &self.metadata,
            embedder: &self.embedder,
            index: &self.index,
        };
        let encoded = bincode::serialize(&payload)
            .map_err(|e| KontosError::index(format!("artifact encode failed: {e}")))?;
        let checksum = crc32fast::hash(&encoded);

        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&ARTIFACT_MAGIC)?;
        writer.write_u32::<LittleEndian>(ARTIFACT_VERSION)?;
        writer.write_u64::<LittleEndian>(encoded.len() as u64)?;
        writer.write_all(&encoded)?;
        writer.write_u32::<LittleEndian>(checksum)?;
        writer.flush()?;
        Ok(())
    }

    /// Load an artifact from a file.
    ///
    /// A missing or unopenable file is `IndexUnavailable` (fatal at engine
    /// construction); a present but malformed file is an index error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            KontosError::index_unavailable(format!(
                "index artifact not readable at {}: {e}",
                path.display()
            ))
        })?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| KontosError::index(format!("artifact header truncated: {e}")))?;
        if magic != ARTIFACT_MAGIC {
            return Err(KontosError::index(format!(
                "not a kontos index artifact: {}",
                path.display()
            )));
        }

        let version = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| KontosError::index(format!("artifact header truncated: {e}")))?;
        if version != ARTIFACT_VERSION {
            return Err(KontosError::index(format!(
                "unsupported artifact format version {version} (expected {ARTIFACT_VERSION})"
            )));
        }

        let payload_len = reader
            .read_u64::<LittleEndian>()
            .map_err(|e| KontosError::index(format!("artifact header truncated: {e}")))?;
        let mut encoded = vec![0u8; payload_len as usize];
        reader
            .read_exact(&mut encoded)
            .map_err(|e| KontosError::index(format!("artifact payload truncated: {e}")))?;

        let stored_checksum = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| KontosError::index(format!("artifact checksum missing: {e}")))?;
        let checksum = crc32fast::hash(&encoded);
        if checksum != stored_checksum {
            return Err(KontosError::index(format!(
                "artifact checksum mismatch: stored {stored_checksum:#010x}, computed {checksum:#010x}"
            )));
        }

        let payload: ArtifactPayload = bincode::deserialize(&encoded)
            .map_err(|e| KontosError::index(format!("artifact decode failed: {e}")))?;

        if payload.index.len() != payload.metadata.chunk_count {
            return Err(KontosError::index(format!(
                "artifact metadata inconsistent: {} chunks stored, {} declared",
                payload.index.len(),
                payload.metadata.chunk_count
            )));
        }

        Ok(Self {
            metadata: payload.metadata,
            embedder: payload.embedder,
            index: payload.index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<ChunkRecord> {
        vec![
            ChunkRecord::new("Operating temperature: -10C to 60C", Some(5), "manual.pdf"),
            ChunkRecord::new("Input voltage range is 100-240V AC", Some(6), "manual.pdf"),
            ChunkRecord::new(
                "Clean the dust filter every three months",
                Some(12),
                "manual.pdf",
            ),
        ]
    }

    fn sample_artifact() -> IndexArtifact {
        IndexArtifact::build(
            sample_records(),
            EmbeddingConfig::default(),
            DistanceMetric::Cosine,
        )
        .unwrap()
    }

    #[test]
    fn test_add_rejects_dimension_mismatch() {
        let mut index = FlatVectorIndex::new(DistanceMetric::Cosine, 4);
        let record = ChunkRecord::new("text", None, "a.pdf");
        assert!(index.add(record, Vector::new(vec![1.0, 0.0])).is_err());
    }

    #[test]
    fn test_enumerate_preserves_insertion_order() {
        let artifact = sample_artifact();
        let records = artifact.index.enumerate().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].page, Some(5));
        assert_eq!(records[2].page, Some(12));
    }

    #[test]
    fn test_search_returns_ascending_distances() {
        let artifact = sample_artifact();
        let query = artifact.embedder.encode("operating temperature").unwrap();
        let hits = artifact.index.search_by_vector(query.as_slice(), 3).unwrap();

        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert!(hits[0].record.content.contains("temperature"));
    }

    #[test]
    fn test_search_k_zero_and_dimension_mismatch() {
        let artifact = sample_artifact();
        let query = artifact.embedder.encode("voltage").unwrap();
        assert!(
            artifact
                .index
                .search_by_vector(query.as_slice(), 0)
                .unwrap()
                .is_empty()
        );
        assert!(artifact.index.search_by_vector(&[0.0, 1.0], 3).is_err());
    }

    #[test]
    fn test_search_ties_break_by_ordinal() {
        let mut index = FlatVectorIndex::new(DistanceMetric::Euclidean, 2);
        for i in 0..3 {
            let record = ChunkRecord::new(format!("chunk {i}"), Some(i + 1), "a.pdf".to_string());
            index.add(record, Vector::new(vec![1.0, 0.0])).unwrap();
        }
        let hits = index.search_by_vector(&[0.0, 0.0], 3).unwrap();
        let ordinals: Vec<u64> = hits.iter().map(|h| h.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_build_embeds_every_record() {
        let artifact = sample_artifact();
        assert_eq!(artifact.index.len(), 3);
        assert_eq!(artifact.metadata.chunk_count, 3);
        assert!(artifact.embedder.is_trained());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.knts");

        let artifact = sample_artifact();
        artifact.save(&path).unwrap();
        let loaded = IndexArtifact::load(&path).unwrap();

        assert_eq!(loaded.metadata.chunk_count, artifact.metadata.chunk_count);
        assert_eq!(loaded.metadata.dimension, artifact.metadata.dimension);

        let query = loaded.embedder.encode("dust filter").unwrap();
        let hits = loaded.index.search_by_vector(query.as_slice(), 1).unwrap();
        assert_eq!(hits[0].record.page, Some(12));
    }

    #[test]
    fn test_load_missing_file_is_index_unavailable() {
        let err = IndexArtifact::load("/nonexistent/corpus.knts").unwrap_err();
        match err {
            KontosError::IndexUnavailable(_) => {}
            other => panic!("expected IndexUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.knts");
        std::fs::write(&path, b"NOPE someotherbytes").unwrap();

        let err = IndexArtifact::load(&path).unwrap_err();
        match err {
            KontosError::Index(msg) => assert!(msg.contains("not a kontos index artifact")),
            other => panic!("expected Index error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.knts");
        sample_artifact().save(&path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        let err = IndexArtifact::load(&path).unwrap_err();
        match err {
            KontosError::Index(msg) => assert!(msg.contains("checksum mismatch")),
            other => panic!("expected Index error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.knts");
        sample_artifact().save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(IndexArtifact::load(&path).is_err());
    }
}
