//! Vector (semantic) search over chunk embeddings.
//!
//! This module provides the dense-vector half of the retrieval pipeline:
//! the core vector type, distance metrics with the ranking similarity
//! transform, the [`VectorIndex`] trait the engine consumes, the brute-force
//! [`FlatVectorIndex`] implementation, and the persisted index artifact.
//!
//! # Module Structure
//!
//! - `types`: Core vector data structure
//! - `distance`: Distance metrics and similarity transforms
//! - `index`: The index trait, flat implementation, and artifact persistence

pub mod distance;
pub mod index;
pub mod types;

pub use self::distance::{DistanceMetric, ranking_similarity};
pub use self::index::{FlatVectorIndex, IndexArtifact, VectorHit, VectorIndex};
pub use self::types::Vector;
