//! BM25 scoring for lexical ranking.

/// BM25 scorer over corpus-level statistics.
///
/// Uses the non-negative IDF variant `ln(1 + (N - df + 0.5) / (df + 0.5))`:
/// downstream fusion divides top-k scores by their maximum and expects the
/// result in [0, 1], which the raw log-ratio breaks for terms present in
/// more than half the corpus.
#[derive(Debug, Clone)]
pub struct Bm25Scorer {
    /// Total number of documents in the index.
    total_docs: u64,
    /// Average document length in tokens.
    avg_doc_length: f64,
    /// BM25 k1 parameter.
    k1: f32,
    /// BM25 b parameter.
    b: f32,
}

impl Bm25Scorer {
    /// Create a new BM25 scorer with standard parameters (k1=1.2, b=0.75).
    pub fn new(total_docs: u64, avg_doc_length: f64) -> Self {
        Self {
            total_docs,
            avg_doc_length,
            k1: 1.2,
            b: 0.75,
        }
    }

    /// Create a scorer with explicit k1 and b.
    pub fn with_params(total_docs: u64, avg_doc_length: f64, k1: f32, b: f32) -> Self {
        Self {
            total_docs,
            avg_doc_length,
            k1,
            b,
        }
    }

    /// Inverse document frequency of a term seen in `doc_freq` documents.
    pub fn idf(&self, doc_freq: u64) -> f32 {
        if doc_freq == 0 || self.total_docs == 0 {
            return 0.0;
        }

        let n = self.total_docs as f32;
        let df = doc_freq as f32;

        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Saturating, length-normalized term frequency component.
    pub fn tf(&self, term_freq: f32, doc_length: f32) -> f32 {
        if term_freq == 0.0 {
            return 0.0;
        }

        let avg_len = self.avg_doc_length.max(1.0) as f32;
        let norm_factor = 1.0 - self.b + self.b * (doc_length / avg_len);

        (term_freq * (self.k1 + 1.0)) / (term_freq + self.k1 * norm_factor)
    }

    /// Score one term occurrence in one document.
    pub fn score(&self, doc_freq: u64, term_freq: u32, doc_length: u32) -> f32 {
        self.idf(doc_freq) * self.tf(term_freq as f32, doc_length as f32)
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Get the b parameter.
    pub fn b(&self) -> f32 {
        self.b
    }
}
