//! Inverted index construction and top-k lexical search.

use ahash::AHashMap;

use crate::analysis::tokenize;
use crate::corpus::CorpusCache;
use crate::lexical::scorer::Bm25Scorer;

/// One posting: a chunk containing a term, with its in-chunk frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Stable chunk id.
    pub chunk_id: u64,
    /// Occurrences of the term in the chunk.
    pub term_freq: u32,
}

/// A lexical search hit with its max-normalized score.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    /// Stable chunk id.
    pub chunk_id: u64,
    /// Normalized BM25 score in [0, 1].
    pub score: f32,
}

/// An in-memory inverted index over the corpus cache.
///
/// Built once at engine construction and read-only thereafter. A disabled
/// index answers every search with an empty hit list; the engine treats
/// that as the semantic-only degraded mode.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    postings: AHashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f64,
    enabled: bool,
}

impl LexicalIndex {
    /// Build the index over every chunk in the corpus.
    ///
    /// Postings are appended in corpus id order, so each posting list is
    /// sorted by chunk id without further work. An empty corpus yields a
    /// disabled index.
    pub fn build(corpus: &CorpusCache) -> Self {
        if corpus.is_empty() {
            return Self::disabled();
        }

        let mut postings: AHashMap<String, Vec<Posting>> = AHashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());
        let mut total_tokens: u64 = 0;

        for chunk in corpus.iter() {
            let tokens = tokenize(&chunk.content);
            doc_lengths.push(tokens.len() as u32);
            total_tokens += tokens.len() as u64;

            let mut term_counts: AHashMap<String, u32> = AHashMap::new();
            for token in tokens {
                *term_counts.entry(token).or_insert(0) += 1;
            }
            for (term, term_freq) in term_counts {
                postings.entry(term).or_default().push(Posting {
                    chunk_id: chunk.id,
                    term_freq,
                });
            }
        }

        let avg_doc_length = total_tokens as f64 / doc_lengths.len() as f64;

        Self {
            postings,
            doc_lengths,
            avg_doc_length,
            enabled: true,
        }
    }

    /// A permanently disabled, no-op index.
    pub fn disabled() -> Self {
        Self {
            postings: AHashMap::new(),
            doc_lengths: Vec::new(),
            avg_doc_length: 0.0,
            enabled: false,
        }
    }

    /// Whether this index answers searches.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of indexed documents.
    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Average document length in tokens.
    pub fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    /// Search for the top `k` chunks by BM25 score.
    ///
    /// Scores are divided by the maximum score of the result set, so the
    /// best hit scores exactly 1.0; when that maximum is 0 the division is
    /// skipped and all scores stay 0. Results are ordered score descending,
    /// ties by ascending chunk id.
    pub fn search(&self, query: &str, k: usize) -> Vec<LexicalHit> {
        if !self.enabled || k == 0 {
            return Vec::new();
        }
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let scorer = Bm25Scorer::new(self.doc_count() as u64, self.avg_doc_length);
        let mut accumulated: AHashMap<u64, f32> = AHashMap::new();

        for token in &tokens {
            if let Some(posting_list) = self.postings.get(token) {
                let idf = scorer.idf(posting_list.len() as u64);
                for posting in posting_list {
                    let doc_length = self.doc_lengths[posting.chunk_id as usize] as f32;
                    let contribution = idf * scorer.tf(posting.term_freq as f32, doc_length);
                    *accumulated.entry(posting.chunk_id).or_insert(0.0) += contribution;
                }
            }
        }

        let mut hits: Vec<LexicalHit> = accumulated
            .into_iter()
            .map(|(chunk_id, score)| LexicalHit { chunk_id, score })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(k);

        let max_score = hits.first().map(|h| h.score).unwrap_or(0.0);
        if max_score > 0.0 {
            for hit in &mut hits {
                hit.score /= max_score;
            }
        }

        hits
    }
}
