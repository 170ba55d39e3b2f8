//! Deterministic extractive generation backend.
//!
//! Quotes the leading sentences of the top-ranked retrieved chunks verbatim,
//! one paragraph per chunk. No model is involved, so this backend cannot
//! fail: it serves both as the fallback when a remote backend errors out and
//! as a standalone backend for offline use.

use unicode_segmentation::UnicodeSegmentation;

use crate::corpus::snippet_of;
use crate::generation::NOT_FOUND_ANSWER;
use crate::generation::types::GenerationRequest;

/// A backend that extracts answers directly from the retrieved chunks.
#[derive(Debug, Clone)]
pub struct ExtractiveBackend {
    /// How many top-ranked contexts to quote.
    max_contexts: usize,
    /// How many leading sentences to keep from each context.
    max_sentences: usize,
    /// Character cap applied to each excerpt, ellipsis included.
    max_chars: usize,
}

impl Default for ExtractiveBackend {
    fn default() -> Self {
        ExtractiveBackend {
            max_contexts: 2,
            max_sentences: 2,
            max_chars: 300,
        }
    }
}

impl ExtractiveBackend {
    /// Creates a backend with the default excerpt limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces an answer by quoting the top-ranked contexts.
    ///
    /// The prompt in the request is ignored: extraction works from the
    /// chunks themselves. Identical requests produce identical answers.
    pub fn generate(&self, request: &GenerationRequest<'_>) -> String {
        if request.contexts.is_empty() {
            return NOT_FOUND_ANSWER.to_string();
        }

        let mut paragraphs = Vec::new();
        for retrieved in request.contexts.iter().take(self.max_contexts) {
            let excerpt = self.leading_sentences(&retrieved.chunk.content);
            let paragraph = match retrieved.chunk.page {
                Some(page) => format!("According to page {}: {}", page, excerpt),
                None if retrieved.chunk.source_file.is_empty() => {
                    format!("According to the source document: {}", excerpt)
                }
                None => format!(
                    "According to {}: {}",
                    retrieved.chunk.source_file, excerpt
                ),
            };
            paragraphs.push(paragraph);
        }

        format!(
            "Based on the indexed documentation:\n\n{}",
            paragraphs.join("\n\n")
        )
    }

    /// Extracts the leading sentences of a chunk, capped at `max_chars`.
    fn leading_sentences(&self, content: &str) -> String {
        let mut excerpt = String::new();
        for sentence in content.unicode_sentences().take(self.max_sentences) {
            excerpt.push_str(sentence);
        }
        snippet_of(excerpt.trim(), self.max_chars)
    }
}
