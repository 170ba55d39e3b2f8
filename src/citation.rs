//! Citation enforcement for generated answers.
//!
//! Generated answers are instructed to cite the page each fact came from,
//! but a model can ignore instructions. The enforcer scans the final answer
//! for a recognizable citation and, when none is found and at least one
//! chunk backs the answer, prepends a synthesized one. Downstream consumers
//! can therefore rely on every sourced answer naming where it came from.

use std::sync::LazyLock;

use regex::Regex;

use crate::retrieval::RetrievedChunk;

/// Matches page references such as "page 5", "p. 5", "pg. 5", "[Page 5]",
/// and the localized "página 5" / "pág. 5" forms.
static PAGE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:page|p[áa]gina|p[áa]g\.|pg\.?|p\.)\s*\d+").expect("valid regex")
});

/// Matches synthesized source references such as "[Source: manual.pdf]".
static SOURCE_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[source:\s*[^\]]+\]").expect("valid regex"));

/// Guarantees that answers carry a recognizable citation whenever at least
/// one source chunk backs them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationEnforcer;

impl CitationEnforcer {
    /// Creates an enforcer.
    pub fn new() -> Self {
        CitationEnforcer
    }

    /// Whether the answer already contains a recognizable citation.
    pub fn has_citation(&self, answer: &str) -> bool {
        PAGE_CITATION.is_match(answer) || SOURCE_CITATION.is_match(answer)
    }

    /// Returns the answer, prepending a synthesized citation when it lacks one.
    ///
    /// The synthesized citation names the page of the best-ranked chunk that
    /// has one; when no chunk carries a page it names the best-ranked chunk's
    /// source document. Answers produced without contexts pass through
    /// untouched.
    pub fn enforce(&self, answer: &str, contexts: &[RetrievedChunk]) -> String {
        if contexts.is_empty() || self.has_citation(answer) {
            return answer.to_string();
        }
        match self.synthesize(contexts) {
            Some(citation) => format!("{} {}", citation, answer),
            None => answer.to_string(),
        }
    }

    /// Builds a citation from the best-ranked context that can provide one.
    fn synthesize(&self, contexts: &[RetrievedChunk]) -> Option<String> {
        if let Some(page) = contexts.iter().find_map(|c| c.chunk.page) {
            return Some(format!("[Page {}]", page));
        }
        let top = contexts.first()?;
        let source = if top.chunk.source_file.is_empty() {
            "unknown"
        } else {
            top.chunk.source_file.as_str()
        };
        Some(format!("[Source: {}]", source))
    }
}
