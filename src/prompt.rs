//! Grounding prompt composition.
//!
//! One deterministic template for every backend: the selected chunks under
//! `[Page N]` markers, fixed grounding instructions, then the question.

use crate::retrieval::RetrievedChunk;

/// The reply the generator is instructed to give when the documents do not
/// contain the answer.
pub const ABSENCE_REPLY: &str = "The information is not present in the provided documentation.";

/// Renders question + ranked chunks into a grounding prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    /// Create a new prompt composer.
    pub fn new() -> Self {
        Self
    }

    /// Compose the grounding prompt for a question over retrieved chunks.
    pub fn compose(&self, question: &str, chunks: &[RetrievedChunk]) -> String {
        let mut documents = String::new();
        for retrieved in chunks {
            documents.push_str(&page_marker(retrieved.chunk.page));
            documents.push('\n');
            documents.push_str(&retrieved.chunk.content);
            documents.push_str("\n\n");
        }

        format!(
            "You are a technical assistant specializing in product documentation.\n\
             Answer the question using ONLY the information in the documents below.\n\
             \n\
             IMPORTANT INSTRUCTIONS:\n\
             1. Use only information from the provided documents\n\
             2. ALWAYS cite the page a fact comes from (for example: \"According to page 2...\")\n\
             3. If the information is not in the documents, reply: \"{ABSENCE_REPLY}\"\n\
             4. Be precise and technical\n\
             5. Do not invent or speculate\n\
             \n\
             DOCUMENTS:\n\
             {documents}\
             QUESTION: {question}\n\
             \n\
             ANSWER (cite pages):"
        )
    }
}

/// The page marker rendered above each document chunk.
pub fn page_marker(page: Option<u32>) -> String {
    match page {
        Some(n) => format!("[Page {n}]"),
        None => "[Page unknown]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Chunk, ChunkRecord};

    fn retrieved(id: u64, content: &str, page: Option<u32>) -> RetrievedChunk {
        let chunk = Chunk::from_record(id, ChunkRecord::new(content, page, "manual.pdf"));
        RetrievedChunk::new(chunk, 0.9)
    }

    #[test]
    fn test_compose_includes_page_markers_and_content() {
        let composer = PromptComposer::new();
        let chunks = vec![
            retrieved(0, "Operating temperature: -10C to 60C", Some(5)),
            retrieved(1, "Input voltage range is 100-240V AC", Some(6)),
        ];
        let prompt = composer.compose("What is the operating range?", &chunks);

        assert!(prompt.contains("[Page 5]\nOperating temperature: -10C to 60C"));
        assert!(prompt.contains("[Page 6]\nInput voltage range is 100-240V AC"));
        assert!(prompt.contains("QUESTION: What is the operating range?"));
    }

    #[test]
    fn test_compose_includes_grounding_instructions() {
        let composer = PromptComposer::new();
        let prompt = composer.compose("anything", &[retrieved(0, "text", Some(1))]);

        assert!(prompt.contains("ONLY the information in the documents"));
        assert!(prompt.contains("ALWAYS cite the page"));
        assert!(prompt.contains(ABSENCE_REPLY));
        assert!(prompt.contains("Do not invent or speculate"));
        assert!(prompt.ends_with("ANSWER (cite pages):"));
    }

    #[test]
    fn test_compose_marks_unknown_pages() {
        let composer = PromptComposer::new();
        let prompt = composer.compose("q", &[retrieved(0, "unpaged text", None)]);
        assert!(prompt.contains("[Page unknown]\nunpaged text"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::new();
        let chunks = vec![retrieved(0, "alpha", Some(1)), retrieved(1, "beta", Some(2))];
        let a = composer.compose("q", &chunks);
        let b = composer.compose("q", &chunks);
        assert_eq!(a, b);
    }

    #[test]
    fn test_page_marker_forms() {
        assert_eq!(page_marker(Some(12)), "[Page 12]");
        assert_eq!(page_marker(None), "[Page unknown]");
    }
}
