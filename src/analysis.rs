//! Text analysis for Kontos.
//!
//! A single tokenization routine shared by the lexical index and the TF-IDF
//! embedder. Both retrieval channels must see identical token streams for a
//! given text, so this is the only tokenizer in the crate.

/// Tokenize text into lowercase terms.
///
/// Splits on whitespace and trims non-alphanumeric characters from token
/// edges, so "Operating temperature: -10C" yields `["operating",
/// "temperature", "10c"]`. Short tokens are kept; technical corpora lean on
/// unit-like terms such as "5v" or "io".
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Count tokens without collecting them.
pub fn token_count(text: &str) -> usize {
    text.to_lowercase()
        .split_whitespace()
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|s| !s.is_empty())
        .count()
}
