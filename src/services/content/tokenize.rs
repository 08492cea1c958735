//! Text normalization shared by index build and query paths.

use crate::config::ContentConfig;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Common English words carrying no ranking signal.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have",
        "if", "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "our", "such",
        "that", "the", "their", "then", "there", "these", "they", "this", "to", "was", "were",
        "will", "with", "you", "your",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Lowercase, split on non-alphanumeric runs, drop short tokens and
/// (optionally) stop words. Identical treatment for documents and queries
/// keeps both in the same vector space.
pub fn tokenize(text: &str, config: &ContentConfig) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= config.min_token_len)
        .filter(|t| !config.use_stop_words || !is_stop_word(t))
        .map(String::from)
        .collect()
}
