use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Tokenize text into lowercase words, splitting on runs of whitespace.
/// Punctuation stays attached to its word. No stemming, no stop-word removal.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Distinct tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Whitespace-separated word count. Case is irrelevant so no lowercasing.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split on runs of sentence-terminal punctuation. Fragments are trimmed and
/// empty ones dropped; trailing text without a terminator is still a fragment.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// The fragments of [`split_sentences`], each with the punctuation run that
/// closes it. Unterminated trailing text is kept as is. Always the same
/// length as [`split_sentences`].
pub fn punctuated_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK.find_iter(text) {
        if !text[start..m.start()].trim().is_empty() {
            sentences.push(text[start..m.end()].trim());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
