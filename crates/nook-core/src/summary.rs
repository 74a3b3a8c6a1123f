use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ExtractConfig, SummaryOrder, within};
use crate::constants::{
    EPSILON, IMPORTANCE_VOCABULARY, SUMMARY_MIN_WORD_LEN, TITLE_MAX_LEN, TITLE_SCAN_LINES,
};
use crate::time::{CivilTime, now_unix_secs};
use crate::tokenizer::{punctuated_sentences, split_sentences, tokenize};

static TITLE_MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*`]").unwrap());

pub fn extract_key_points(text: &str) -> Vec<String> {
    extract_key_points_with(text, &ExtractConfig::default())
}

/// Sentences containing an importance term, in text order.
pub fn extract_key_points_with(text: &str, config: &ExtractConfig) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| within(s, config.key_point_min_len, config.key_point_max_len))
        .filter(|s| has_importance_term(s))
        .take(config.max_key_points)
        .map(str::to_string)
        .collect()
}

/// Substring match, so "keyboard" counts for "key".
pub fn has_importance_term(sentence: &str) -> bool {
    let lowered = sentence.to_lowercase();
    IMPORTANCE_VOCABULARY
        .iter()
        .any(|term| lowered.contains(term))
}

/// Extractive summary of at most `max_sentences` sentences.
///
/// Text of three sentences or fewer comes back unchanged. Selected sentences
/// keep their closing punctuation and are joined highest score first.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    let config = ExtractConfig {
        summary_sentences: max_sentences,
        ..Default::default()
    };
    summarize_with(text, &config)
}

pub fn summarize_with(text: &str, config: &ExtractConfig) -> String {
    let sentences = punctuated_sentences(text);
    if sentences.len() <= 3 {
        return text.to_string();
    }

    let freq = word_frequencies(text);

    let mut scored: Vec<(usize, f64, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| (idx, sentence_score(sentence, &freq), *sentence))
        .collect();

    // sort_by is stable: ties keep document order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(config.summary_sentences);

    if config.summary_order == SummaryOrder::Document {
        scored.sort_by_key(|(idx, _, _)| *idx);
    }

    scored
        .iter()
        .map(|(_, _, s)| *s)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Counts of lower-cased words longer than [`SUMMARY_MIN_WORD_LEN`] characters.
fn word_frequencies(text: &str) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for word in tokenize(text) {
        if word.chars().count() > SUMMARY_MIN_WORD_LEN {
            *freq.entry(word).or_insert(0) += 1;
        }
    }
    freq
}

/// Mean table value over the sentence's tokens. Zero tokens scores zero.
fn sentence_score(sentence: &str, freq: &HashMap<String, usize>) -> f64 {
    let tokens = tokenize(sentence);
    let total: usize = tokens.iter().map(|t| freq.get(t).copied().unwrap_or(0)).sum();
    total as f64 / (tokens.len() as f64).max(EPSILON)
}

/// Best-effort title: a short leading line, else the first sentence, else a dated fallback.
pub fn generate_title(text: &str) -> String {
    for line in text.lines().take(TITLE_SCAN_LINES) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('-') || line.chars().count() >= TITLE_MAX_LEN {
            continue;
        }
        let title = TITLE_MARKUP.replace_all(line, "");
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    let first = text.split(['.', '!', '?']).next().unwrap_or("").trim();
    if !first.is_empty() && first.chars().count() < TITLE_MAX_LEN {
        return first.to_string();
    }

    format!(
        "Note from {}",
        CivilTime::from_unix_secs(now_unix_secs()).long_date()
    )
}
