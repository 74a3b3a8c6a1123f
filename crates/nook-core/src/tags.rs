use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExtractConfig;
use crate::constants::{TAG_DELIMITER, TAG_VOCABULARY};

static EXPLICIT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

/// Lower-case, deduplicated tags. Each is either an explicit `#word` from the
/// text or a `#`-prefixed term of [`TAG_VOCABULARY`].
pub type TagSet = BTreeSet<String>;

pub fn extract_tags(text: &str) -> TagSet {
    extract_tags_with(text, &ExtractConfig::default())
}

/// Explicit hashtags plus implicit vocabulary tags.
/// `max_explicit_tags` caps distinct explicit tags in text order; implicit
/// tags are never capped.
pub fn extract_tags_with(text: &str, config: &ExtractConfig) -> TagSet {
    let lowered = text.to_lowercase();
    let mut tags = TagSet::new();

    let limit = config.max_explicit_tags.unwrap_or(usize::MAX);
    for m in EXPLICIT_TAG.find_iter(&lowered) {
        if tags.len() >= limit {
            break;
        }
        tags.insert(m.as_str().to_string());
    }

    for term in TAG_VOCABULARY {
        if lowered.contains(term) {
            tags.insert(format!("{TAG_DELIMITER}{term}"));
        }
    }

    tags
}

/// True when `tag` is already in the form [`normalize_tag`] produces.
pub fn is_normalized_tag(tag: &str) -> bool {
    tag.strip_prefix(TAG_DELIMITER).is_some_and(|rest| {
        !rest.is_empty()
            && !rest.starts_with(TAG_DELIMITER)
            && !rest.chars().any(char::is_whitespace)
            && rest.to_lowercase() == rest
    })
}

/// Normalize a user-supplied label (`Work`, `#Work`) into tag form.
pub fn normalize_tag(label: &str) -> Option<String> {
    let trimmed = label.trim().trim_start_matches(TAG_DELIMITER);
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    Some(format!("{TAG_DELIMITER}{}", trimmed.to_lowercase()))
}
