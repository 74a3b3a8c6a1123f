use serde::{Deserialize, Serialize};

use crate::actions::extract_action_items_with;
use crate::config::ExtractConfig;
use crate::document::Document;
use crate::summary::{extract_key_points_with, generate_title, summarize_with};
use crate::tags::extract_tags_with;
use crate::tokenizer::word_count;

/// Everything the extractors derive from one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub document_id: String,
    /// Sorted.
    pub tags: Vec<String>,
    pub action_items: Vec<String>,
    pub key_points: Vec<String>,
    pub summary: String,
    pub title: String,
    pub word_count: usize,
}

impl Annotations {
    /// True when no extractor found anything beyond the title and summary.
    pub fn is_bare(&self) -> bool {
        self.tags.is_empty() && self.action_items.is_empty() && self.key_points.is_empty()
    }
}

pub fn annotate(doc: &Document) -> Annotations {
    annotate_with(doc, &ExtractConfig::default())
}

pub fn annotate_with(doc: &Document, config: &ExtractConfig) -> Annotations {
    let text = doc.text.as_str();
    Annotations {
        document_id: doc.id.clone(),
        tags: extract_tags_with(text, config).into_iter().collect(),
        action_items: extract_action_items_with(text, config),
        key_points: extract_key_points_with(text, config),
        summary: summarize_with(text, config),
        title: generate_title(text),
        word_count: word_count(text),
    }
}
