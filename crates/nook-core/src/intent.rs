//! Cues in chat text: does a message want saving, and does it state a fact
//! about the user worth remembering.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    INDICATOR_WEIGHT, NOTE_INDICATORS, OFFER_SAVE_CONFIDENCE, STRONG_NOTE_INDICATORS,
};

static NAME_FACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmy name is\s+(\S+)").unwrap());

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteIntent {
    /// Message starts with `!note` or `/note`.
    pub command: bool,
    pub indicators: Vec<String>,
    pub score: usize,
    pub confidence: f64,
    pub auto_note: bool,
}

impl NoteIntent {
    pub fn should_offer_save(&self) -> bool {
        self.confidence > OFFER_SAVE_CONFIDENCE
    }
}

pub fn detect_note_intent(text: &str) -> NoteIntent {
    let lowered = text.to_lowercase();
    let command = lowered.starts_with("!note") || lowered.starts_with("/note");

    let indicators: Vec<String> = NOTE_INDICATORS
        .iter()
        .filter(|ind| lowered.contains(*ind))
        .map(|ind| ind.to_string())
        .collect();
    let score = indicators.len();
    let strong = STRONG_NOTE_INDICATORS
        .iter()
        .any(|ind| lowered.contains(ind));

    NoteIntent {
        command,
        score,
        confidence: (score as f64 * INDICATOR_WEIGHT).min(1.0),
        auto_note: score >= 2 || strong,
        indicators,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFact {
    pub key: String,
    pub value: String,
}

/// Personal facts stated in the text. Currently only the user's name.
pub fn extract_user_facts(text: &str) -> Vec<MemoryFact> {
    let mut facts = Vec::new();
    if let Some(caps) = NAME_FACT.captures(text) {
        let name = caps[1].trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'');
        if !name.is_empty() {
            facts.push(MemoryFact {
                key: "name".to_string(),
                value: name.to_string(),
            });
        }
    }
    facts
}
