//! Tunable extraction limits.
//!
//! Every field defaults to the corresponding constant in [`crate::constants`],
//! so `ExtractConfig::default()` reproduces the stock behavior exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTION_ITEM_MAX_LEN, ACTION_ITEM_MIN_LEN, KEY_POINT_MAX_LEN, KEY_POINT_MIN_LEN,
    MAX_ACTION_ITEMS, MAX_KEY_POINTS, MAX_MATCHES, MAX_TASKS, RELEVANCE_THRESHOLD,
    SUMMARY_SENTENCES, TASK_MAX_LEN, TASK_MIN_LEN,
};

/// Order in which summary sentences are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryOrder {
    /// Highest-scoring sentence first.
    #[default]
    Score,
    /// Selected sentences in their original position.
    Document,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub max_action_items: usize,
    /// Exclusive lower length bound, in characters.
    pub action_item_min_len: usize,
    /// Exclusive upper length bound, in characters.
    pub action_item_max_len: usize,
    pub max_key_points: usize,
    pub key_point_min_len: usize,
    pub key_point_max_len: usize,
    pub summary_sentences: usize,
    pub summary_order: SummaryOrder,
    pub relevance_threshold: f64,
    pub max_matches: usize,
    /// `None` keeps every explicit hashtag found.
    pub max_explicit_tags: Option<usize>,
    pub max_tasks: usize,
    pub task_min_len: usize,
    pub task_max_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_action_items: MAX_ACTION_ITEMS,
            action_item_min_len: ACTION_ITEM_MIN_LEN,
            action_item_max_len: ACTION_ITEM_MAX_LEN,
            max_key_points: MAX_KEY_POINTS,
            key_point_min_len: KEY_POINT_MIN_LEN,
            key_point_max_len: KEY_POINT_MAX_LEN,
            summary_sentences: SUMMARY_SENTENCES,
            summary_order: SummaryOrder::Score,
            relevance_threshold: RELEVANCE_THRESHOLD,
            max_matches: MAX_MATCHES,
            max_explicit_tags: None,
            max_tasks: MAX_TASKS,
            task_min_len: TASK_MIN_LEN,
            task_max_len: TASK_MAX_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroLimit(&'static str),
    EmptyRange {
        field: &'static str,
        min: usize,
        max: usize,
    },
    Threshold(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLimit(field) => write!(f, "{field} must be at least 1"),
            ConfigError::EmptyRange { field, min, max } => {
                write!(f, "{field}: no length fits strictly between {min} and {max}")
            }
            ConfigError::Threshold(t) => {
                write!(f, "relevance_threshold must be in [0, 1), got {t}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ExtractConfig {
    /// Check invariants, returning the config unchanged when they hold.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let limits = [
            ("max_action_items", self.max_action_items),
            ("max_key_points", self.max_key_points),
            ("summary_sentences", self.summary_sentences),
            ("max_matches", self.max_matches),
            ("max_tasks", self.max_tasks),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(field));
            }
        }
        if self.max_explicit_tags == Some(0) {
            return Err(ConfigError::ZeroLimit("max_explicit_tags"));
        }

        let ranges = [
            ("action_item", self.action_item_min_len, self.action_item_max_len),
            ("key_point", self.key_point_min_len, self.key_point_max_len),
            ("task", self.task_min_len, self.task_max_len),
        ];
        for (field, min, max) in ranges {
            // Both bounds are exclusive, so at least one integer must sit between them.
            if min + 1 >= max {
                return Err(ConfigError::EmptyRange { field, min, max });
            }
        }

        if !(0.0..1.0).contains(&self.relevance_threshold) {
            return Err(ConfigError::Threshold(self.relevance_threshold));
        }

        Ok(self)
    }
}

/// Length check with both bounds exclusive, counted in characters.
pub(crate) fn within(text: &str, min: usize, max: usize) -> bool {
    let len = text.chars().count();
    len > min && len < max
}
