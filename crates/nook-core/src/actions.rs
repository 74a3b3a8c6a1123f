//! Imperative-statement extraction.
//!
//! Two flavors: [`extract_action_items`] looks for obligation phrasing inside
//! prose, [`extract_tasks`] looks for list-shaped lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ExtractConfig, within};
use crate::tokenizer::capitalize;

/// Applied in order; all matches of one rule come before the next rule's.
static ACTION_RULES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(
            r"(?i)(?:you should|you need to|you must|please|make sure to|don't forget to)\s+([^.!?]+)",
        )
        .unwrap(),
        Regex::new(r"(?i)(?:TODO|Action|Task):\s*([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)(?:\d+\.|-|\*)\s*(?:You should|Need to|Must)\s+([^.!?\n]+)").unwrap(),
    ]
});

static TASK_RULES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(?m)[-*•]\s+(.+)").unwrap(),
        Regex::new(r"(?m)\d+\.\s+(.+)").unwrap(),
        Regex::new(r"(?m)TODO:\s*(.+)").unwrap(),
        Regex::new(r"(?m)Task:\s*(.+)").unwrap(),
    ]
});

pub fn extract_action_items(text: &str) -> Vec<String> {
    extract_action_items_with(text, &ExtractConfig::default())
}

/// Trigger phrase stripped, first letter capitalized, rest lower-cased.
/// Deduplicated by exact text, first occurrence wins.
pub fn extract_action_items_with(text: &str, config: &ExtractConfig) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();

    for rule in ACTION_RULES.iter() {
        for caps in rule.captures_iter(text) {
            let Some(fragment) = caps.get(1) else {
                continue;
            };
            let cleaned = capitalize(fragment.as_str().trim());
            if !within(
                &cleaned,
                config.action_item_min_len,
                config.action_item_max_len,
            ) || items.contains(&cleaned)
            {
                continue;
            }
            items.push(cleaned);
        }
    }

    items.truncate(config.max_action_items);
    items
}

pub fn extract_tasks(text: &str) -> Vec<String> {
    extract_tasks_with(text, &ExtractConfig::default())
}

/// Bulleted, numbered, and labelled lines, rest of line captured verbatim.
pub fn extract_tasks_with(text: &str, config: &ExtractConfig) -> Vec<String> {
    let mut tasks: Vec<String> = Vec::new();

    for rule in TASK_RULES.iter() {
        for caps in rule.captures_iter(text) {
            let Some(fragment) = caps.get(1) else {
                continue;
            };
            let task = fragment.as_str().trim();
            if !within(task, config.task_min_len, config.task_max_len)
                || tasks.iter().any(|t| t == task)
            {
                continue;
            }
            tasks.push(task.to_string());
        }
    }

    tasks.truncate(config.max_tasks);
    tasks
}
