use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::now_iso8601;

/// An immutable unit of text handed to the extractors.
/// Nothing in this crate mutates a document once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub timestamp: String,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), text)
    }

    pub fn with_id(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            timestamp: now_iso8601(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }
}
