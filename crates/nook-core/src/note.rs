//! Records persisted by a note store, and the store interface itself.
//!
//! This crate never opens storage. It only shapes extraction output so a
//! [`NoteStore`] implementation can keep it.

use serde::{Deserialize, Serialize};

use crate::document::Document;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub notebook: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    /// View the note as an extraction input, keyed by the note id.
    pub fn to_document(&self) -> Document {
        Document {
            id: self.id.clone(),
            text: self.content.clone(),
            timestamp: self.created_at.clone(),
        }
    }
}

/// A note before the store assigns its identifier and timestamps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub notebook: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewNote {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn notebook(mut self, notebook: &str) -> Self {
        self.notebook = notebook.to_string();
        self
    }

    pub fn user(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub task: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub note_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub user_id: String,
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

/// Selection for [`NoteStore::list`]. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub user_id: Option<String>,
    pub notebook: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<usize>,
}

impl NoteFilter {
    pub fn user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn notebook(mut self, notebook: &str) -> Self {
        self.notebook = Some(notebook.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Persistence boundary for notes.
pub trait NoteStore {
    type Error;

    /// Store a note, returning its new identifier.
    fn put(&self, note: NewNote) -> Result<String, Self::Error>;

    fn get(&self, id: &str) -> Result<Option<Note>, Self::Error>;

    /// Matching notes, newest first.
    fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_document_uses_note_identity() {
        let note = Note {
            id: "n1".to_string(),
            title: "Groceries".to_string(),
            content: "eggs and milk".to_string(),
            notebook: String::new(),
            user_id: "u".to_string(),
            tags: vec![],
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let doc = note.to_document();
        assert_eq!(doc.id, "n1");
        assert_eq!(doc.text, "eggs and milk");
        assert_eq!(doc.timestamp, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn test_new_note_builder() {
        let note = NewNote::new("t", "c")
            .notebook("work")
            .user("alice")
            .tags(vec!["#idea".to_string()]);
        assert_eq!(note.notebook, "work");
        assert_eq!(note.user_id, "alice");
        assert_eq!(note.tags, vec!["#idea"]);
    }

    #[test]
    fn test_filter_builder() {
        let filter = NoteFilter::default().user("alice").tag("#todo").limit(3);
        assert_eq!(filter.user_id.as_deref(), Some("alice"));
        assert_eq!(filter.tag.as_deref(), Some("#todo"));
        assert_eq!(filter.notebook, None);
        assert_eq!(filter.limit, Some(3));
    }

    #[test]
    fn test_note_deserialize_defaults() {
        let json = r#"{"id":"n","title":"t","content":"c","created_at":"x","updated_at":"y"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert!(note.tags.is_empty());
        assert_eq!(note.notebook, "");
    }
}
