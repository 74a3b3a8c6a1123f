//! JSON archive of a whole note library.
//!
//! Field names are snake_case. Older archives without `tasks` or `memories`
//! load with those sections empty.

use serde::{Deserialize, Serialize};

use crate::note::{MemoryEntry, Note, Task};
use crate::time::now_iso8601;

pub const ARCHIVE_VERSION: &str = "1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub version: String,
    #[serde(default)]
    pub exported_at: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub memories: Vec<MemoryEntry>,
}

impl Archive {
    pub fn new(notes: Vec<Note>, tasks: Vec<Task>, memories: Vec<MemoryEntry>) -> Self {
        Self {
            version: ARCHIVE_VERSION.to_string(),
            exported_at: now_iso8601(),
            notes,
            tasks,
            memories,
        }
    }
}

pub fn export_json(archive: &Archive) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(archive)
}

pub fn import_json(json: &str) -> Result<Archive, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Archive {
        let note = Note {
            id: "n1".to_string(),
            title: "Ideas".to_string(),
            content: "#idea build a shed".to_string(),
            notebook: "home".to_string(),
            user_id: "u1".to_string(),
            tags: vec!["#idea".to_string()],
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let task = Task {
            id: 1,
            task: "buy lumber".to_string(),
            user_id: "u1".to_string(),
            note_id: Some("n1".to_string()),
            completed: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };
        Archive::new(vec![note], vec![task], vec![])
    }

    #[test]
    fn test_export_import() {
        let archive = sample();
        let json = export_json(&archive).unwrap();
        assert!(json.contains("\"version\": \"1\""));
        let back = import_json(&json).unwrap();
        assert_eq!(back, archive);
    }

    #[test]
    fn test_missing_sections_default() {
        let archive = import_json(r#"{"version": "1"}"#).unwrap();
        assert!(archive.notes.is_empty());
        assert!(archive.tasks.is_empty());
        assert!(archive.memories.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(import_json("not json").is_err());
    }
}
