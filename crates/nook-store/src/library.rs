use std::path::{Path, PathBuf};
use std::{env, fs};

use nook_core::{
    Annotations, Document, MemoryFact, NewNote, NoteFilter, RankedMatch, TagSet, Task,
    annotate_with, extract_tags_with, extract_tasks_with, extract_user_facts, generate_title,
    normalize_tag, rank_with,
};

use crate::error::{Result, StoreError};
use crate::settings::Settings;
use crate::store::Store;

pub const DB_FILE: &str = "notes.db";

/// Default data directory: `~/.nook`.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".nook")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// A note store paired with the settings that drive extraction.
pub struct Library {
    store: Store,
    settings: Settings,
    data_dir: Option<PathBuf>,
}

impl Library {
    /// Open `<base>/notes.db` with `<base>/config.toml`, creating `base` as needed.
    /// `base_dir`: override the data directory (for testing).
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);

        fs::create_dir_all(&base).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", base.display()))
        })?;

        let settings = Settings::load(&base)?;
        let store = Store::open(&base.join(DB_FILE))?;
        tracing::debug!(dir = %base.display(), "opened library");

        Ok(Self {
            store,
            settings,
            data_dir: Some(base),
        })
    }

    /// Open with an in-memory store and default settings (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
            settings: Settings::default(),
            data_dir: None,
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `None` for in-memory libraries.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn annotate(&self, doc: &Document) -> Annotations {
        annotate_with(doc, &self.settings.extract)
    }

    /// Persist a note with the tags found in its content merged into any given.
    /// An empty title is generated from the content.
    pub fn save_note(&self, mut note: NewNote) -> Result<String> {
        let mut tags: TagSet = note.tags.iter().filter_map(|t| normalize_tag(t)).collect();
        tags.extend(extract_tags_with(&note.content, &self.settings.extract));
        note.tags = tags.into_iter().collect();

        if note.title.trim().is_empty() {
            note.title = generate_title(&note.content);
        }
        self.store.put_note(note)
    }

    /// Stored notes most similar to `text`. `user` restricts the candidates.
    pub fn related(
        &self,
        text: &str,
        exclude_id: Option<&str>,
        user: Option<&str>,
    ) -> Result<Vec<RankedMatch>> {
        let filter = NoteFilter {
            user_id: user.map(str::to_string),
            ..Default::default()
        };
        let candidates: Vec<Document> = self
            .store
            .list_notes(&filter)?
            .iter()
            .map(|n| n.to_document())
            .collect();
        Ok(rank_with(text, &candidates, exclude_id, &self.settings.extract))
    }

    /// Extract list-style tasks from `text` and store each for `user`.
    pub fn save_tasks(&self, user: &str, text: &str, note_id: Option<&str>) -> Result<Vec<Task>> {
        let extracted = extract_tasks_with(text, &self.settings.extract);
        if extracted.is_empty() {
            return Ok(Vec::new());
        }
        let ids = extracted
            .iter()
            .map(|t| self.store.add_task(user, t, note_id))
            .collect::<Result<Vec<i64>>>()?;
        let tasks = self
            .store
            .list_tasks(user, false)?
            .into_iter()
            .filter(|t| ids.contains(&t.id))
            .collect();
        Ok(tasks)
    }

    pub fn remember(&self, user: &str, key: &str, value: &str) -> Result<usize> {
        self.store
            .remember(user, key, value, self.settings.memory.max_memories)
    }

    /// Pull facts about the user out of `text` and remember them.
    /// Facts are still returned when memory is disabled, just not stored.
    pub fn learn(&self, user: &str, text: &str) -> Result<Vec<MemoryFact>> {
        let facts = extract_user_facts(text);
        if !self.settings.memory.enabled {
            if !facts.is_empty() {
                tracing::debug!(user, "memory disabled, not storing facts");
            }
            return Ok(facts);
        }
        for fact in &facts {
            self.remember(user, &fact.key, &fact.value)?;
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    #[test]
    fn test_directory_creation() {
        let dir = tempfile::TempDir::new().unwrap();
        let base = dir.path().join("nested").join("nook");
        let library = Library::open(Some(&base)).unwrap();
        assert!(base.join(DB_FILE).exists());
        assert_eq!(library.data_dir(), Some(base.as_path()));
    }

    #[test]
    fn test_open_reads_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[memory]\nmax_memories = 7\n",
        )
        .unwrap();
        let library = Library::open(Some(dir.path())).unwrap();
        assert_eq!(library.settings().memory.max_memories, 7);
    }

    #[test]
    fn test_open_rejects_bad_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[extract]\nmax_tasks = 0\n").unwrap();
        assert!(Library::open(Some(dir.path())).is_err());
    }

    #[test]
    fn test_save_note_merges_tags_and_titles() {
        let library = Library::open_in_memory().unwrap();
        let id = library
            .save_note(
                NewNote::new("", "Weekly sync #meeting\nAgreed to revisit the idea")
                    .tags(vec!["Planning".to_string()]),
            )
            .unwrap();

        let note = library.store().get_note(&id).unwrap().unwrap();
        assert_eq!(note.title, "Weekly sync meeting");
        assert_eq!(note.tags, vec!["#idea", "#meeting", "#planning"]);
    }

    #[test]
    fn test_related_excludes_and_scopes() {
        let library = Library::open_in_memory().unwrap();
        let a = library
            .save_note(NewNote::new("a", "rust borrow checker rules").user("alice"))
            .unwrap();
        let b = library
            .save_note(NewNote::new("b", "the rust borrow checker").user("alice"))
            .unwrap();
        library
            .save_note(NewNote::new("c", "rust borrow checker").user("bob"))
            .unwrap();

        let matches = library
            .related("rust borrow checker rules", Some(&a), Some("alice"))
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].document.id, b);

        let everyone = library.related("rust borrow checker", None, None).unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[test]
    fn test_save_tasks() {
        let library = Library::open_in_memory().unwrap();
        let tasks = library
            .save_tasks("alice", "- buy milk\n- call the bank\nTODO: renew passport", None)
            .unwrap();
        let texts: Vec<&str> = tasks.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(texts, vec!["buy milk", "call the bank", "renew passport"]);
        assert!(library.save_tasks("alice", "nothing here", None).unwrap().is_empty());
    }

    #[test]
    fn test_learn_stores_name() {
        let library = Library::open_in_memory().unwrap();
        let facts = library.learn("alice", "Hi, my name is Alice.").unwrap();
        assert_eq!(facts.len(), 1);

        let recalled = library.store().recall("alice", None).unwrap();
        assert_eq!(recalled[0].key, "name");
        assert_eq!(recalled[0].value, "Alice");
    }

    #[test]
    fn test_learn_with_memory_disabled() {
        let library = Library::open_in_memory().unwrap().with_settings(Settings {
            memory: MemorySettings {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        });
        let facts = library.learn("alice", "my name is Alice").unwrap();
        assert_eq!(facts.len(), 1);
        assert!(library.store().recall("alice", None).unwrap().is_empty());
    }

    #[test]
    fn test_remember_uses_configured_cap() {
        let library = Library::open_in_memory().unwrap().with_settings(Settings {
            memory: MemorySettings {
                enabled: true,
                max_memories: 1,
            },
            ..Default::default()
        });
        library.remember("alice", "a", "1").unwrap();
        assert_eq!(library.remember("alice", "b", "2").unwrap(), 1);
        assert_eq!(library.store().recall("alice", None).unwrap().len(), 1);
    }
}
