use std::fs;
use std::path::Path;

use rusqlite::params;

use nook_core::{
    Archive, MemoryEntry, NoteFilter, Task, export_json, import_json, is_normalized_tag,
};

use crate::error::{Result, StoreError};
use crate::store::{Store, insert_note_on};

impl Store {
    /// Snapshot every note, task and memory.
    pub fn load_archive(&self) -> Result<Archive> {
        let mut notes = self.list_notes(&NoteFilter::default())?;
        // Oldest first, so a restore replays creation order.
        notes.reverse();

        let mut stmt = self.conn().prepare(
            "SELECT id, task, user_id, note_id, completed, created_at FROM tasks ORDER BY id",
        )?;
        let tasks: Vec<Task> = stmt
            .query_map([], |row| {
                Ok(Task {
                    id: row.get(0)?,
                    task: row.get(1)?,
                    user_id: row.get(2)?,
                    note_id: row.get(3)?,
                    completed: row.get::<_, i32>(4)? != 0,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self.conn().prepare(
            "SELECT user_id, key, value, updated_at FROM memories ORDER BY rowid",
        )?;
        let memories: Vec<MemoryEntry> = stmt
            .query_map([], |row| {
                Ok(MemoryEntry {
                    user_id: row.get(0)?,
                    key: row.get(1)?,
                    value: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        Ok(Archive::new(notes, tasks, memories))
    }

    /// Replace the store contents with `archive`, keeping ids and timestamps.
    /// An archive carrying a malformed tag is rejected before anything is deleted.
    pub fn restore_archive(&self, archive: &Archive) -> Result<()> {
        for note in &archive.notes {
            if let Some(tag) = note.tags.iter().find(|t| !is_normalized_tag(t)) {
                return Err(StoreError::InvalidData(format!(
                    "note {} has malformed tag {tag:?}",
                    note.id
                )));
            }
        }

        let tx = self.conn().unchecked_transaction()?;

        tx.execute_batch(
            "DELETE FROM note_tags; DELETE FROM tasks; DELETE FROM notes; DELETE FROM memories;",
        )?;

        for note in &archive.notes {
            insert_note_on(&tx, note)?;
        }

        for task in &archive.tasks {
            tx.execute(
                "INSERT INTO tasks (id, task, user_id, note_id, completed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    task.id,
                    task.task,
                    task.user_id,
                    task.note_id,
                    task.completed as i32,
                    task.created_at,
                ],
            )?;
        }

        for memory in &archive.memories {
            tx.execute(
                "INSERT OR REPLACE INTO memories (user_id, key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![memory.user_id, memory.key, memory.value, memory.updated_at],
            )?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('last_import', ?1)",
            [&archive.exported_at],
        )?;

        tx.commit()?;
        tracing::info!(
            notes = archive.notes.len(),
            tasks = archive.tasks.len(),
            memories = archive.memories.len(),
            "restored archive"
        );
        Ok(())
    }

    pub fn import_json_file(&self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(&json)
    }

    pub fn import_json_str(&self, json: &str) -> Result<()> {
        let archive =
            import_json(json).map_err(|e| StoreError::InvalidData(format!("invalid JSON: {e}")))?;
        self.restore_archive(&archive)
    }

    pub fn export_json_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json_string()?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    pub fn export_json_string(&self) -> Result<String> {
        let archive = self.load_archive()?;
        export_json(&archive)
            .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }
}
