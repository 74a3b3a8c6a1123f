use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use uuid::Uuid;

use nook_core::{
    MemoryEntry, NewNote, Note, NoteFilter, NoteStore, Task, normalize_tag, now_iso8601,
};

use crate::error::{Result, StoreError};
use crate::schema;

pub struct Store {
    conn: Connection,
}

/// Row counts across the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub notes: u64,
    pub tags: u64,
    pub tasks: u64,
    pub pending_tasks: u64,
    pub memories: u64,
    pub users: u64,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Notes ---

    /// Insert a note and its tags atomically. Tags that do not normalize are dropped.
    pub fn put_note(&self, note: NewNote) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();
        let full = Note {
            id: id.clone(),
            title: note.title,
            content: note.content,
            notebook: note.notebook,
            user_id: note.user_id,
            tags: note.tags,
            created_at: now.clone(),
            updated_at: now,
        };

        let tx = self.conn.unchecked_transaction()?;
        insert_note_on(&tx, &full)?;
        tx.commit()?;

        tracing::debug!(id = %id, tags = full.tags.len(), "stored note");
        Ok(id)
    }

    pub fn get_note(&self, id: &str) -> Result<Option<Note>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, content, notebook, user_id, created_at, updated_at
                 FROM notes WHERE id = ?1",
                [id],
                note_from_row,
            )
            .optional()?;

        match row {
            Some(mut note) => {
                note.tags = self.tags_for(&note.id)?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    /// Notes matching `filter`, newest first.
    pub fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let tag = filter.tag.as_deref().and_then(normalize_tag);
        if filter.tag.is_some() && tag.is_none() {
            return Ok(Vec::new());
        }
        let limit = filter.limit.map_or(-1, |n| n as i64);

        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, notebook, user_id, created_at, updated_at
             FROM notes n
             WHERE (?1 IS NULL OR n.user_id = ?1)
               AND (?2 IS NULL OR n.notebook = ?2)
               AND (?3 IS NULL OR EXISTS (
                    SELECT 1 FROM note_tags t WHERE t.note_id = n.id AND t.tag = ?3))
             ORDER BY n.created_at DESC, n.rowid DESC
             LIMIT ?4",
        )?;

        let mut notes: Vec<Note> = stmt
            .query_map(
                params![filter.user_id, filter.notebook, tag, limit],
                note_from_row,
            )?
            .collect::<std::result::Result<_, _>>()?;

        for note in &mut notes {
            note.tags = self.tags_for(&note.id)?;
        }
        Ok(notes)
    }

    /// Returns false when no note had that id.
    pub fn delete_note(&self, id: &str) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if removed > 0 {
            tracing::debug!(id, "deleted note");
        }
        Ok(removed > 0)
    }

    fn tags_for(&self, note_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM note_tags WHERE note_id = ?1 ORDER BY tag")?;
        let tags = stmt
            .query_map([note_id], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(tags)
    }

    // --- Tasks ---

    pub fn add_task(&self, user_id: &str, task: &str, note_id: Option<&str>) -> Result<i64> {
        if task.trim().is_empty() {
            return Err(StoreError::InvalidData("task text is empty".to_string()));
        }
        self.conn.execute(
            "INSERT INTO tasks (task, user_id, note_id, completed, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![task.trim(), user_id, note_id, now_iso8601()],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, user_id, "added task");
        Ok(id)
    }

    /// Tasks in insertion order.
    pub fn list_tasks(&self, user_id: &str, pending_only: bool) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task, user_id, note_id, completed, created_at
             FROM tasks
             WHERE user_id = ?1 AND (?2 = 0 OR completed = 0)
             ORDER BY id",
        )?;
        let tasks = stmt
            .query_map(params![user_id, pending_only as i32], |row| {
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
        Ok(tasks)
    }

    pub fn complete_task(&self, id: i64) -> Result<()> {
        let updated = self
            .conn
            .execute("UPDATE tasks SET completed = 1 WHERE id = ?1", [id])?;
        if updated == 0 {
            return Err(StoreError::InvalidData(format!("no task with id {id}")));
        }
        tracing::debug!(id, "completed task");
        Ok(())
    }

    // --- Memories ---

    /// Upsert `key` for `user_id`, then evict that user's oldest entries beyond
    /// `max_entries`. Returns how many were evicted.
    pub fn remember(
        &self,
        user_id: &str,
        key: &str,
        value: &str,
        max_entries: usize,
    ) -> Result<usize> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidData("memory key is empty".to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        // REPLACE assigns a fresh rowid, which orders same-second writes.
        tx.execute(
            "INSERT OR REPLACE INTO memories (user_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, key.trim(), value, now_iso8601()],
        )?;
        let evicted = tx.execute(
            "DELETE FROM memories WHERE user_id = ?1 AND rowid NOT IN (
                SELECT rowid FROM memories WHERE user_id = ?1
                ORDER BY updated_at DESC, rowid DESC LIMIT ?2)",
            params![user_id, max_entries as i64],
        )?;
        tx.commit()?;

        if evicted > 0 {
            tracing::warn!(user_id, evicted, "memory full, evicted oldest entries");
        }
        Ok(evicted)
    }

    /// Most recently updated first.
    pub fn recall(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<MemoryEntry>> {
        let limit = limit.map_or(-1, |n| n as i64);
        let mut stmt = self.conn.prepare(
            "SELECT user_id, key, value, updated_at FROM memories
             WHERE user_id = ?1
             ORDER BY updated_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![user_id, limit], |row| {
                Ok(MemoryEntry {
                    user_id: row.get(0)?,
                    key: row.get(1)?,
                    value: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(entries)
    }

    pub fn forget(&self, user_id: &str, key: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM memories WHERE user_id = ?1 AND key = ?2",
            params![user_id, key],
        )?;
        Ok(removed > 0)
    }

    // --- Stats ---

    pub fn stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(StoreStats {
            notes: count("SELECT COUNT(*) FROM notes")?,
            tags: count("SELECT COUNT(DISTINCT tag) FROM note_tags")?,
            tasks: count("SELECT COUNT(*) FROM tasks")?,
            pending_tasks: count("SELECT COUNT(*) FROM tasks WHERE completed = 0")?,
            memories: count("SELECT COUNT(*) FROM memories")?,
            users: count(
                "SELECT COUNT(*) FROM (
                    SELECT user_id FROM notes UNION
                    SELECT user_id FROM tasks UNION
                    SELECT user_id FROM memories)",
            )?,
        })
    }
}

impl NoteStore for Store {
    type Error = StoreError;

    fn put(&self, note: NewNote) -> Result<String> {
        self.put_note(note)
    }

    fn get(&self, id: &str) -> Result<Option<Note>> {
        self.get_note(id)
    }

    fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        self.list_notes(filter)
    }
}

fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        notebook: row.get(3)?,
        user_id: row.get(4)?,
        tags: Vec::new(),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Write a fully formed note, keeping its id and timestamps.
pub(crate) fn insert_note_on(conn: &Connection, note: &Note) -> Result<()> {
    conn.execute(
        "INSERT INTO notes (id, title, content, notebook, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            note.id,
            note.title,
            note.content,
            note.notebook,
            note.user_id,
            note.created_at,
            note.updated_at,
        ],
    )?;

    for tag in note.tags.iter().filter_map(|t| normalize_tag(t)) {
        conn.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag) VALUES (?1, ?2)",
            params![note.id, tag],
        )?;
    }
    Ok(())
}
