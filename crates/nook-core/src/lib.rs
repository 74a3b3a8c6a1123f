//! Note and task extraction from free text.
//!
//! Tags, action items, key points and extractive summaries are pure functions
//! of a [`Document`]; related notes are ranked by Jaccard overlap of their
//! token sets.
//!
//! Zero I/O — persistence lives behind the [`NoteStore`] trait and is
//! implemented elsewhere.

pub mod actions;
pub mod annotate;
pub mod archive;
pub mod config;
pub mod constants;
pub mod document;
pub mod export;
pub mod intent;
pub mod note;
pub mod similarity;
pub mod summary;
pub mod tags;
pub mod time;
pub mod tokenizer;

pub use actions::{
    extract_action_items, extract_action_items_with, extract_tasks, extract_tasks_with,
};
pub use annotate::{Annotations, annotate, annotate_with};
pub use archive::{ARCHIVE_VERSION, Archive, export_json, import_json};
pub use config::{ConfigError, ExtractConfig, SummaryOrder};
pub use constants::{MAX_MATCHES, RELEVANCE_THRESHOLD};
pub use document::Document;
pub use export::{ExportFormat, render_export};
pub use intent::{MemoryFact, NoteIntent, detect_note_intent, extract_user_facts};
pub use note::{MemoryEntry, NewNote, Note, NoteFilter, NoteStore, Task};
pub use similarity::{RankedMatch, jaccard, rank, rank_with, similarity};
pub use summary::{
    extract_key_points, extract_key_points_with, generate_title, summarize, summarize_with,
};
pub use tags::{TagSet, extract_tags, extract_tags_with, is_normalized_tag, normalize_tag};
pub use time::{CivilTime, now_iso8601, now_unix_secs, unix_to_iso8601};
pub use tokenizer::{tokenize, word_count};
