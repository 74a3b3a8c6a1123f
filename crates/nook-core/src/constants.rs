/// Maximum action items kept per document
pub const MAX_ACTION_ITEMS: usize = 5;

/// Action items must be strictly longer than this (characters)
pub const ACTION_ITEM_MIN_LEN: usize = 10;

/// Action items must be strictly shorter than this (characters)
pub const ACTION_ITEM_MAX_LEN: usize = 200;

/// Maximum key points kept per document
pub const MAX_KEY_POINTS: usize = 5;

/// Key points must be strictly longer than this (characters)
pub const KEY_POINT_MIN_LEN: usize = 20;

/// Key points must be strictly shorter than this (characters)
pub const KEY_POINT_MAX_LEN: usize = 200;

/// Sentences kept by the extractive summary
pub const SUMMARY_SENTENCES: usize = 3;

/// Words must be longer than this to enter the summary frequency table
pub const SUMMARY_MIN_WORD_LEN: usize = 3;

/// Similarity scores must exceed this to be reported as a match
pub const RELEVANCE_THRESHOLD: f64 = 0.1;

/// Maximum ranked matches returned
pub const MAX_MATCHES: usize = 3;

/// Maximum list tasks kept per document
pub const MAX_TASKS: usize = 10;

/// List tasks must be strictly longer than this (characters)
pub const TASK_MIN_LEN: usize = 5;

/// List tasks must be strictly shorter than this (characters)
pub const TASK_MAX_LEN: usize = 200;

/// Denominator guard for sentence scoring
pub const EPSILON: f64 = 1e-10;

/// Explicit tag delimiter
pub const TAG_DELIMITER: char = '#';

/// Controlled vocabulary for implicit tags.
pub const TAG_VOCABULARY: &[&str] = &["todo", "important", "idea", "meeting", "project"];

/// Terms that flag a sentence as a key point.
pub const IMPORTANCE_VOCABULARY: &[&str] = &[
    "important",
    "key",
    "critical",
    "essential",
    "must",
    "significant",
    "main",
    "primary",
    "fundamental",
    "crucial",
    "remember",
    "note",
];

/// Phrases suggesting a chat message is worth saving as a note.
pub const NOTE_INDICATORS: &[&str] = &[
    "important",
    "remember",
    "note",
    "save this",
    "keep in mind",
    "don't forget",
    "for reference",
    "key point",
    "action item",
    "todo",
    "task",
    "remind me",
    "meeting notes",
    "summary",
];

/// Any one of these alone is enough to suggest saving.
pub const STRONG_NOTE_INDICATORS: &[&str] = &["save this", "remember", "important note"];

/// Confidence contributed by each detected note indicator
pub const INDICATOR_WEIGHT: f64 = 0.3;

/// Confidence above which a save prompt should be offered
pub const OFFER_SAVE_CONFIDENCE: f64 = 0.6;

/// Titles must be strictly shorter than this (characters)
pub const TITLE_MAX_LEN: usize = 100;

/// Leading lines scanned for a title candidate
pub const TITLE_SCAN_LINES: usize = 5;
