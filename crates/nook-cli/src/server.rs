use std::sync::Arc;

use nook_core::{
    Document, NewNote, NoteFilter, detect_note_intent, extract_tasks_with, extract_user_facts,
};
use nook_store::Library;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Characters of note content echoed back in listings.
const PREVIEW_LEN: usize = 160;

#[derive(Clone)]
pub struct NookServer {
    state: Arc<Mutex<ServerState>>,
    tool_router: ToolRouter<Self>,
}

struct ServerState {
    library: Library,
    default_user: String,
}

impl NookServer {
    pub fn new(library: Library, default_user: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState {
                library,
                default_user: default_user.to_string(),
            })),
            tool_router: Self::tool_router(),
        }
    }

    fn user_or_default(state: &ServerState, user: Option<String>) -> String {
        user.filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| state.default_user.clone())
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_LEN).collect();
    format!("{}…", cut.trim_end())
}

fn json_result(value: &serde_json::Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )])
}

fn require_text(text: &str, field: &str) -> Result<(), McpError> {
    if text.trim().is_empty() {
        return Err(McpError::invalid_params(format!("{field} must not be empty"), None));
    }
    Ok(())
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct AnnotateRequest {
    /// Free text to analyse
    text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SaveNoteRequest {
    /// Note body
    content: String,
    /// Optional title; generated from the content when omitted
    title: Option<String>,
    /// Optional notebook name
    notebook: Option<String>,
    /// Extra tags, with or without a leading '#'
    tags: Option<Vec<String>>,
    /// Owner of the note; defaults to the server's user
    user: Option<String>,
    /// Also store list-style tasks found in the content
    save_tasks: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RelatedRequest {
    /// Text to compare stored notes against
    text: String,
    /// Note id to leave out of the results, usually the note being viewed
    exclude_id: Option<String>,
    /// Only consider this user's notes; defaults to the server's user
    user: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListNotesRequest {
    /// Owner to list; defaults to the server's user
    user: Option<String>,
    notebook: Option<String>,
    /// Tag to filter by, with or without a leading '#'
    tag: Option<String>,
    /// Maximum number of notes (default 20)
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExtractTasksRequest {
    /// Text containing bullet, numbered, TODO: or Task: lines
    text: String,
    /// Persist the extracted tasks
    save: Option<bool>,
    user: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct IntentRequest {
    /// A chat message
    text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RememberRequest {
    key: String,
    value: String,
    user: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RecallRequest {
    user: Option<String>,
    /// Maximum number of entries, most recent first
    limit: Option<usize>,
}

#[tool_router]
impl NookServer {
    #[tool(
        description = "Analyse text without storing it. Returns tags, action items, key points, an extractive summary, a suggested title and the word count."
    )]
    async fn nook_annotate(
        &self,
        Parameters(req): Parameters<AnnotateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let doc = Document::new(&req.text);
        let annotations = state.library.annotate(&doc);
        let json = serde_json::to_value(&annotations)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(json_result(&json))
    }

    #[tool(
        description = "Save a note. Tags found in the content are added automatically. Returns the new note id, its title and tags, and any stored tasks."
    )]
    async fn nook_save_note(
        &self,
        Parameters(req): Parameters<SaveNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        require_text(&req.content, "content")?;
        let state = self.state.lock().await;
        let user = Self::user_or_default(&state, req.user);

        let note = NewNote::new(req.title.as_deref().unwrap_or(""), &req.content)
            .notebook(req.notebook.as_deref().unwrap_or(""))
            .user(&user)
            .tags(req.tags.unwrap_or_default());
        let id = state
            .library
            .save_note(note)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let saved = state
            .library
            .store()
            .get_note(&id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .ok_or_else(|| McpError::internal_error("note vanished after save", None))?;

        let tasks = if req.save_tasks.unwrap_or(false) {
            match state.library.save_tasks(&user, &req.content, Some(&id)) {
                Ok(tasks) => tasks,
                Err(e) => {
                    tracing::error!("failed to persist tasks for note {id}: {e}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let result = serde_json::json!({
            "id": saved.id,
            "title": saved.title,
            "tags": saved.tags,
            "tasks": tasks,
        });
        Ok(json_result(&result))
    }

    #[tool(
        description = "Find up to three stored notes that share vocabulary with the given text, best match first."
    )]
    async fn nook_related(
        &self,
        Parameters(req): Parameters<RelatedRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let user = Self::user_or_default(&state, req.user);
        let matches = state
            .library
            .related(&req.text, req.exclude_id.as_deref(), Some(&user))
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let results: Vec<serde_json::Value> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.document.id,
                    "score": m.score,
                    "preview": preview(&m.document.text),
                })
            })
            .collect();
        Ok(json_result(&serde_json::json!({ "matches": results })))
    }

    #[tool(description = "List stored notes, newest first, optionally filtered by notebook or tag.")]
    async fn nook_list_notes(
        &self,
        Parameters(req): Parameters<ListNotesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let user = Self::user_or_default(&state, req.user);
        let filter = NoteFilter {
            user_id: Some(user),
            notebook: req.notebook,
            tag: req.tag,
            limit: Some(req.limit.unwrap_or(20)),
        };
        let notes = state
            .library
            .store()
            .list_notes(&filter)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let results: Vec<serde_json::Value> = notes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "id": n.id,
                    "title": n.title,
                    "notebook": n.notebook,
                    "tags": n.tags,
                    "created_at": n.created_at,
                    "preview": preview(&n.content),
                })
            })
            .collect();
        Ok(json_result(&serde_json::json!({ "notes": results })))
    }

    #[tool(
        description = "Pull bullet, numbered, TODO: and Task: lines out of text as tasks. With save=true they are stored for the user."
    )]
    async fn nook_extract_tasks(
        &self,
        Parameters(req): Parameters<ExtractTasksRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;

        if req.save.unwrap_or(false) {
            let user = Self::user_or_default(&state, req.user);
            let tasks = state
                .library
                .save_tasks(&user, &req.text, None)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            return Ok(json_result(&serde_json::json!({
                "saved": true,
                "tasks": tasks,
            })));
        }

        let tasks = extract_tasks_with(&req.text, &state.library.settings().extract);
        Ok(json_result(&serde_json::json!({
            "saved": false,
            "tasks": tasks,
        })))
    }

    #[tool(
        description = "Score whether a chat message asks to be saved as a note, and list any personal facts it states."
    )]
    async fn nook_intent(
        &self,
        Parameters(req): Parameters<IntentRequest>,
    ) -> Result<CallToolResult, McpError> {
        let intent = detect_note_intent(&req.text);
        let facts = extract_user_facts(&req.text);
        let result = serde_json::json!({
            "command": intent.command,
            "indicators": intent.indicators,
            "score": intent.score,
            "confidence": intent.confidence,
            "auto_note": intent.auto_note,
            "offer_save": intent.should_offer_save(),
            "facts": facts,
        });
        Ok(json_result(&result))
    }

    #[tool(description = "Store a key/value fact about the user. Replaces any earlier value for the key.")]
    async fn nook_remember(
        &self,
        Parameters(req): Parameters<RememberRequest>,
    ) -> Result<CallToolResult, McpError> {
        require_text(&req.key, "key")?;
        let state = self.state.lock().await;
        let user = Self::user_or_default(&state, req.user);
        let evicted = state
            .library
            .remember(&user, &req.key, &req.value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(json_result(&serde_json::json!({
            "stored": true,
            "evicted": evicted,
        })))
    }

    #[tool(description = "Recall stored facts about the user, most recently updated first.")]
    async fn nook_recall(
        &self,
        Parameters(req): Parameters<RecallRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let user = Self::user_or_default(&state, req.user);
        let memories = state
            .library
            .store()
            .recall(&user, req.limit)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(json_result(&serde_json::json!({ "memories": memories })))
    }

    #[tool(description = "Counts of notes, tags, tasks, memories and users in the library.")]
    async fn nook_stats(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let stats = state
            .library
            .store()
            .stats()
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let json = serde_json::to_value(stats)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(json_result(&json))
    }
}

#[tool_handler]
impl ServerHandler for NookServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Note taking and extraction for conversations.\n\n\
                 - Call nook_intent on user messages that look like they want something kept. \
                   When offer_save is true, offer to save; when auto_note is true, save with nook_save_note.\n\
                 - nook_annotate analyses text without storing anything.\n\
                 - After saving, nook_related surfaces earlier notes on the same topic.\n\
                 - Use nook_remember for stable facts about the user and nook_recall to read them back."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
