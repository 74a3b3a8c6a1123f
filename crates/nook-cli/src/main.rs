mod server;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nook_core::{
    Document, ExportFormat, NewNote, NoteFilter, detect_note_intent, extract_tasks_with,
    extract_user_facts, now_unix_secs, render_export, summarize_with,
};
use nook_store::{Library, Settings};
use rmcp::{ServiceExt, transport::stdio};

const DATA_DIR_ENV: &str = "NOOK_DATA_DIR";
const PIDFILE_NAME: &str = "nook-serve.pid";

#[derive(Parser)]
#[command(name = "nook", about = "Note, task and summary extraction with a local note library")]
struct Cli {
    /// User whose notes, tasks and memories are used
    #[arg(long, global = true, default_value = "default")]
    user: String,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Show tags, action items, key points, summary and title for text
    Extract {
        /// Input file, or '-' / omitted for stdin
        file: Option<PathBuf>,

        /// Print the annotations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extractive summary of text
    Summarize {
        /// Input file, or '-' / omitted for stdin
        file: Option<PathBuf>,

        /// Maximum number of sentences
        #[arg(long)]
        sentences: Option<usize>,
    },

    /// Score whether a message asks to be saved as a note
    Intent {
        text: String,
    },

    /// Manage stored notes
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },

    /// Stored notes most similar to the given text
    Related {
        text: String,

        /// Note id to leave out
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Extract and track tasks
    Tasks {
        #[command(subcommand)]
        action: TasksCommand,
    },

    /// Store a fact about the user
    Remember {
        key: String,
        value: String,
    },

    /// List remembered facts, most recent first
    Recall {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Remember facts stated in text, such as "my name is ..."
    Learn {
        text: String,
    },

    /// Show library statistics
    Stats,

    /// Export the whole library to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Replace the library with the contents of a JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Save a note; tags are extracted from the content
    Add {
        /// Input file, or '-' / omitted for stdin
        file: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        notebook: Option<String>,

        /// Extra tag, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Print one note
    Show {
        id: String,
    },

    /// List notes, newest first
    List {
        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        notebook: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Render one note as markdown, text, json or csv
    Export {
        id: String,

        #[arg(long, default_value = "markdown")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Delete a note
    Rm {
        id: String,
    },
}

#[derive(Subcommand)]
enum TasksCommand {
    /// Find bullet, numbered, TODO: and Task: lines
    Extract {
        /// Input file, or '-' / omitted for stdin
        file: Option<PathBuf>,

        /// Store the extracted tasks
        #[arg(long)]
        save: bool,
    },

    /// List stored tasks
    List {
        /// Only tasks not yet done
        #[arg(long)]
        pending: bool,
    },

    /// Mark a task as done
    Done {
        id: i64,
    },
}

fn data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(nook_store::default_base_dir)
}

fn open_library() -> Result<Library> {
    Library::open(Some(&data_dir())).context("failed to open note library")
}

/// Settings alone, for commands that never touch the database.
fn load_settings() -> Result<Settings> {
    Settings::load(&data_dir()).context("failed to load settings")
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve => cmd_serve(&cli).await,
        Commands::Extract { file, json } => cmd_extract(file.as_deref(), *json),
        Commands::Summarize { file, sentences } => cmd_summarize(file.as_deref(), *sentences),
        Commands::Intent { text } => cmd_intent(text),
        Commands::Note { action } => cmd_note(&cli, action),
        Commands::Related { text, exclude } => cmd_related(&cli, text, exclude.as_deref()),
        Commands::Tasks { action } => cmd_tasks(&cli, action),
        Commands::Remember { key, value } => cmd_remember(&cli, key, value),
        Commands::Recall { limit } => cmd_recall(&cli, *limit),
        Commands::Learn { text } => cmd_learn(&cli, text),
        Commands::Stats => cmd_stats(),
        Commands::Export { path } => cmd_export(path),
        Commands::Import { path } => cmd_import(path),
    }
}

// ---------------------------------------------------------------------------
// Advisory pidfile for observability
// ---------------------------------------------------------------------------

fn pidfile_path() -> PathBuf {
    data_dir().join(PIDFILE_NAME)
}

/// Check for an existing pidfile and log accordingly, then write our own.
fn acquire_pidfile() -> Option<PathBuf> {
    let path = pidfile_path();
    if let Ok(content) = std::fs::read_to_string(&path)
        && let Ok(pid) = content.trim().parse::<u32>()
    {
        if is_process_alive(pid) {
            tracing::warn!("another nook serve (PID {pid}) is running, sharing the database");
        } else {
            tracing::info!("cleaned up stale pidfile (PID {pid} is dead)");
            let _ = std::fs::remove_file(&path);
        }
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::File::create(&path) {
        Ok(mut f) => {
            let _ = write!(f, "{}", std::process::id());
            tracing::info!("wrote pidfile: {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("failed to write pidfile: {e}");
            None
        }
    }
}

fn release_pidfile(path: &Path) {
    let _ = std::fs::remove_file(path);
    tracing::info!("removed pidfile: {}", path.display());
}

#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    // kill(pid, 0) checks existence without sending a signal
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    false
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

/// Why the server loop ended.
#[derive(Debug, PartialEq, Eq)]
enum Stopped {
    Disconnected,
    Signal,
}

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let library = open_library()?;
    tracing::info!("starting MCP server for user '{}'", cli.user);

    let pidfile = acquire_pidfile();
    let result = run_server(library, &cli.user).await;

    if let Some(path) = pidfile {
        release_pidfile(&path);
    }
    if matches!(result, Ok(Stopped::Signal)) {
        // The stdin reader blocks on a thread the runtime would wait for on drop.
        std::process::exit(0);
    }
    result.map(|_| ())
}

async fn run_server(library: Library, user: &str) -> Result<Stopped> {
    let server = server::NookServer::new(library, user);

    let service = tokio::select! {
        started = server.serve(stdio()) => match started {
            Ok(service) => service,
            Err(e) => {
                // stdin closed before the client finished initializing
                tracing::info!("MCP client went away during initialization: {e}");
                return Ok(Stopped::Disconnected);
            }
        },
        () = shutdown_signal() => return Ok(Stopped::Signal),
    };

    let cancel = service.cancellation_token();
    tokio::select! {
        reason = service.waiting() => {
            let reason = reason.context("MCP server task failed")?;
            tracing::info!("MCP server stopped: {reason:?}");
            Ok(Stopped::Disconnected)
        }
        () = shutdown_signal() => {
            cancel.cancel();
            Ok(Stopped::Signal)
        }
    }
}

fn cmd_extract(file: Option<&Path>, json: bool) -> Result<()> {
    let settings = load_settings()?;
    let text = read_input(file)?;
    let annotations = nook_core::annotate_with(&Document::new(&text), &settings.extract);

    if json {
        let out = serde_json::to_string_pretty(&annotations)
            .context("failed to serialize annotations")?;
        println!("{out}");
        return Ok(());
    }

    println!("title:      {}", annotations.title);
    println!("words:      {}", annotations.word_count);
    if annotations.is_bare() {
        println!("no tags, action items or key points found");
    } else {
        println!("tags:       {}", annotations.tags.join(" "));
        print_list("action items:", &annotations.action_items);
        print_list("key points:", &annotations.key_points);
    }
    println!("summary:");
    println!("  {}", annotations.summary);
    Ok(())
}

fn print_list(heading: &str, items: &[String]) {
    println!("{heading}");
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  - {item}");
    }
}

fn cmd_summarize(file: Option<&Path>, sentences: Option<usize>) -> Result<()> {
    let mut settings = load_settings()?;
    if let Some(n) = sentences {
        anyhow::ensure!(n > 0, "--sentences must be at least 1");
        settings.extract.summary_sentences = n;
    }
    let text = read_input(file)?;
    println!("{}", summarize_with(&text, &settings.extract));
    Ok(())
}

fn cmd_intent(text: &str) -> Result<()> {
    let intent = detect_note_intent(text);
    println!("command:    {}", intent.command);
    println!("indicators: {}", intent.indicators.join(", "));
    println!("score:      {}", intent.score);
    println!("confidence: {:.2}", intent.confidence);
    println!("auto_note:  {}", intent.auto_note);
    println!("offer_save: {}", intent.should_offer_save());
    for fact in extract_user_facts(text) {
        println!("fact:       {} = {}", fact.key, fact.value);
    }
    Ok(())
}

fn cmd_note(cli: &Cli, action: &NoteCommand) -> Result<()> {
    let library = open_library()?;
    let store = library.store();

    match action {
        NoteCommand::Add {
            file,
            title,
            notebook,
            tags,
        } => {
            let content = read_input(file.as_deref())?;
            anyhow::ensure!(!content.trim().is_empty(), "note content is empty");
            let note = NewNote::new(title.as_deref().unwrap_or(""), &content)
                .notebook(notebook.as_deref().unwrap_or(""))
                .user(&cli.user)
                .tags(tags.iter().cloned());
            let id = library.save_note(note).context("failed to save note")?;
            let saved = store
                .get_note(&id)
                .context("failed to load saved note")?
                .context("saved note not found")?;
            println!("saved {id}");
            println!("title: {}", saved.title);
            if !saved.tags.is_empty() {
                println!("tags:  {}", saved.tags.join(" "));
            }
        }
        NoteCommand::Show { id } => {
            let note = store
                .get_note(id)
                .context("failed to load note")?
                .with_context(|| format!("no note with id {id}"))?;
            println!("id:       {}", note.id);
            println!("title:    {}", note.title);
            if !note.notebook.is_empty() {
                println!("notebook: {}", note.notebook);
            }
            println!("tags:     {}", note.tags.join(" "));
            println!("created:  {}", note.created_at);
            println!();
            println!("{}", note.content);
        }
        NoteCommand::List {
            tag,
            notebook,
            limit,
        } => {
            let filter = NoteFilter {
                user_id: Some(cli.user.clone()),
                notebook: notebook.clone(),
                tag: tag.clone(),
                limit: Some(*limit),
            };
            let notes = store.list_notes(&filter).context("failed to list notes")?;
            if notes.is_empty() {
                println!("(no notes)");
            }
            for note in notes {
                println!(
                    "{}  {}  {}  {}",
                    note.id,
                    note.created_at,
                    note.title,
                    note.tags.join(" ")
                );
            }
        }
        NoteCommand::Export { id, format, output } => {
            let note = store
                .get_note(id)
                .context("failed to load note")?
                .with_context(|| format!("no note with id {id}"))?;
            let rendered = render_export(&note.title, &note.content, *format, now_unix_secs())
                .context("failed to render note")?;
            match output {
                Some(path) => {
                    std::fs::write(path, &rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported {id} as {format} to {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        NoteCommand::Rm { id } => {
            let removed = store.delete_note(id).context("failed to delete note")?;
            anyhow::ensure!(removed, "no note with id {id}");
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn cmd_related(cli: &Cli, text: &str, exclude: Option<&str>) -> Result<()> {
    let library = open_library()?;
    let matches = library
        .related(text, exclude, Some(&cli.user))
        .context("failed to rank notes")?;

    if matches.is_empty() {
        println!("(no related notes)");
    }
    for m in matches {
        let first_line = m.document.text.lines().next().unwrap_or("");
        println!("{:.2}  {}  {}", m.score, m.document.id, first_line);
    }
    Ok(())
}

fn cmd_tasks(cli: &Cli, action: &TasksCommand) -> Result<()> {
    match action {
        TasksCommand::Extract { file, save } => {
            let text = read_input(file.as_deref())?;
            if *save {
                let library = open_library()?;
                let tasks = library
                    .save_tasks(&cli.user, &text, None)
                    .context("failed to save tasks")?;
                if tasks.is_empty() {
                    println!("(no tasks found)");
                }
                for task in tasks {
                    println!("[{}] {}", task.id, task.task);
                }
            } else {
                let settings = load_settings()?;
                let tasks = extract_tasks_with(&text, &settings.extract);
                if tasks.is_empty() {
                    println!("(no tasks found)");
                }
                for task in tasks {
                    println!("- {task}");
                }
            }
        }
        TasksCommand::List { pending } => {
            let library = open_library()?;
            let tasks = library
                .store()
                .list_tasks(&cli.user, *pending)
                .context("failed to list tasks")?;
            if tasks.is_empty() {
                println!("(no tasks)");
            }
            for task in tasks {
                let mark = if task.completed { "x" } else { " " };
                println!("[{mark}] {}  {}", task.id, task.task);
            }
        }
        TasksCommand::Done { id } => {
            let library = open_library()?;
            library
                .store()
                .complete_task(*id)
                .with_context(|| format!("failed to complete task {id}"))?;
            println!("completed task {id}");
        }
    }
    Ok(())
}

fn cmd_remember(cli: &Cli, key: &str, value: &str) -> Result<()> {
    let library = open_library()?;
    let evicted = library
        .remember(&cli.user, key, value)
        .context("failed to store memory")?;
    println!("remembered {key}");
    if evicted > 0 {
        println!("(evicted {evicted} oldest)");
    }
    Ok(())
}

fn cmd_recall(cli: &Cli, limit: Option<usize>) -> Result<()> {
    let library = open_library()?;
    let memories = library
        .store()
        .recall(&cli.user, limit)
        .context("failed to recall memories")?;
    if memories.is_empty() {
        println!("(nothing remembered)");
    }
    for m in memories {
        println!("{}: {}", m.key, m.value);
    }
    Ok(())
}

fn cmd_learn(cli: &Cli, text: &str) -> Result<()> {
    let library = open_library()?;
    let facts = library
        .learn(&cli.user, text)
        .context("failed to learn from text")?;
    if facts.is_empty() {
        println!("(no facts found)");
        return Ok(());
    }
    for fact in &facts {
        println!("learned {} = {}", fact.key, fact.value);
    }
    if !library.settings().memory.enabled {
        println!("(memory disabled, not stored)");
    }
    Ok(())
}

fn cmd_stats() -> Result<()> {
    let library = open_library()?;
    let stats = library.store().stats().context("failed to read stats")?;

    println!("notes:      {}", stats.notes);
    println!("tags:       {}", stats.tags);
    println!("tasks:      {} ({} pending)", stats.tasks, stats.pending_tasks);
    println!("memories:   {}", stats.memories);
    println!("users:      {}", stats.users);
    if let Some(dir) = library.data_dir() {
        println!("data_dir:   {}", dir.display());
    }
    Ok(())
}

fn cmd_export(path: &Path) -> Result<()> {
    let library = open_library()?;
    let archive = library
        .store()
        .load_archive()
        .context("failed to read library")?;
    let json = nook_core::export_json(&archive).context("failed to serialize library")?;
    std::fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "exported {} notes, {} tasks, {} memories to {}",
        archive.notes.len(),
        archive.tasks.len(),
        archive.memories.len(),
        path.display()
    );
    Ok(())
}

fn cmd_import(path: &Path) -> Result<()> {
    let library = open_library()?;
    library
        .store()
        .import_json_file(path)
        .context("failed to import JSON")?;

    let stats = library
        .store()
        .stats()
        .context("failed to read stats after import")?;
    println!(
        "imported from {}. notes={}, tasks={}, memories={}",
        path.display(),
        stats.notes,
        stats.tasks,
        stats.memories
    );
    Ok(())
}
