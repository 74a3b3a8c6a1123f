//! CLI command integration tests.
//! Each test uses a temp directory via NOOK_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STANDUP: &str = "Daily standup #meeting\n\
You should pin the database image before Friday. \
It is critical that the nightly build stays green.\n\
- rerun the flaky suite\n\
TODO: write the incident summary\n";

fn nook_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("nook").unwrap();
    cmd.env("NOOK_DATA_DIR", data_dir.path());
    cmd
}

/// Save a note from stdin and return its id.
fn add_note(dir: &TempDir, user: &str, content: &str) -> String {
    let output = nook_cmd(dir)
        .args(["note", "add", "--user", user])
        .write_stdin(content)
        .output()
        .unwrap();
    assert!(output.status.success(), "note add failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .and_then(|l| l.strip_prefix("saved "))
        .unwrap_or_else(|| panic!("no id in output:\n{stdout}"))
        .trim()
        .to_string()
}

fn extract_stat_value(output: &str, prefix: &str) -> String {
    output
        .lines()
        .find(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("stat line '{prefix}' not found in output:\n{output}"))
        .split_whitespace()
        .nth(1)
        .unwrap()
        .to_string()
}

#[test]
fn stats_fresh_db() {
    let dir = TempDir::new().unwrap();
    nook_cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes:      0"))
        .stdout(predicate::str::contains("tasks:      0 (0 pending)"))
        .stdout(predicate::str::contains("memories:   0"));
    assert!(dir.path().join("notes.db").exists());
}

#[test]
fn extract_from_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("standup.txt");
    std::fs::write(&input, STANDUP).unwrap();

    nook_cmd(&dir)
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("title:      Daily standup meeting"))
        .stdout(predicate::str::contains("#meeting"))
        .stdout(predicate::str::contains("- Pin the database image before friday"))
        .stdout(predicate::str::contains("- Write the incident summary"));
}

#[test]
fn extract_plain_text_reports_nothing_found() {
    let dir = TempDir::new().unwrap();
    nook_cmd(&dir)
        .args(["extract", "-"])
        .write_stdin("Lunch was fine today")
        .assert()
        .success()
        .stdout(predicate::str::contains("words:      4"))
        .stdout(predicate::str::contains("no tags, action items or key points found"))
        .stdout(predicate::str::contains("action items:").not());
}

#[test]
fn extract_json_from_stdin() {
    let dir = TempDir::new().unwrap();
    let output = nook_cmd(&dir)
        .args(["extract", "--json", "-"])
        .write_stdin("This is #important for the #project meeting")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["tags"],
        serde_json::json!(["#important", "#meeting", "#project"])
    );
    assert_eq!(json["word_count"], 7);
}

#[test]
fn summarize_short_text_unchanged() {
    let dir = TempDir::new().unwrap();
    nook_cmd(&dir)
        .arg("summarize")
        .write_stdin("One sentence. Two sentences.")
        .assert()
        .success()
        .stdout("One sentence. Two sentences.\n");
}

#[test]
fn summarize_rejects_zero_sentences() {
    let dir = TempDir::new().unwrap();
    nook_cmd(&dir)
        .args(["summarize", "--sentences", "0"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn intent_reports_indicators() {
    let dir = TempDir::new().unwrap();
    nook_cmd(&dir)
        .args(["intent", "/note remember the key point about my name is Sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("command:    true"))
        .stdout(predicate::str::contains("auto_note:  true"))
        .stdout(predicate::str::contains("fact:       name = Sam"));
}

#[test]
fn note_add_show_list_rm() {
    let dir = TempDir::new().unwrap();
    let id = add_note(&dir, "alice", STANDUP);

    nook_cmd(&dir)
        .args(["note", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("title:    Daily standup meeting"))
        .stdout(predicate::str::contains("#meeting #todo"));

    nook_cmd(&dir)
        .args(["note", "list", "--user", "alice", "--tag", "meeting"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    // Other users do not see it.
    nook_cmd(&dir)
        .args(["note", "list", "--user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no notes)"));

    nook_cmd(&dir)
        .args(["note", "rm", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    nook_cmd(&dir)
        .args(["note", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no note with id"));
}

#[test]
fn note_add_with_title_and_tags() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("garden.md");
    std::fs::write(&input, "Tomatoes need full sun.").unwrap();

    nook_cmd(&dir)
        .args(["note", "add", "--title", "Garden", "--tag", "outdoors", "--notebook", "home"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("title: Garden"))
        .stdout(predicate::str::contains("tags:  #outdoors"));

    nook_cmd(&dir)
        .args(["note", "list", "--notebook", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Garden"));
}

#[test]
fn note_export_formats() {
    let dir = TempDir::new().unwrap();
    let id = add_note(&dir, "default", "Line one\nSay \"hi\"");

    nook_cmd(&dir)
        .args(["note", "export", &id])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Line one"))
        .stdout(predicate::str::contains("*Exported from nook*"));

    nook_cmd(&dir)
        .args(["note", "export", &id, "--format", "csv"])
        .assert()
        .success()
        .stdout("Line Number,Content\n1,\"Line one\"\n2,\"Say \"\"hi\"\"\"\n");

    let out = dir.path().join("note.json");
    nook_cmd(&dir)
        .args(["note", "export", &id, "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["source"], "nook");
    assert_eq!(json["title"], "Line one");
}

#[test]
fn note_export_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    nook_cmd(&dir)
        .args(["note", "export", "some-id", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown export format"));
}

#[test]
fn related_notes() {
    let dir = TempDir::new().unwrap();
    let first = add_note(&dir, "default", "tokio runtime shutdown ordering");
    let second = add_note(&dir, "default", "ordering of tokio runtime shutdown hooks");
    add_note(&dir, "default", "sourdough starter feeding schedule");

    let output = nook_cmd(&dir)
        .args(["related", "tokio runtime shutdown ordering", "--exclude", &first])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.contains(&second));

    nook_cmd(&dir)
        .args(["related", "completely unrelated words"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no related notes)"));
}

#[test]
fn tasks_extract_save_list_done() {
    let dir = TempDir::new().unwrap();

    nook_cmd(&dir)
        .args(["tasks", "extract"])
        .write_stdin(STANDUP)
        .assert()
        .success()
        .stdout("- rerun the flaky suite\n- write the incident summary\n");

    nook_cmd(&dir)
        .args(["tasks", "extract", "--save"])
        .write_stdin(STANDUP)
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] rerun the flaky suite"))
        .stdout(predicate::str::contains("[2] write the incident summary"));

    nook_cmd(&dir)
        .args(["tasks", "done", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed task 1"));

    nook_cmd(&dir)
        .args(["tasks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] 1  rerun the flaky suite"))
        .stdout(predicate::str::contains("[ ] 2  write the incident summary"));

    nook_cmd(&dir)
        .args(["tasks", "list", "--pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rerun").not());

    nook_cmd(&dir)
        .args(["tasks", "done", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no task with id 42"));
}

#[test]
fn remember_recall_learn() {
    let dir = TempDir::new().unwrap();

    nook_cmd(&dir)
        .args(["remember", "editor", "helix", "--user", "sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remembered editor"));

    nook_cmd(&dir)
        .args(["learn", "hello, my name is Sam!", "--user", "sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("learned name = Sam"));

    nook_cmd(&dir)
        .args(["recall", "--user", "sam"])
        .assert()
        .success()
        .stdout("name: Sam\neditor: helix\n");

    nook_cmd(&dir)
        .args(["recall", "--user", "sam", "--limit", "1"])
        .assert()
        .success()
        .stdout("name: Sam\n");

    nook_cmd(&dir)
        .arg("recall")
        .assert()
        .success()
        .stdout(predicate::str::contains("(nothing remembered)"));
}

#[test]
fn memory_cap_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[memory]\nmax_memories = 1\n").unwrap();

    nook_cmd(&dir).args(["remember", "a", "1"]).assert().success();
    nook_cmd(&dir)
        .args(["remember", "b", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(evicted 1 oldest)"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[extract]\nmax_tasks = 0\n").unwrap();

    nook_cmd(&dir)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_tasks"));
}

#[test]
fn export_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    add_note(&dir, "default", STANDUP);
    add_note(&dir, "default", "Second note about #idea sketches");
    nook_cmd(&dir)
        .args(["tasks", "extract", "--save"])
        .write_stdin(STANDUP)
        .assert()
        .success();
    nook_cmd(&dir).args(["remember", "tz", "UTC"]).assert().success();

    let stats_a = nook_cmd(&dir).arg("stats").output().unwrap();
    let stats_a = String::from_utf8_lossy(&stats_a.stdout).to_string();

    let export_path = dir.path().join("library.json");
    nook_cmd(&dir)
        .arg("export")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "exported 2 notes, 2 tasks, 1 memories",
        ));
    assert!(export_path.exists(), "export file should exist");

    // Import into a fresh data dir.
    let other = TempDir::new().unwrap();
    nook_cmd(&other)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported from"));

    let stats_b = nook_cmd(&other).arg("stats").output().unwrap();
    let stats_b = String::from_utf8_lossy(&stats_b.stdout).to_string();

    for key in ["notes:", "tags:", "tasks:", "memories:", "users:"] {
        assert_eq!(
            extract_stat_value(&stats_a, key),
            extract_stat_value(&stats_b, key),
            "{key} should match after import"
        );
    }
}

#[test]
fn import_invalid_file_fails() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "not json").unwrap();

    nook_cmd(&dir)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import JSON"));
}
