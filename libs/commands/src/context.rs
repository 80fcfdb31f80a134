//! Session context commands: `/showcontext`, `/context-backup`,
//! `/context-load`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use wingman_registry::{
    CommandHandler, CommandResult, CompletionProvider, HostContext,
};
use wingman_shared::data_dir::DataDir;
use wingman_shared::models::chat::{ChatMessage, MessageRole};
use wingman_shared::models::context::ContextSnapshot;
use wingman_shared::utils::format_count;

use crate::CommandSpec;
use crate::git::{is_git_repo, run_git};

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Wingman Chat Context - {timestamp}</title>
<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif; line-height: 1.6; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; color: #333; }
.container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1); }
.header { border-bottom: 2px solid #eee; margin-bottom: 20px; padding-bottom: 10px; }
.section { margin-bottom: 30px; }
.file-content { background: #f8f8f8; padding: 15px; border-radius: 5px; overflow-x: auto; font-family: "Consolas", "Monaco", monospace; }
.chat-message { margin: 10px 0; padding: 10px; border-radius: 5px; }
.user-message { background: #e3f2fd; border-left: 4px solid #2196f3; }
.assistant-message { background: #f5f5f5; border-left: 4px solid #9e9e9e; }
.system-message { background: #fff3e0; border-left: 4px solid #ff9800; }
pre { margin: 0; padding: 10px; overflow-x: auto; }
.metadata { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; margin-bottom: 20px; }
.metadata-item { background: #fff; padding: 15px; border-radius: 5px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
.file-list { list-style: none; padding: 0; }
.file-list li { padding: 5px 0; }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 10px; }
</style>
</head>
<body>
<div class="container">
{content}
</div>
</body>
</html>
"#;

/// Escape HTML special characters to their entities.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the conversation log as message blocks.
pub(crate) fn format_messages(messages: &[ChatMessage]) -> String {
    let mut html = String::new();
    for msg in messages {
        if msg.content.is_empty() {
            continue;
        }
        let css_class = match msg.role {
            MessageRole::User => "user-message chat-message",
            MessageRole::Assistant => "assistant-message chat-message",
            MessageRole::System => "system-message chat-message",
        };
        html.push_str(&format!("<div class=\"{css_class}\">\n"));
        html.push_str(&format!(
            "<strong>{}</strong>\n",
            escape_html(&msg.role.as_str().to_uppercase())
        ));
        html.push_str(&format!("<pre>{}</pre>\n", escape_html(&msg.content)));
        html.push_str("</div>\n");
    }
    html
}

struct FileDetail {
    name: String,
    size: u64,
    lines: usize,
}

fn chat_file_stats(host: &dyn HostContext) -> (usize, usize, Vec<FileDetail>) {
    let root = host.root();
    let mut total_lines = 0;
    let mut total_chars = 0;
    let mut details = Vec::new();
    for fname in host.chat_files() {
        let path = root.join(&fname);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let lines = content.lines().count();
        total_lines += lines;
        total_chars += content.chars().count();
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        details.push(FileDetail {
            name: fname,
            size,
            lines,
        });
    }
    details.sort_by(|a, b| a.name.cmp(&b.name));
    (total_lines, total_chars, details)
}

fn git_info_html(root: &Path) -> Option<String> {
    if !is_git_repo(root) {
        return None;
    }
    let branch = run_git(root, &["rev-parse", "--abbrev-ref", "HEAD"]).ok()?;
    let head = run_git(
        root,
        &["log", "-1", "--date=iso", "--pretty=format:%h%x09%an%x09%ad"],
    )
    .ok()?;
    let mut fields = head.splitn(3, '\t');
    let (hash, author, date) = (
        fields.next().unwrap_or_default(),
        fields.next().unwrap_or_default(),
        fields.next().unwrap_or_default(),
    );
    let mut html = String::from("<div class=\"metadata-item\">\n<h3>Git Information</h3>\n");
    html.push_str(&format!("<p>Branch: {}</p>\n", escape_html(branch.trim())));
    html.push_str(&format!("<p>Last Commit: {}</p>\n", escape_html(hash)));
    html.push_str(&format!("<p>Author: {}</p>\n", escape_html(author)));
    html.push_str(&format!("<p>Date: {}</p>\n", escape_html(date.trim())));
    html.push_str("</div>\n");
    Some(html)
}

pub(crate) fn render_context_html(host: &dyn HostContext) -> String {
    let now = Local::now();
    let mut content: Vec<String> = Vec::new();

    content.push("<div class=\"header\">".to_string());
    content.push(format!(
        "<h1>Wingman Chat Context - {}</h1>",
        now.format("%Y-%m-%d %H:%M:%S")
    ));
    content.push("</div>".to_string());

    content.push("<div class=\"metadata section\">".to_string());

    content.push("<div class=\"metadata-item\">".to_string());
    content.push("<h3>Model Information</h3>".to_string());
    content.push(format!(
        "<p>Main Model: {}</p>",
        escape_html(&host.model_name())
    ));
    content.push(format!(
        "<p>Edit Format: {}</p>",
        escape_html(&host.edit_format())
    ));
    content.push("</div>".to_string());

    let (total_lines, total_chars, details) = chat_file_stats(host);
    content.push("<div class=\"metadata-item\">".to_string());
    content.push("<h3>Files in Chat</h3>".to_string());
    content.push("<div class=\"stats\">".to_string());
    content.push(format!("<div>Total Files: {}</div>", details.len()));
    content.push(format!(
        "<div>Total Lines: {}</div>",
        format_count(total_lines)
    ));
    content.push(format!(
        "<div>Total Chars: {}</div>",
        format_count(total_chars)
    ));
    content.push("</div>".to_string());
    content.push("<ul class=\"file-list\">".to_string());
    for file in &details {
        let size_kb = file.size as f64 / 1024.0;
        content.push(format!(
            "<li>{} ({:.1}KB, {} lines)</li>",
            escape_html(&file.name),
            size_kb,
            format_count(file.lines)
        ));
    }
    content.push("</ul>".to_string());
    content.push("</div>".to_string());

    if let Some(git_html) = git_info_html(&host.root()) {
        content.push(git_html);
    }

    content.push("</div>".to_string()); // end metadata section

    content.push("<div class=\"section\">".to_string());
    content.push("<h2>Chat History</h2>".to_string());
    content.push(format_messages(&host.messages()));
    content.push("</div>".to_string());

    content.push("<div class=\"section\">".to_string());
    content.push("<h2>File Contents</h2>".to_string());
    let root = host.root();
    let mut files = host.chat_files();
    files.sort();
    for fname in files {
        content.push(format!("<h3>{}</h3>", escape_html(&fname)));
        match std::fs::read_to_string(root.join(&fname)) {
            Ok(file_content) => {
                content.push("<div class=\"file-content\">".to_string());
                content.push(format!("<pre>{}</pre>", escape_html(&file_content)));
                content.push("</div>".to_string());
            }
            Err(err) => {
                content.push(format!(
                    "<p>Error reading file: {}</p>",
                    escape_html(&err.to_string())
                ));
            }
        }
    }
    content.push("</div>".to_string());

    HTML_TEMPLATE
        .replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
        .replace("{content}", &content.join("\n"))
}

const SHOWCONTEXT_DOC: &str = "Save and display the current chat context as HTML
    Usage: /showcontext

    Saves the chat context (files, messages, metadata) as a formatted
    HTML file under the data directory and opens it in the default
    browser.";

struct ShowContext {
    open_in_browser: bool,
}

impl CommandHandler for ShowContext {
    fn doc(&self) -> Option<&str> {
        Some(SHOWCONTEXT_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, _args: &str) -> CommandResult {
        let html = render_context_html(host);

        let export_dir = DataDir::ensure(DataDir::new(&host.root()).context_exports())?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let output_file = export_dir.join(format!("context_{timestamp}.html"));
        std::fs::write(&output_file, html)?;
        host.tool_output(&format!("\nSaved context to {}", output_file.display()));

        if self.open_in_browser {
            match open::that(&output_file) {
                Ok(()) => host.tool_output("Opened in default browser"),
                Err(err) => {
                    host.tool_error(&format!("Error opening browser: {err}"));
                    host.tool_output(&format!(
                        "You can manually open: {}",
                        output_file.display()
                    ));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn showcontext() -> CommandSpec {
    CommandSpec {
        name: "showcontext",
        handler: Arc::new(ShowContext {
            open_in_browser: true,
        }),
        completions: None,
    }
}

const BACKUP_DOC: &str = "Save a backup of the current chat context as JSON
    Usage: /context-backup [filename_prefix]

    Writes the current context (model, files, messages) as a JSON
    snapshot under the data directory. The optional prefix names the
    snapshot file.";

struct ContextBackup;

impl CommandHandler for ContextBackup {
    fn doc(&self) -> Option<&str> {
        Some(BACKUP_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let backup_dir = DataDir::ensure(DataDir::new(&host.root()).context_backups())?;

        let prefix = match args.trim() {
            "" => "wingman_context",
            other => other,
        };
        let timestamp = Local::now().format("%Y-%m-%d_%H_%M_%S");
        let backup_file = backup_dir.join(format!("{prefix}_{timestamp}.json"));

        let snapshot = ContextSnapshot {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            model: host.model_name(),
            files: host.chat_files(),
            messages: host.messages(),
        };

        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                std::fs::write(&backup_file, json)?;
                host.tool_output(&format!(
                    "\nSaved context backup to {}",
                    backup_file.display()
                ));
            }
            Err(err) => {
                host.tool_error(&format!("Error saving context backup: {err}"));
            }
        }
        Ok(())
    }
}

pub(crate) fn context_backup() -> CommandSpec {
    CommandSpec {
        name: "context-backup",
        handler: Arc::new(ContextBackup),
        completions: None,
    }
}

const LOAD_DOC: &str = "Load a chat context from a backup file
    Usage: /context-load [filename]

    Without a filename, lists available snapshots. Otherwise clears the
    current context, re-adds the snapshot's files, and restores its
    messages.";

fn list_snapshots(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut snapshots: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "json"))
        .collect();
    snapshots.sort();
    snapshots
}

struct ContextLoad;

impl CommandHandler for ContextLoad {
    fn doc(&self) -> Option<&str> {
        Some(LOAD_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let backup_dir = DataDir::new(&host.root()).context_backups();

        let filename = args.trim();
        if filename.is_empty() {
            let snapshots = list_snapshots(&backup_dir);
            if snapshots.is_empty() {
                host.tool_error(&format!(
                    "No context files found in {}",
                    backup_dir.display()
                ));
                return Ok(());
            }
            host.tool_output("\nAvailable context files:");
            for path in snapshots {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                let modified = std::fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .map(wingman_shared::utils::format_mtime)
                    .unwrap_or_else(|_| "unknown".to_string());
                host.tool_output(&format!("  {name} (Last modified: {modified})"));
            }
            return Ok(());
        }

        let context_file = backup_dir.join(filename);
        if !context_file.exists() {
            host.tool_error(&format!("Context file not found: {filename}"));
            return Ok(());
        }

        let snapshot: ContextSnapshot = match std::fs::read_to_string(&context_file)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
        {
            Ok(snapshot) => snapshot,
            Err(err) => {
                host.tool_error(&format!("Error loading context: {err}"));
                return Ok(());
            }
        };

        host.clear_chat();

        let root = host.root();
        let mut added = 0;
        for file in &snapshot.files {
            if root.join(file).exists() {
                if host.add_file(file)? {
                    added += 1;
                }
            } else {
                host.tool_warning(&format!("File not found: {file}"));
            }
        }

        let message_count = snapshot.messages.len();
        for message in snapshot.messages {
            host.push_message(message);
        }

        host.tool_output(&format!("\nLoaded context from {}", context_file.display()));
        host.tool_output(&format!("Model: {}", snapshot.model));
        host.tool_output(&format!("Timestamp: {}", snapshot.timestamp));
        host.tool_output(&format!("Added {added} files"));
        host.tool_output(&format!("Added {message_count} messages"));
        Ok(())
    }
}

/// Completes to snapshot file names in the backup directory.
struct SnapshotCompletions;

impl CompletionProvider for SnapshotCompletions {
    fn candidates(&self, host: &dyn HostContext) -> Vec<String> {
        list_snapshots(&DataDir::new(&host.root()).context_backups())
            .into_iter()
            .filter_map(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .collect()
    }
}

pub(crate) fn context_load() -> CommandSpec {
    CommandSpec {
        name: "context-load",
        handler: Arc::new(ContextLoad),
        completions: Some(Arc::new(SnapshotCompletions)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_registry::testing::RecordingHost;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_format_messages_skips_empty_and_escapes() {
        let messages = vec![
            ChatMessage::user("write <main>"),
            ChatMessage::assistant(""),
            ChatMessage::assistant("done"),
        ];
        let html = format_messages(&messages);
        assert!(html.contains("&lt;main&gt;"));
        assert!(html.contains("USER"));
        assert!(html.contains("ASSISTANT"));
        // Empty assistant message dropped: one block per non-empty message
        assert_eq!(html.matches("chat-message").count(), 2);
    }

    #[test]
    fn test_showcontext_writes_html_export() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n").expect("fixture");
        let mut host = RecordingHost::new()
            .with_root(tmp.path())
            .with_files(["main.rs"]);
        host.push_message(ChatMessage::user("hello"));

        ShowContext {
            open_in_browser: false,
        }
        .run(&mut host, "")
        .expect("run");

        let export_dir = DataDir::new(tmp.path()).context_exports();
        let exports = std::fs::read_dir(&export_dir)
            .expect("export dir")
            .flatten()
            .count();
        assert_eq!(exports, 1);
        assert!(host.output_text().contains("Saved context to"));
    }

    #[test]
    fn test_backup_then_load_round_trip() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("kept.rs"), "fn kept() {}\n").expect("fixture");
        let mut host = RecordingHost::new()
            .with_root(tmp.path())
            .with_files(["kept.rs", "deleted.rs"]);
        host.push_message(ChatMessage::user("question"));
        host.push_message(ChatMessage::assistant("answer"));

        ContextBackup.run(&mut host, "trip").expect("backup");
        let backups = list_snapshots(&DataDir::new(tmp.path()).context_backups());
        assert_eq!(backups.len(), 1);
        let name = backups[0]
            .file_name()
            .and_then(|n| n.to_str())
            .expect("name")
            .to_string();
        assert!(name.starts_with("trip_"));

        // Simulate a different session loading the snapshot
        let mut restored = RecordingHost::new().with_root(tmp.path());
        ContextLoad.run(&mut restored, &name).expect("load");
        // deleted.rs no longer exists on disk: warned, not added
        assert_eq!(restored.files, vec!["kept.rs"]);
        assert_eq!(restored.warnings.len(), 1);
        assert!(restored.warnings[0].contains("deleted.rs"));
        assert_eq!(restored.message_log.len(), 2);
        assert!(restored.output_text().contains("Added 1 files"));
    }

    #[test]
    fn test_load_without_args_lists_snapshots() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let backup_dir =
            DataDir::ensure(DataDir::new(tmp.path()).context_backups()).expect("ensure");
        std::fs::write(backup_dir.join("one.json"), "{}").expect("fixture");

        let mut host = RecordingHost::new().with_root(tmp.path());
        ContextLoad.run(&mut host, "").expect("run");
        assert!(host.output_text().contains("one.json"));
    }

    #[test]
    fn test_load_rejects_invalid_snapshot() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let backup_dir =
            DataDir::ensure(DataDir::new(tmp.path()).context_backups()).expect("ensure");
        std::fs::write(backup_dir.join("bad.json"), "{\"nope\": true}").expect("fixture");

        let mut host = RecordingHost::new().with_root(tmp.path());
        ContextLoad.run(&mut host, "bad.json").expect("run");
        assert!(host.error_text().contains("Error loading context"));
    }

    #[test]
    fn test_snapshot_completions_list_file_names() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let backup_dir =
            DataDir::ensure(DataDir::new(tmp.path()).context_backups()).expect("ensure");
        std::fs::write(backup_dir.join("snap.json"), "{}").expect("fixture");
        std::fs::write(backup_dir.join("notes.txt"), "x").expect("fixture");

        let host = RecordingHost::new().with_root(tmp.path());
        assert_eq!(
            SnapshotCompletions.candidates(&host),
            vec!["snap.json".to_string()]
        );
    }
}
