//! `/clip-edit`: apply clipboard contents as edits to a file.

use std::sync::Arc;

use wingman_registry::{
    CommandHandler, CommandResult, CompletionProvider, HostContext, HostError,
};

use crate::CommandSpec;

const CLIP_EDIT_DOC: &str = "Apply clipboard contents as edits to a file
    Usage: /clip-edit <filename>

    Takes code edits copied to the clipboard (from a chat assistant) and
    applies them to the given file through the host's edit engine. The
    clipboard should contain changes in a supported format (diff, whole
    file, etc).";

/// The clipboard-independent part of the flow, separated so tests can
/// drive it with fixed content.
pub(crate) fn apply_clipboard_edits(
    host: &mut dyn HostContext,
    target: &str,
    content: &str,
) -> CommandResult {
    if !host.chat_files().iter().any(|f| f == target) {
        if !host.add_file(target)? {
            return Ok(());
        }
        if !host.chat_files().iter().any(|f| f == target) {
            // Add failed; the host already reported why
            return Ok(());
        }
    }

    match host.apply_edits(content) {
        Ok(edited) if !edited.is_empty() => {
            let listing = edited.join(", ");
            host.tool_output(&format!("Applied clipboard edits to {listing}"));
            if host.auto_commit_enabled() {
                let message = format!("Applied clipboard edits to {listing}");
                if let Err(err) = host.commit(&edited, &message) {
                    host.tool_error(&format!("Commit failed: {err}"));
                }
            }
            Ok(())
        }
        Ok(_) => {
            host.tool_error(
                "No edits were applied. Check that the clipboard contains valid code changes.",
            );
            Ok(())
        }
        Err(HostError::Edit(reason)) => {
            host.tool_error(&format!("Error applying edits: {reason}"));
            host.tool_output(
                "Make sure the clipboard contains code changes in a supported format \
                 (diff, whole file, etc)",
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

struct ClipEdit;

impl CommandHandler for ClipEdit {
    fn doc(&self) -> Option<&str> {
        Some(CLIP_EDIT_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let target = args.trim();
        if target.is_empty() {
            host.tool_error("Please specify a file to edit");
            return Ok(());
        }

        let content = match arboard::Clipboard::new().and_then(|mut cb| cb.get_text()) {
            Ok(content) => content,
            Err(err) => {
                host.tool_error(&format!("Error accessing clipboard: {err}"));
                return Ok(());
            }
        };
        if content.trim().is_empty() {
            host.tool_error("No content found in clipboard");
            return Ok(());
        }

        apply_clipboard_edits(host, target, &content)
    }
}

/// Completes to files already in the chat.
struct ChatFileCompletions;

impl CompletionProvider for ChatFileCompletions {
    fn candidates(&self, host: &dyn HostContext) -> Vec<String> {
        let mut files = host.chat_files();
        files.sort();
        files
    }
}

pub(crate) fn clip_edit() -> CommandSpec {
    CommandSpec {
        name: "clip-edit",
        handler: Arc::new(ClipEdit),
        completions: Some(Arc::new(ChatFileCompletions)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_registry::testing::RecordingHost;

    #[test]
    fn test_apply_adds_missing_file_then_reports() {
        let mut host = RecordingHost::new();
        host.edit_result = Ok(vec!["src/lib.rs".to_string()]);
        apply_clipboard_edits(&mut host, "src/lib.rs", "whatever").expect("apply");
        assert_eq!(host.files, vec!["src/lib.rs"]);
        assert_eq!(host.output_text(), "Applied clipboard edits to src/lib.rs");
        assert!(host.commits.is_empty());
    }

    #[test]
    fn test_apply_auto_commits_when_enabled() {
        let mut host = RecordingHost::new().with_files(["src/lib.rs"]);
        host.auto_commit = true;
        host.edit_result = Ok(vec!["src/lib.rs".to_string()]);
        apply_clipboard_edits(&mut host, "src/lib.rs", "whatever").expect("apply");
        assert_eq!(host.commits.len(), 1);
        let (files, message) = &host.commits[0];
        assert_eq!(files, &vec!["src/lib.rs".to_string()]);
        assert!(message.contains("clipboard edits"));
    }

    #[test]
    fn test_apply_reports_empty_edit_result() {
        let mut host = RecordingHost::new().with_files(["a.rs"]);
        host.edit_result = Ok(vec![]);
        apply_clipboard_edits(&mut host, "a.rs", "junk").expect("apply");
        assert!(host.error_text().contains("No edits were applied"));
    }

    #[test]
    fn test_apply_reports_edit_format_failure() {
        let mut host = RecordingHost::new().with_files(["a.rs"]);
        host.edit_result = Err("unrecognized edit block".to_string());
        apply_clipboard_edits(&mut host, "a.rs", "junk").expect("apply");
        assert!(host.error_text().contains("unrecognized edit block"));
        assert!(host.output_text().contains("supported format"));
    }

    #[test]
    fn test_clip_edit_requires_filename() {
        let mut host = RecordingHost::new();
        ClipEdit.run(&mut host, "").expect("run");
        assert_eq!(host.errors, vec!["Please specify a file to edit"]);
    }
}
