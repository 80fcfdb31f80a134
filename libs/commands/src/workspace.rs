//! Workspace inspection commands: `/files` and `/stats`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use wingman_registry::{CommandHandler, CommandResult, HostContext};
use wingman_shared::utils::{format_count, format_mtime, format_size};

use crate::CommandSpec;

const FILES_DOC: &str = "List chat files with details
    Usage: /files [pattern]

    Shows files in the chat with their sizes and last modified times.
    Optional pattern filters by substring.";

struct Files;

impl CommandHandler for Files {
    fn doc(&self) -> Option<&str> {
        Some(FILES_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let mut files = host.chat_files();
        if files.is_empty() {
            host.tool_output("No files in chat");
            return Ok(());
        }

        let pattern = args.trim();
        if !pattern.is_empty() {
            files.retain(|f| f.contains(pattern));
        }
        files.sort();

        let root = host.root();
        host.tool_output("\nFiles in chat:");
        for fname in files {
            let path = root.join(&fname);
            match std::fs::metadata(&path) {
                Ok(meta) => {
                    let size = format_size(meta.len());
                    let mtime = meta
                        .modified()
                        .map(format_mtime)
                        .unwrap_or_else(|_| "unknown".to_string());
                    host.tool_output(&format!("{size:>8} {mtime} {fname}"));
                }
                Err(err) => {
                    host.tool_error(&format!("Error getting info for {fname}: {err}"));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn files() -> CommandSpec {
    CommandSpec {
        name: "files",
        handler: Arc::new(Files),
        completions: None,
    }
}

const STATS_DOC: &str = "Show statistics about files in chat
    Usage: /stats

    Shows total lines, words, and characters for all chat files,
    broken down by file type.";

#[derive(Default, Clone, Copy)]
struct TypeStats {
    files: usize,
    lines: usize,
    words: usize,
    chars: usize,
}

impl TypeStats {
    fn absorb(&mut self, content: &str) {
        self.files += 1;
        self.lines += content.lines().count();
        self.words += content.split_whitespace().count();
        self.chars += content.chars().count();
    }
}

fn extension_key(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_else(|| "no_ext".to_string())
}

struct Stats;

impl CommandHandler for Stats {
    fn doc(&self) -> Option<&str> {
        Some(STATS_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, _args: &str) -> CommandResult {
        let files = host.chat_files();
        if files.is_empty() {
            host.tool_output("No files in chat");
            return Ok(());
        }

        let root = host.root();
        let mut total = TypeStats::default();
        let mut by_type: BTreeMap<String, TypeStats> = BTreeMap::new();

        for fname in &files {
            let path = root.join(fname);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    total.absorb(&content);
                    by_type
                        .entry(extension_key(&path))
                        .or_default()
                        .absorb(&content);
                }
                Err(err) => {
                    host.tool_error(&format!("Error processing {fname}: {err}"));
                }
            }
        }

        host.tool_output("\nTotal Statistics:");
        host.tool_output(&format!("Files: {}", total.files));
        host.tool_output(&format!("Lines: {}", format_count(total.lines)));
        host.tool_output(&format!("Words: {}", format_count(total.words)));
        host.tool_output(&format!("Chars: {}", format_count(total.chars)));

        host.tool_output("\nBy File Type:");
        for (ext, stats) in by_type {
            host.tool_output(&format!("\n{ext}:"));
            host.tool_output(&format!("  Files: {}", stats.files));
            host.tool_output(&format!("  Lines: {}", format_count(stats.lines)));
            host.tool_output(&format!("  Words: {}", format_count(stats.words)));
        }
        Ok(())
    }
}

pub(crate) fn stats() -> CommandSpec {
    CommandSpec {
        name: "stats",
        handler: Arc::new(Stats),
        completions: None,
    }
}
