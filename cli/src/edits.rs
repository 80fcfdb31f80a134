//! Whole-file edit block parsing for the reference session.
//!
//! The reference session's edit engine understands the `whole` format: a
//! filename line (optionally wrapped in backticks or bold markers, with
//! or without a trailing colon) immediately followed by a fenced code
//! block holding the complete new file contents. Everything outside
//! filename+fence pairs is prose and gets ignored.

/// One parsed edit: target path and the complete new contents.
#[derive(Debug, PartialEq)]
pub struct EditBlock {
    pub path: String,
    pub content: String,
}

fn clean_filename(line: &str) -> Option<String> {
    let name = line.trim().trim_start_matches('#').trim();
    let name = name.trim_matches(|c: char| c == '`' || c == '*');
    let name = name.trim_end_matches(':');
    let name = name.trim_matches(|c: char| c == '`' || c == '*').trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(name.to_string())
}

/// Extract whole-file edit blocks from raw edit content. Fenced blocks
/// without a preceding filename line are ignored.
pub fn parse_wholefile(content: &str) -> Vec<EditBlock> {
    let mut blocks = Vec::new();
    let mut last_candidate: Option<String> = None;
    let mut current: Option<(String, Vec<String>)> = None;

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            match current.take() {
                Some((path, body)) => {
                    blocks.push(EditBlock {
                        path,
                        content: body.join("\n") + "\n",
                    });
                    last_candidate = None;
                }
                None => {
                    if let Some(path) = last_candidate.take() {
                        current = Some((path, Vec::new()));
                    }
                }
            }
            continue;
        }

        match &mut current {
            Some((_, body)) => body.push(line.to_string()),
            None => {
                if !line.trim().is_empty() {
                    last_candidate = clean_filename(line);
                }
            }
        }
    }
    blocks
}

/// Reject paths that would escape the workspace root.
pub fn is_safe_relative_path(path: &str) -> bool {
    let p = std::path::Path::new(path);
    !p.is_absolute()
        && !p
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
}
