//! `/cchat`: chat with keyword expansion.
//!
//! Messages may reference `@text-<keyword>` entries defined in the
//! project's keywords file; the expanded message is echoed and confirmed
//! before it goes to the model.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use wingman_registry::{
    CommandError, CommandHandler, CommandResult, CompletionProvider, HostContext,
};
use wingman_shared::data_dir::DataDir;

use crate::CommandSpec;

const CCHAT_DOC: &str = "Chat with keyword substitution support
    Usage: /cchat <message>

    The message can contain @text-keyword references that are expanded
    from definitions in the keywords file, e.g.:

    {
        \"api\": \"REST API with JSON responses\",
        \"tests\": \"Unit tests with mocking\"
    }

    /cchat Create @text-tests for the login function";

const KEYWORD_PATTERN: &str = r"@text-(\w+)";

pub(crate) fn load_keywords(
    host: &mut dyn HostContext,
) -> Option<HashMap<String, String>> {
    let path = DataDir::new(&host.root()).keywords_file();
    if !path.exists() {
        host.tool_error(&format!("Keywords file not found: {}", path.display()));
        return None;
    }
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            host.tool_error(&format!("Error reading {}: {err}", path.display()));
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(keywords) => Some(keywords),
        Err(err) => {
            host.tool_error(&format!("Invalid JSON in {}: {err}", path.display()));
            None
        }
    }
}

/// Expand `@text-<keyword>` references. Returns the expanded text and the
/// number of replacements, or the sorted set of unknown keywords.
pub(crate) fn expand_keywords(
    text: &str,
    keywords: &HashMap<String, String>,
) -> Result<(String, usize), Vec<String>> {
    let pattern = Regex::new(KEYWORD_PATTERN).map_err(|_| Vec::new())?;

    let mut missing: Vec<String> = pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|keyword| !keywords.contains_key(keyword))
        .collect();
    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(missing);
    }

    let mut replacements = 0;
    let expanded = pattern
        .replace_all(text, |caps: &regex::Captures<'_>| {
            replacements += 1;
            keywords
                .get(caps.get(1).map(|m| m.as_str()).unwrap_or_default())
                .cloned()
                .unwrap_or_default()
        })
        .to_string();
    Ok((expanded, replacements))
}

struct CustomChat;

impl CommandHandler for CustomChat {
    fn doc(&self) -> Option<&str> {
        Some(CCHAT_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        if args.trim().is_empty() {
            host.tool_error("Please provide a message");
            return Ok(());
        }

        let Some(keywords) = load_keywords(host) else {
            return Ok(());
        };
        if keywords.is_empty() {
            host.tool_error("Keywords file defines no keywords");
            return Ok(());
        }

        let (expanded, replacements) = match expand_keywords(args, &keywords) {
            Ok(result) => result,
            Err(missing) => {
                host.tool_error("Unknown keywords:");
                for keyword in missing {
                    host.tool_error(&format!("  @text-{keyword}"));
                }
                return Ok(());
            }
        };

        if replacements > 0 {
            host.tool_output("\nExpanded message:");
            host.tool_output(&expanded);
            if !host.confirm_ask("Send expanded message?", true)? {
                return Ok(());
            }
        }

        host.send_message(&expanded).map_err(CommandError::from)
    }
}

/// Completes to `@text-<keyword>` candidates from the keywords file.
struct KeywordCompletions;

impl CompletionProvider for KeywordCompletions {
    fn candidates(&self, host: &dyn HostContext) -> Vec<String> {
        let path = DataDir::new(&host.root()).keywords_file();
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        let Ok(keywords) = serde_json::from_str::<HashMap<String, String>>(&raw) else {
            return Vec::new();
        };
        let mut candidates: Vec<String> = keywords
            .keys()
            .map(|keyword| format!("@text-{keyword}"))
            .collect();
        candidates.sort();
        candidates
    }
}

pub(crate) fn cchat() -> CommandSpec {
    CommandSpec {
        name: "cchat",
        handler: Arc::new(CustomChat),
        completions: Some(Arc::new(KeywordCompletions)),
    }
}
