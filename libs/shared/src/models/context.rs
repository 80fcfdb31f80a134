//! Context snapshot schema used by the backup/restore commands.
//!
//! A snapshot captures enough of a session to rebuild it later: which
//! model was active, which files were in the chat, and the full message
//! log. All four fields are required; `serde` rejects snapshots missing
//! any of them, which is the validation the restore path relies on.

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;

/// A serialized session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Human-readable creation time (`YYYY-MM-DD HH:MM:SS`).
    pub timestamp: String,
    /// Name of the main model that produced the conversation.
    pub model: String,
    /// Chat files, relative to the workspace root.
    pub files: Vec<String>,
    /// Full conversation log at snapshot time.
    pub messages: Vec<ChatMessage>,
}
