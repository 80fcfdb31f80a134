//! The host capability surface.
//!
//! Extension commands never touch the host application directly; they see
//! a [`HostContext`] — the fixed set of capabilities the host exposes to
//! commands. The host's own engine (model invocation, edit application,
//! git plumbing) stays behind this trait.

use std::path::PathBuf;

use thiserror::Error;
use wingman_shared::models::chat::ChatMessage;

/// Errors produced by host capability calls.
#[derive(Error, Debug)]
pub enum HostError {
    /// The host does not implement this capability
    #[error("host does not support {0}")]
    Unsupported(String),

    /// The edit engine rejected the proposed edits
    #[error("edit application failed: {0}")]
    Edit(String),

    /// A git operation failed
    #[error("git operation failed: {0}")]
    Git(String),

    /// Re-entrant dispatch exceeded the nesting limit
    #[error("command recursion limit reached while running {0:?}")]
    RecursionLimit(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for host capability calls.
pub type HostResult<T> = Result<T, HostError>;

/// Capabilities the host controller exposes to extension commands.
///
/// Contract: all methods are called from the host's single interactive
/// thread. Prompt methods may block on user input; everything else must
/// return promptly.
pub trait HostContext {
    /// Write a line to the user-facing output channel.
    fn tool_output(&mut self, message: &str);

    /// Write a line to the user-facing error channel.
    fn tool_error(&mut self, message: &str);

    /// Write a warning to the user-facing output channel.
    fn tool_warning(&mut self, message: &str);

    /// Ask the user for a line of input. Returns `Ok(None)` when the user
    /// aborts instead of answering.
    fn prompt_ask(&mut self, prompt: &str, default: Option<&str>) -> HostResult<Option<String>>;

    /// Ask the user a yes/no question.
    fn confirm_ask(&mut self, prompt: &str, default: bool) -> HostResult<bool>;

    /// Absolute root of the workspace the session operates on.
    fn root(&self) -> PathBuf;

    /// Files currently in the chat, relative to [`HostContext::root`].
    fn chat_files(&self) -> Vec<String>;

    /// Add a file to the chat. Returns `Ok(false)` when the file could
    /// not be added (reported through the error channel by the host).
    fn add_file(&mut self, path: &str) -> HostResult<bool>;

    /// Remove a file from the chat. Returns whether it was present.
    fn drop_file(&mut self, path: &str) -> bool;

    /// Drop all chat files and the conversation log.
    fn clear_chat(&mut self);

    /// The conversation log so far.
    fn messages(&self) -> Vec<ChatMessage>;

    /// Append a message to the conversation log without model involvement.
    fn push_message(&mut self, message: ChatMessage);

    /// Send a user message through the host's model pipeline.
    fn send_message(&mut self, text: &str) -> HostResult<()>;

    /// Name of the active main model.
    fn model_name(&self) -> String;

    /// Active edit format (e.g. `whole`, `diff`).
    fn edit_format(&self) -> String;

    /// Hand raw edit content to the host's edit engine. Returns the
    /// relative paths of the files that were changed.
    fn apply_edits(&mut self, content: &str) -> HostResult<Vec<String>>;

    /// Whether the host commits applied edits automatically.
    fn auto_commit_enabled(&self) -> bool {
        false
    }

    /// Commit the given files through the host's repository wrapper.
    fn commit(&mut self, files: &[String], message: &str) -> HostResult<()>;

    /// Run another command line (`/name args`) through the host's own
    /// dispatch table. Hosts must bound the nesting depth.
    fn run_command(&mut self, line: &str) -> HostResult<()>;
}
