//! Deterministic host double for command tests.
//!
//! [`RecordingHost`] records everything a command does through the
//! capability surface and plays back scripted answers for prompts and
//! edit application. Attach a [`CommandSet`] to exercise re-entrant
//! dispatch the way the real controller does.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use wingman_shared::models::chat::ChatMessage;

use crate::command_set::{CommandSet, DispatchOutcome};
use crate::host::{HostContext, HostError, HostResult};

/// In-memory [`HostContext`] implementation.
///
/// All recorded state is public so assertions stay plain.
pub struct RecordingHost {
    pub root: PathBuf,
    pub files: Vec<String>,
    pub message_log: Vec<ChatMessage>,
    pub outputs: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sent: Vec<String>,
    pub ran: Vec<String>,
    pub commits: Vec<(Vec<String>, String)>,
    /// Scripted answers consumed by `prompt_ask`, front first.
    pub prompt_answers: VecDeque<Option<String>>,
    /// Scripted answers consumed by `confirm_ask`, front first.
    pub confirm_answers: VecDeque<bool>,
    /// Scripted result returned by `apply_edits`.
    pub edit_result: Result<Vec<String>, String>,
    pub auto_commit: bool,
    pub model: String,
    pub format: String,
    /// Dispatch table consulted by `run_command` when attached.
    pub command_set: Option<Arc<CommandSet>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            files: Vec::new(),
            message_log: Vec::new(),
            outputs: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            sent: Vec::new(),
            ran: Vec::new(),
            commits: Vec::new(),
            prompt_answers: VecDeque::new(),
            confirm_answers: VecDeque::new(),
            edit_result: Ok(Vec::new()),
            auto_commit: false,
            model: "test-model".to_string(),
            format: "whole".to_string(),
            command_set: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_command_set(mut self, set: Arc<CommandSet>) -> Self {
        self.command_set = Some(set);
        self
    }

    /// Everything written to the output channel, joined for substring
    /// assertions.
    pub fn output_text(&self) -> String {
        self.outputs.join("\n")
    }

    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostContext for RecordingHost {
    fn tool_output(&mut self, message: &str) {
        self.outputs.push(message.to_string());
    }

    fn tool_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn tool_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn prompt_ask(&mut self, _prompt: &str, default: Option<&str>) -> HostResult<Option<String>> {
        match self.prompt_answers.pop_front() {
            Some(answer) => Ok(answer),
            None => Ok(default.map(str::to_string)),
        }
    }

    fn confirm_ask(&mut self, _prompt: &str, default: bool) -> HostResult<bool> {
        Ok(self.confirm_answers.pop_front().unwrap_or(default))
    }

    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn chat_files(&self) -> Vec<String> {
        self.files.clone()
    }

    fn add_file(&mut self, path: &str) -> HostResult<bool> {
        if !self.files.iter().any(|f| f == path) {
            self.files.push(path.to_string());
        }
        Ok(true)
    }

    fn drop_file(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f != path);
        self.files.len() != before
    }

    fn clear_chat(&mut self) {
        self.files.clear();
        self.message_log.clear();
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.message_log.clone()
    }

    fn push_message(&mut self, message: ChatMessage) {
        self.message_log.push(message);
    }

    fn send_message(&mut self, text: &str) -> HostResult<()> {
        self.sent.push(text.to_string());
        self.message_log.push(ChatMessage::user(text));
        Ok(())
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }

    fn edit_format(&self) -> String {
        self.format.clone()
    }

    fn apply_edits(&mut self, _content: &str) -> HostResult<Vec<String>> {
        match &self.edit_result {
            Ok(files) => Ok(files.clone()),
            Err(reason) => Err(HostError::Edit(reason.clone())),
        }
    }

    fn auto_commit_enabled(&self) -> bool {
        self.auto_commit
    }

    fn commit(&mut self, files: &[String], message: &str) -> HostResult<()> {
        self.commits.push((files.to_vec(), message.to_string()));
        Ok(())
    }

    fn run_command(&mut self, line: &str) -> HostResult<()> {
        self.ran.push(line.to_string());
        let Some(set) = self.command_set.clone() else {
            return Ok(());
        };
        match set.dispatch(self, line) {
            Ok(DispatchOutcome::Unknown(name)) => {
                self.tool_error(&format!("Unknown command: {}", name));
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(err) => {
                self.tool_error(&err.to_string());
                Ok(())
            }
        }
    }
}
