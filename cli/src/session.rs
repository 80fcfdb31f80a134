//! The reference host session.
//!
//! A minimal interactive controller that owns the chat state (file set,
//! message log) and the installed [`CommandSet`], and exposes the
//! [`HostContext`] capability surface over plain console I/O. It has no
//! model backend: plain messages are recorded in the conversation log so
//! context commands have something real to work with.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use wingman_registry::{CommandSet, DispatchOutcome, HostContext, HostError, HostResult};
use wingman_shared::models::chat::ChatMessage;

use crate::config::AppConfig;
use crate::edits::{is_safe_relative_path, parse_wholefile};

// Bounds template-driven command nesting.
const MAX_COMMAND_DEPTH: u32 = 8;

pub struct Session {
    root: PathBuf,
    model_name: String,
    edit_format: String,
    auto_commit: bool,
    files: Vec<String>,
    message_log: Vec<ChatMessage>,
    command_set: Arc<CommandSet>,
    depth: u32,
}

impl Session {
    pub fn new(root: PathBuf, config: &AppConfig, command_set: Arc<CommandSet>) -> Self {
        Self {
            root,
            model_name: config.model_name.clone(),
            edit_format: config.edit_format.clone(),
            auto_commit: config.auto_commit,
            files: Vec::new(),
            message_log: Vec::new(),
            command_set,
            depth: 0,
        }
    }

    pub fn run_loop(&mut self) -> anyhow::Result<()> {
        println!(
            "wingman v{} - type /help for commands, /quit to leave",
            env!("CARGO_PKG_VERSION")
        );
        let stdin = io::stdin();
        loop {
            print!("wingman> ");
            io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            match line.as_str() {
                "/quit" | "/exit" => break,
                "/help" => {
                    self.print_help();
                    continue;
                }
                _ => {}
            }
            if line.starts_with('/') {
                self.handle_line(&line);
            } else if let Err(err) = self.send_message(&line) {
                self.tool_error(&err.to_string());
            }
        }
        Ok(())
    }

    fn print_help(&mut self) {
        let set = self.command_set.clone();
        self.tool_output("\nAvailable commands:");
        for name in set.names() {
            let summary = set.summary(&name).unwrap_or_default();
            self.tool_output(&format!("  /{name:<16} {summary}"));
        }
        self.tool_output("  /help             Show this listing");
        self.tool_output("  /quit             Leave the session");
    }

    fn handle_line(&mut self, line: &str) {
        let set = self.command_set.clone();
        match set.dispatch(self, line) {
            Ok(DispatchOutcome::Handled) | Ok(DispatchOutcome::NotACommand) => {}
            Ok(DispatchOutcome::Unknown(name)) => {
                self.tool_error(&format!("Unknown command: {name}"));
            }
            Err(err) => self.tool_error(&err.to_string()),
        }
    }

    fn git(&self, args: &[String]) -> HostResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| HostError::Git(e.to_string()))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(HostError::Git(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

impl HostContext for Session {
    fn tool_output(&mut self, message: &str) {
        println!("{message}");
    }

    fn tool_error(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn tool_warning(&mut self, message: &str) {
        println!("Warning: {message}");
    }

    fn prompt_ask(&mut self, prompt: &str, default: Option<&str>) -> HostResult<Option<String>> {
        print!("{prompt}: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None); // EOF
        }
        let answer = line.trim();
        if answer.is_empty() {
            Ok(default.map(str::to_string))
        } else {
            Ok(Some(answer.to_string()))
        }
    }

    fn confirm_ask(&mut self, prompt: &str, default: bool) -> HostResult<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{prompt} {hint} ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(default);
        }
        match line.trim().to_lowercase().chars().next() {
            Some('y') => Ok(true),
            Some('n') => Ok(false),
            _ => Ok(default),
        }
    }

    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn chat_files(&self) -> Vec<String> {
        self.files.clone()
    }

    fn add_file(&mut self, path: &str) -> HostResult<bool> {
        if !is_safe_relative_path(path) {
            self.tool_error(&format!("Refusing path outside the workspace: {path}"));
            return Ok(false);
        }
        if !self.root.join(path).exists() {
            self.tool_error(&format!("File not found: {path}"));
            return Ok(false);
        }
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
        self.message_log.push(ChatMessage::user(text));
        self.tool_output("Message recorded (no model backend attached to this session)");
        Ok(())
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }

    fn edit_format(&self) -> String {
        self.edit_format.clone()
    }

    fn apply_edits(&mut self, content: &str) -> HostResult<Vec<String>> {
        let blocks = parse_wholefile(content);
        if blocks.is_empty() {
            return Err(HostError::Edit(
                "no whole-file edit blocks found in the content".to_string(),
            ));
        }
        let mut edited = Vec::new();
        for block in blocks {
            if !is_safe_relative_path(&block.path) {
                return Err(HostError::Edit(format!(
                    "edit targets a path outside the workspace: {}",
                    block.path
                )));
            }
            let target = self.root.join(&block.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &block.content)?;
            edited.push(block.path);
        }
        Ok(edited)
    }

    fn auto_commit_enabled(&self) -> bool {
        self.auto_commit
    }

    fn commit(&mut self, files: &[String], message: &str) -> HostResult<()> {
        let mut add_args = vec!["add".to_string(), "--".to_string()];
        add_args.extend(files.iter().cloned());
        self.git(&add_args)?;

        let mut commit_args = vec![
            "commit".to_string(),
            "-m".to_string(),
            message.to_string(),
            "--".to_string(),
        ];
        commit_args.extend(files.iter().cloned());
        self.git(&commit_args)?;
        Ok(())
    }

    fn run_command(&mut self, line: &str) -> HostResult<()> {
        if self.depth >= MAX_COMMAND_DEPTH {
            return Err(HostError::RecursionLimit(line.to_string()));
        }
        self.depth += 1;
        self.handle_line(line);
        self.depth -= 1;
        Ok(())
    }
}
