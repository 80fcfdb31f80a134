//! The host controller's dispatch table.
//!
//! The controller binds its built-in commands here, installs the
//! registry on top, and then consults [`CommandSet::dispatch`] for every
//! slash line the user types. This is the inversion that replaces
//! runtime method injection: the host asks "is there a handler for this
//! name?" instead of the registry writing into the host.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CommandError;
use crate::handler::{CommandHandler, CompletionProvider, doc_summary};
use crate::host::HostContext;

/// Result of resolving one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion.
    Handled,
    /// The line named a command nobody binds.
    Unknown(String),
    /// The line is not a slash command at all.
    NotACommand,
}

/// Name → handler and name → completions bindings for one controller.
#[derive(Default)]
pub struct CommandSet {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    completions: HashMap<String, Arc<dyn CompletionProvider>>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler. The controller uses this for its built-ins;
    /// installation uses it for registered commands after the collision
    /// check.
    pub fn bind(&mut self, name: &str, handler: Arc<dyn CommandHandler>) {
        self.commands.insert(name.to_string(), handler);
    }

    pub fn bind_completions(&mut self, name: &str, provider: Arc<dyn CompletionProvider>) {
        self.completions.insert(name.to_string(), provider);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn has_completions(&self, name: &str) -> bool {
        self.completions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(name).cloned()
    }

    /// Bound command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// One-line summary for help listings, from the handler's doc.
    pub fn summary(&self, name: &str) -> Option<String> {
        self.commands
            .get(name)
            .and_then(|handler| handler.doc())
            .map(doc_summary)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Resolve and run one input line.
    ///
    /// Handler failures propagate unchanged; the registry never
    /// reinterprets them. Unknown names are an outcome, not an error, so
    /// the controller decides how to report them.
    pub fn dispatch(
        &self,
        host: &mut dyn HostContext,
        line: &str,
    ) -> Result<DispatchOutcome, CommandError> {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(DispatchOutcome::NotACommand);
        };
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        if name.is_empty() {
            return Ok(DispatchOutcome::NotACommand);
        }
        match self.get(name) {
            Some(handler) => {
                handler.run(host, args)?;
                Ok(DispatchOutcome::Handled)
            }
            None => Ok(DispatchOutcome::Unknown(name.to_string())),
        }
    }

    /// Completion candidates for a command's arguments, if a provider is
    /// bound.
    pub fn completions_for(&self, host: &dyn HostContext, name: &str) -> Option<Vec<String>> {
        self.completions
            .get(name)
            .map(|provider| provider.candidates(host))
    }
}
