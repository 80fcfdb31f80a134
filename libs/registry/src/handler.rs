//! Handler and completion-provider contracts.

use crate::error::CommandResult;
use crate::host::HostContext;

/// A registered command's behavior.
///
/// Implementations are shared (`Arc`) between the registry and every
/// command set they are installed into, so they hold no per-invocation
/// state.
pub trait CommandHandler: Send + Sync {
    /// Documentation text attached to the handler. The registry derives
    /// the stored description from this at registration time; help
    /// listings show the first line.
    fn doc(&self) -> Option<&str> {
        None
    }

    /// Registration-time contract check. Statically-defined handlers are
    /// correct by construction; dynamically-constructed ones (e.g.
    /// template-backed commands) reject broken definitions here.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Execute the command with the raw argument string.
    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult;
}

/// Supplies tab-completion candidates for a command's arguments.
///
/// Must not block: candidates are computed while the user is typing.
pub trait CompletionProvider: Send + Sync {
    /// Registration-time contract check, mirroring [`CommandHandler::validate`].
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn candidates(&self, host: &dyn HostContext) -> Vec<String>;
}

/// Adapter turning a plain function or closure into a [`CommandHandler`].
pub struct FnCommand<F> {
    doc: Option<String>,
    func: F,
}

impl<F> FnCommand<F>
where
    F: Fn(&mut dyn HostContext, &str) -> CommandResult + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { doc: None, func }
    }

    pub fn with_doc(doc: impl Into<String>, func: F) -> Self {
        Self {
            doc: Some(doc.into()),
            func,
        }
    }
}

impl<F> CommandHandler for FnCommand<F>
where
    F: Fn(&mut dyn HostContext, &str) -> CommandResult + Send + Sync,
{
    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        (self.func)(host, args)
    }
}

/// A fixed candidate list (flags, subcommand names).
pub struct StaticCompletions {
    candidates: Vec<String>,
}

impl StaticCompletions {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl CompletionProvider for StaticCompletions {
    fn validate(&self) -> Result<(), String> {
        if self.candidates.iter().any(|c| c.trim().is_empty()) {
            return Err("static completion candidates must be non-empty".to_string());
        }
        Ok(())
    }

    fn candidates(&self, _host: &dyn HostContext) -> Vec<String> {
        self.candidates.clone()
    }
}

/// Normalize handler documentation the way help output expects it: the
/// first line kept as-is, the common indentation of the remaining lines
/// stripped, and surrounding blank lines removed.
pub(crate) fn clean_doc(doc: &str) -> String {
    let mut lines = doc.lines();
    let first = lines.next().unwrap_or_default().trim();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut out = String::from(first);
    for line in &rest {
        out.push('\n');
        if line.trim().is_empty() {
            continue;
        }
        out.extend(line.chars().skip(indent));
    }
    out.trim().to_string()
}

/// First line of a handler's cleaned documentation, for compact listings.
pub(crate) fn doc_summary(doc: &str) -> String {
    clean_doc(doc).lines().next().unwrap_or_default().to_string()
}
