//! The extension command pack.
//!
//! Each module contributes one or more commands; [`register_all`] is the
//! single entry point the startup path calls to put them all in the
//! registry, honoring the configuration filter. Template-backed commands
//! defined by the user are registered separately via
//! [`register_template_commands`].

use std::sync::Arc;

use wingman_registry::{CommandHandler, CommandRegistry, CompletionProvider, RegistryError};
use wingman_shared::models::filter::CommandFilter;

pub mod chat;
pub mod clipboard;
pub mod context;
pub mod git;
pub mod templates;
pub mod workspace;

pub use templates::register_template_commands;

/// One command's registration payload.
pub(crate) struct CommandSpec {
    pub name: &'static str,
    pub handler: Arc<dyn CommandHandler>,
    pub completions: Option<Arc<dyn CompletionProvider>>,
}

fn catalog() -> Vec<CommandSpec> {
    vec![
        git::glog(),
        git::timemachine(),
        clipboard::clip_edit(),
        workspace::files(),
        workspace::stats(),
        context::showcontext(),
        context::context_backup(),
        context::context_load(),
        chat::cchat(),
        templates::template(),
    ]
}

/// Register every bundled extension command.
///
/// Commands filtered out by `filter` are skipped before they ever reach
/// the registry, mirroring how command sources are filtered at scan time.
pub fn register_all(
    registry: &CommandRegistry,
    filter: Option<&CommandFilter>,
) -> Result<(), RegistryError> {
    for spec in catalog() {
        if let Some(filter) = filter
            && !filter.should_load(spec.name)
        {
            tracing::debug!(command = spec.name, "filtered out by configuration");
            continue;
        }
        match spec.completions {
            Some(completions) => {
                registry.register_with_completions(spec.name, spec.handler, completions)?
            }
            None => registry.register(spec.name, spec.handler)?,
        }
    }
    Ok(())
}
