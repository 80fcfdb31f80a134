//! The command registry.
//!
//! A single registry instance is constructed at process start, populated
//! by extension modules during startup, and installed onto the host
//! controller's [`CommandSet`] once the controller exists. Entries live
//! for the process lifetime; `remove_command`/`clear` exist for test
//! isolation only.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::command_set::CommandSet;
use crate::error::RegistryError;
use crate::handler::{CommandHandler, CompletionProvider, clean_doc};

/// Placeholder returned by [`CommandRegistry::get_description`] when a
/// handler carries no documentation.
pub const DEFAULT_DESCRIPTION: &str = "No description available";

#[derive(Default)]
struct Tables {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    completions: HashMap<String, Arc<dyn CompletionProvider>>,
    descriptions: HashMap<String, String>,
}

/// Process-wide table mapping command names to handlers, completion
/// providers, and help descriptions.
///
/// Mutation (`register`, `remove_command`, `clear`) and installation take
/// the write lock; help and completion lookups take the read lock.
/// Registration is expected to happen during startup, before the
/// interactive loop begins.
pub struct CommandRegistry {
    tables: RwLock<Tables>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a command handler without completions.
    pub fn register(
        &self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistryError> {
        self.register_entry(name, handler, None)
    }

    /// Register a command handler together with its completion provider.
    pub fn register_with_completions(
        &self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
        completions: Arc<dyn CompletionProvider>,
    ) -> Result<(), RegistryError> {
        self.register_entry(name, handler, Some(completions))
    }

    fn register_entry(
        &self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
        completions: Option<Arc<dyn CompletionProvider>>,
    ) -> Result<(), RegistryError> {
        if name.is_empty() || name.contains(char::is_whitespace) || name.starts_with('/') {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        handler
            .validate()
            .map_err(|reason| RegistryError::InvalidHandler {
                name: name.to_string(),
                reason,
            })?;
        if let Some(provider) = &completions {
            provider
                .validate()
                .map_err(|reason| RegistryError::InvalidCompletions {
                    name: name.to_string(),
                    reason,
                })?;
        }

        let description = handler
            .doc()
            .map(clean_doc)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        // Last registration wins, silently. Name contention between
        // command sources is resolved by the configuration filter, not
        // here.
        let mut tables = self.write();
        tables.commands.insert(name.to_string(), handler);
        tables.descriptions.insert(name.to_string(), description);
        match completions {
            Some(provider) => {
                tables.completions.insert(name.to_string(), provider);
            }
            None => {
                tables.completions.remove(name);
            }
        }
        tracing::debug!(command = name, "registered command");
        Ok(())
    }

    /// Copy every registered binding onto `set`, skipping names the set
    /// already binds. Pre-existing behavior always wins; a collision is
    /// logged and never aborts the rest of the loop. Safe to call
    /// repeatedly: a second call binds nothing new.
    pub fn install_into(&self, set: &mut CommandSet) {
        let tables = self.write();
        tracing::debug!(count = tables.commands.len(), "installing commands");

        for (name, handler) in &tables.commands {
            if set.contains(name) {
                tracing::warn!(command = %name, "command already defined on the host, skipping");
                continue;
            }
            set.bind(name, handler.clone());
            tracing::debug!(command = %name, "installed command");
        }

        for (name, provider) in &tables.completions {
            if set.has_completions(name) {
                continue;
            }
            set.bind_completions(name, provider.clone());
            tracing::debug!(command = %name, "installed completions");
        }
    }

    /// Plain command names, sorted, without any internal key derivation.
    pub fn list_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a handler by name.
    pub fn get_command(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.read().commands.get(name).cloned()
    }

    /// Look up a completion provider by name.
    pub fn get_completions(&self, name: &str) -> Option<Arc<dyn CompletionProvider>> {
        self.read().completions.get(name).cloned()
    }

    /// Description for help listings. Unknown names get the fixed
    /// placeholder so help generators never have to branch on errors.
    pub fn get_description(&self, name: &str) -> String {
        self.read()
            .descriptions
            .get(name)
            .cloned()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
    }

    /// Remove one registration. Missing names are a no-op.
    pub fn remove_command(&self, name: &str) {
        let mut tables = self.write();
        tables.commands.remove(name);
        tables.completions.remove(name);
        tables.descriptions.remove(name);
    }

    /// Drop every registration.
    pub fn clear(&self) {
        let mut tables = self.write();
        tables.commands.clear();
        tables.completions.clear();
        tables.descriptions.clear();
    }

    pub fn len(&self) -> usize {
        self.read().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandResult;
    use crate::handler::{FnCommand, StaticCompletions};
    use crate::host::HostContext;

    struct BrokenHandler;

    impl CommandHandler for BrokenHandler {
        fn validate(&self) -> Result<(), String> {
            Err("no command lines".to_string())
        }

        fn run(&self, _host: &mut dyn HostContext, _args: &str) -> CommandResult {
            Ok(())
        }
    }

    fn noop() -> Arc<dyn CommandHandler> {
        Arc::new(FnCommand::new(|_host, _args| Ok(())))
    }

    #[test]
    fn test_register_then_get_returns_handler() {
        let registry = CommandRegistry::new();
        let handler = noop();
        registry.register("ping", handler.clone()).expect("register");
        let found = registry.get_command("ping").expect("lookup");
        assert!(Arc::ptr_eq(&found, &handler));
    }

    #[test]
    fn test_reregistration_last_write_wins() {
        let registry = CommandRegistry::new();
        let first = noop();
        let second = noop();
        registry.register("ping", first.clone()).expect("register");
        registry.register("ping", second.clone()).expect("register");
        let found = registry.get_command("ping").expect("lookup");
        assert!(Arc::ptr_eq(&found, &second));
        assert!(!Arc::ptr_eq(&found, &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let registry = CommandRegistry::new();
        assert!(matches!(
            registry.register("", noop()),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("two words", noop()),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("/slash", noop()),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_handler_leaves_tables_unmodified() {
        let registry = CommandRegistry::new();
        let err = registry
            .register("broken", Arc::new(BrokenHandler))
            .expect_err("must fail");
        assert!(matches!(err, RegistryError::InvalidHandler { .. }));
        assert!(registry.get_command("broken").is_none());
        assert_eq!(registry.get_description("broken"), DEFAULT_DESCRIPTION);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_completions_leaves_tables_unmodified() {
        let registry = CommandRegistry::new();
        let err = registry
            .register_with_completions(
                "ping",
                noop(),
                Arc::new(StaticCompletions::new(["", "--all"])),
            )
            .expect_err("must fail");
        assert!(matches!(err, RegistryError::InvalidCompletions { .. }));
        assert!(registry.get_command("ping").is_none());
    }

    #[test]
    fn test_description_derived_from_doc() {
        let registry = CommandRegistry::new();
        let handler = Arc::new(FnCommand::with_doc(
            "Show stats\n    Usage: /stats",
            |_host, _args| Ok(()),
        ));
        registry.register("stats", handler).expect("register");
        assert_eq!(registry.get_description("stats"), "Show stats\nUsage: /stats");
    }

    #[test]
    fn test_description_falls_back_to_placeholder() {
        let registry = CommandRegistry::new();
        registry.register("bare", noop()).expect("register");
        assert_eq!(registry.get_description("bare"), DEFAULT_DESCRIPTION);
        // Unknown names behave the same
        assert_eq!(registry.get_description("missing"), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_list_commands_plain_names() {
        let registry = CommandRegistry::new();
        for name in ["foo", "bar", "baz"] {
            registry.register(name, noop()).expect("register");
        }
        assert_eq!(registry.list_commands(), vec!["bar", "baz", "foo"]);
    }

    #[test]
    fn test_remove_command_tolerates_missing() {
        let registry = CommandRegistry::new();
        registry.remove_command("never-registered");
        registry.register("ping", noop()).expect("register");
        registry.remove_command("ping");
        assert!(registry.get_command("ping").is_none());
    }

    #[test]
    fn test_clear_behaves_as_if_nothing_registered() {
        let registry = CommandRegistry::new();
        registry
            .register_with_completions(
                "ping",
                noop(),
                Arc::new(StaticCompletions::new(["--loud"])),
            )
            .expect("register");
        registry.clear();
        assert!(registry.get_command("ping").is_none());
        assert!(registry.get_completions("ping").is_none());
        assert_eq!(registry.get_description("ping"), DEFAULT_DESCRIPTION);
        assert!(registry.list_commands().is_empty());
    }

    #[test]
    fn test_reregistration_without_completions_drops_provider() {
        let registry = CommandRegistry::new();
        registry
            .register_with_completions(
                "glog",
                noop(),
                Arc::new(StaticCompletions::new(["--all"])),
            )
            .expect("register");
        assert!(registry.get_completions("glog").is_some());
        registry.register("glog", noop()).expect("re-register");
        assert!(registry.get_completions("glog").is_none());
    }
}
