//! Host built-in commands.
//!
//! These are bound on the command set before installation, so an
//! extension registering the same name is skipped — built-in behavior
//! always wins.

use std::sync::Arc;

use wingman_registry::{CommandHandler, CommandResult, CommandSet, HostContext};

const ADD_DOC: &str = "Add files to the chat
    Usage: /add <file> [file ...]";

struct AddFiles;

impl CommandHandler for AddFiles {
    fn doc(&self) -> Option<&str> {
        Some(ADD_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        if args.trim().is_empty() {
            host.tool_error("Usage: /add <file> [file ...]");
            return Ok(());
        }
        for path in args.split_whitespace() {
            if host.add_file(path)? {
                host.tool_output(&format!("Added {path} to the chat"));
            }
        }
        Ok(())
    }
}

const DROP_DOC: &str = "Remove files from the chat
    Usage: /drop <file> [file ...]";

struct DropFiles;

impl CommandHandler for DropFiles {
    fn doc(&self) -> Option<&str> {
        Some(DROP_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        if args.trim().is_empty() {
            host.tool_error("Usage: /drop <file> [file ...]");
            return Ok(());
        }
        for path in args.split_whitespace() {
            if host.drop_file(path) {
                host.tool_output(&format!("Removed {path} from the chat"));
            } else {
                host.tool_warning(&format!("{path} was not in the chat"));
            }
        }
        Ok(())
    }
}

const CLEAR_DOC: &str = "Clear the chat context
    Usage: /clear";

struct ClearChat;

impl CommandHandler for ClearChat {
    fn doc(&self) -> Option<&str> {
        Some(CLEAR_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, _args: &str) -> CommandResult {
        host.clear_chat();
        host.tool_output("Chat context cleared");
        Ok(())
    }
}

/// Bind every built-in onto the controller's command set. Called before
/// `install_into` so collisions resolve in the built-ins' favor.
pub fn bind_builtins(set: &mut CommandSet) {
    set.bind("add", Arc::new(AddFiles));
    set.bind("drop", Arc::new(DropFiles));
    set.bind("clear", Arc::new(ClearChat));
}
