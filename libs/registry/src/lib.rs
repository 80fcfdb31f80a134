//! Command registration and installation.
//!
//! This crate is the seam between independently-authored extension
//! commands and the host controller that dispatches them:
//!
//! - [`CommandRegistry`] accumulates handlers and completion providers as
//!   extension modules register them at startup.
//! - [`CommandRegistry::install_into`] copies the registered bindings
//!   onto a [`CommandSet`] owned by the host controller, skipping any
//!   name the controller already binds (built-in behavior wins).
//! - [`CommandSet::dispatch`] is what the controller consults when the
//!   user issues `/name args`.
//!
//! Handlers talk to the host exclusively through [`HostContext`], a fixed
//! capability surface covering console output, prompts, the chat file
//! set, the conversation log, edit application, and re-entrant dispatch.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wingman_registry::{CommandRegistry, CommandSet, FnCommand};
//!
//! let registry = CommandRegistry::new();
//! let handler = FnCommand::with_doc("Say pong", |host, _args| {
//!     host.tool_output("pong");
//!     Ok(())
//! });
//! registry.register("ping", Arc::new(handler)).unwrap();
//!
//! let mut set = CommandSet::new();
//! registry.install_into(&mut set);
//! assert!(set.contains("ping"));
//! ```

mod command_set;
mod error;
mod handler;
mod host;
mod registry;
pub mod testing;

pub use command_set::{CommandSet, DispatchOutcome};
pub use error::{CommandError, CommandResult, RegistryError};
pub use handler::{CommandHandler, CompletionProvider, FnCommand, StaticCompletions};
pub use host::{HostContext, HostError, HostResult};
pub use registry::{CommandRegistry, DEFAULT_DESCRIPTION};
