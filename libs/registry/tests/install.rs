//! Installation lifecycle: populate → install → dispatch.

use std::sync::Arc;

use wingman_registry::testing::RecordingHost;
use wingman_registry::{
    CommandRegistry, CommandSet, DispatchOutcome, FnCommand, StaticCompletions,
};

#[test]
fn test_install_binds_registered_commands() {
    let registry = CommandRegistry::new();
    registry
        .register(
            "ping",
            Arc::new(FnCommand::new(|host, _args| {
                host.tool_output("pong");
                Ok(())
            })),
        )
        .expect("register");

    let mut set = CommandSet::new();
    registry.install_into(&mut set);
    assert!(set.contains("ping"));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_install_skips_host_builtins() {
    let registry = CommandRegistry::new();
    registry
        .register(
            "add",
            Arc::new(FnCommand::new(|host, _args| {
                host.tool_output("extension add");
                Ok(())
            })),
        )
        .expect("register");

    let mut set = CommandSet::new();
    let builtin: Arc<_> = Arc::new(FnCommand::new(|host: &mut dyn wingman_registry::HostContext, _args: &str| {
        host.tool_output("builtin add");
        Ok(())
    }));
    set.bind("add", builtin);

    registry.install_into(&mut set);

    // Pre-existing behavior wins
    let mut host = RecordingHost::new();
    set.dispatch(&mut host, "/add x").expect("dispatch");
    assert_eq!(host.outputs, vec!["builtin add"]);
}

#[test]
fn test_install_is_idempotent() {
    let registry = CommandRegistry::new();
    registry
        .register_with_completions(
            "glog",
            Arc::new(FnCommand::new(|_host, _args| Ok(()))),
            Arc::new(StaticCompletions::new(["-n", "--all", "--stat"])),
        )
        .expect("register");

    let mut set = CommandSet::new();
    registry.install_into(&mut set);
    let after_first = set.len();
    registry.install_into(&mut set);
    assert_eq!(set.len(), after_first);

    // Completions survived the second pass untouched
    let host = RecordingHost::new();
    assert_eq!(
        set.completions_for(&host, "glog"),
        Some(vec!["-n".to_string(), "--all".to_string(), "--stat".to_string()])
    );
}

#[test]
fn test_late_registration_needs_reinstall() {
    let registry = CommandRegistry::new();
    let mut set = CommandSet::new();
    registry.install_into(&mut set);

    registry
        .register("late", Arc::new(FnCommand::new(|_host, _args| Ok(()))))
        .expect("register");
    assert!(!set.contains("late"));

    registry.install_into(&mut set);
    assert!(set.contains("late"));
}

#[test]
fn test_ping_pong_through_installed_dispatch() {
    let registry = CommandRegistry::new();
    registry
        .register(
            "ping",
            Arc::new(FnCommand::with_doc("Reply with pong", |host, _args| {
                host.tool_output("pong");
                Ok(())
            })),
        )
        .expect("register");

    let mut set = CommandSet::new();
    registry.install_into(&mut set);

    let mut host = RecordingHost::new();
    let outcome = set.dispatch(&mut host, "/ping").expect("dispatch");
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(host.outputs, vec!["pong"]);
    assert_eq!(host.outputs.len(), 1);
}
