use std::env;
use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wingman_commands::register_template_commands;
use wingman_registry::{CommandRegistry, CommandSet};
use wingman_shared::data_dir::DataDir;

mod builtins;
mod config;
mod edits;
mod session;

use builtins::bind_builtins;
use config::AppConfig;
use session::Session;

#[derive(Parser, PartialEq)]
#[command(name = "wingman", version)]
#[command(about = "Extension commands for AI pair-programming sessions", long_about = None)]
struct Cli {
    /// Run in a specific directory
    #[arg(short = 'w', long = "workdir")]
    workdir: Option<String>,

    /// Use a specific config file
    #[arg(long = "config", env = "WINGMAN_CONFIG")]
    config_path: Option<String>,

    /// Enable debug output
    #[arg(long = "debug", default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, PartialEq)]
enum Commands {
    /// List registered extension commands with their descriptions
    #[command(name = "commands", alias = "ls")]
    Commands,
    /// Show the resolved configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    if let Some(workdir) = &cli.workdir {
        let workdir = Path::new(workdir);
        if let Err(e) = env::set_current_dir(workdir) {
            eprintln!("Failed to set current directory: {}", e);
            std::process::exit(1);
        }
    }

    if cli.debug {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    format!(
                        "error,{}=debug,wingman_registry=debug,wingman_commands=debug",
                        env!("CARGO_CRATE_NAME")
                    )
                    .into()
                }),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = match AppConfig::load(cli.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let root = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve working directory: {e}");
            std::process::exit(1);
        }
    };

    // Populate the registry: bundled extension commands first, then the
    // workspace's template-backed commands.
    let registry = CommandRegistry::new();
    if let Err(e) = wingman_commands::register_all(&registry, Some(&config.commands)) {
        eprintln!("Failed to register commands: {e}");
        std::process::exit(1);
    }
    let template_count =
        register_template_commands(&registry, &DataDir::new(&root).templates());
    tracing::debug!(count = template_count, "registered template commands");

    match cli.command {
        Some(Commands::Commands) => {
            for name in registry.list_commands() {
                let description = registry.get_description(&name);
                let summary = description.lines().next().unwrap_or_default();
                println!("/{name:<18} {summary}");
            }
        }
        Some(Commands::Config) => {
            println!("config file:  {}", config.config_path);
            println!("model:        {}", config.model_name);
            println!("edit format:  {}", config.edit_format);
            println!("auto commit:  {}", config.auto_commit);
            println!(
                "include:      {}",
                config
                    .commands
                    .include
                    .as_ref()
                    .map(|p| p.join(", "))
                    .unwrap_or_else(|| "(all)".to_string())
            );
            println!(
                "exclude:      {}",
                config
                    .commands
                    .exclude
                    .as_ref()
                    .map(|p| p.join(", "))
                    .unwrap_or_else(|| "(none)".to_string())
            );
        }
        None => {
            // Controller construction: built-ins first so collisions
            // resolve in their favor, then install the registry.
            let mut set = CommandSet::new();
            bind_builtins(&mut set);
            registry.install_into(&mut set);

            let mut session = Session::new(root, &config, Arc::new(set));
            if let Err(e) = session.run_loop() {
                eprintln!("Session error: {e}");
                std::process::exit(1);
            }
        }
    }
}
