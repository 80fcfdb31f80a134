//! `/template`: parameterized multi-step command templates.
//!
//! Templates are JSON files in the data directory's `command_templates/`
//! folder:
//!
//! ```json
//! {
//!     "description": "Scaffold a new API endpoint",
//!     "parameters": [
//!         {"name": "endpoint_name", "default": "users"},
//!         "http_method"
//!     ],
//!     "commands": [
//!         "/add api/{endpoint_name}.py",
//!         "Create a {http_method} endpoint at /{endpoint_name}"
//!     ]
//! }
//! ```
//!
//! Lines starting with `/` re-enter the host's command dispatch; bare
//! lines are sent as chat messages. Templates can also be registered as
//! first-class commands at startup via [`register_template_commands`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use wingman_registry::{
    CommandHandler, CommandRegistry, CommandResult, CompletionProvider, HostContext, HostResult,
    RegistryError,
};
use wingman_shared::data_dir::DataDir;

use crate::CommandSpec;

/// A template parameter: either a bare name or a name with a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateParam {
    Name(String),
    WithDefault {
        name: String,
        #[serde(default)]
        default: String,
    },
}

impl TemplateParam {
    pub fn name(&self) -> &str {
        match self {
            TemplateParam::Name(name) => name,
            TemplateParam::WithDefault { name, .. } => name,
        }
    }

    pub fn default(&self) -> &str {
        match self {
            TemplateParam::Name(_) => "",
            TemplateParam::WithDefault { default, .. } => default,
        }
    }
}

/// A parsed command template.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandTemplate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<TemplateParam>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl CommandTemplate {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&raw).map_err(|e| format!("invalid JSON: {e}"))
    }
}

/// Substitute `{param}` placeholders in every command line. Any leftover
/// placeholder means a parameter the template forgot to declare.
pub(crate) fn render_commands(
    commands: &[String],
    values: &HashMap<String, String>,
) -> Result<Vec<String>, String> {
    let leftover = Regex::new(r"\{(\w+)\}").map_err(|e| e.to_string())?;
    let mut rendered = Vec::with_capacity(commands.len());
    for command in commands {
        let mut line = command.clone();
        for (name, value) in values {
            line = line.replace(&format!("{{{name}}}"), value);
        }
        if let Some(caps) = leftover.captures(&line) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            return Err(format!("Missing parameter {{{name}}} in template"));
        }
        rendered.push(line);
    }
    Ok(rendered)
}

/// Prompt for each declared parameter. Returns `None` when the user
/// aborts or leaves a defaultless parameter empty.
fn collect_values(
    host: &mut dyn HostContext,
    parameters: &[TemplateParam],
) -> HostResult<Option<HashMap<String, String>>> {
    let mut values = HashMap::new();
    for param in parameters {
        let default = param.default();
        let prompt = if default.is_empty() {
            format!("Enter value for {}", param.name())
        } else {
            format!("Enter value for {} [{}]", param.name(), default)
        };
        let answer = host.prompt_ask(&prompt, Some(default))?;
        match answer {
            Some(value) if !value.trim().is_empty() => {
                values.insert(param.name().to_string(), value.trim().to_string());
            }
            Some(_) if !default.is_empty() => {
                values.insert(param.name().to_string(), default.to_string());
            }
            _ => return Ok(None),
        }
    }
    Ok(Some(values))
}

fn execute_lines(host: &mut dyn HostContext, lines: &[String]) -> CommandResult {
    for line in lines {
        if line.starts_with('/') {
            host.run_command(line)?;
        } else {
            host.send_message(line)?;
        }
    }
    Ok(())
}

fn run_template(host: &mut dyn HostContext, template: &CommandTemplate) -> CommandResult {
    let Some(values) = collect_values(host, &template.parameters)? else {
        host.tool_output("Template aborted");
        return Ok(());
    };
    let rendered = match render_commands(&template.commands, &values) {
        Ok(rendered) => rendered,
        Err(reason) => {
            host.tool_error(&reason);
            return Ok(());
        }
    };
    execute_lines(host, &rendered)
}

/// Template file stems available under `dir`, sorted.
pub(crate) fn available_templates(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "json"))
        .filter_map(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .collect();
    names.sort();
    names
}

const TEMPLATE_DOC: &str = "Load and execute a parameterized command template
    Usage: /template <template_name>

    Loads <template_name>.json from the command_templates directory,
    prompts for parameter values, and executes the commands. With no
    argument, lists available templates.";

struct LoadTemplate;

impl CommandHandler for LoadTemplate {
    fn doc(&self) -> Option<&str> {
        Some(TEMPLATE_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let templates_dir = DataDir::new(&host.root()).templates();
        let name = args.trim();

        let template_path = templates_dir.join(format!("{name}.json"));
        if name.is_empty() || !template_path.exists() {
            if !name.is_empty() {
                host.tool_error(&format!("Template {name} not found"));
            }
            let available = available_templates(&templates_dir);
            if available.is_empty() {
                host.tool_output(&format!(
                    "No templates found in {}",
                    templates_dir.display()
                ));
            } else {
                host.tool_output("\nAvailable templates:");
                for template in available {
                    host.tool_output(&format!("  {template}"));
                }
            }
            return Ok(());
        }

        let template = match CommandTemplate::load(&template_path) {
            Ok(template) => template,
            Err(reason) => {
                host.tool_error(&format!("Error loading template {name}: {reason}"));
                return Ok(());
            }
        };
        run_template(host, &template)
    }
}

/// Completes to template names in the templates directory.
struct TemplateCompletions;

impl CompletionProvider for TemplateCompletions {
    fn candidates(&self, host: &dyn HostContext) -> Vec<String> {
        available_templates(&DataDir::new(&host.root()).templates())
    }
}

pub(crate) fn template() -> CommandSpec {
    CommandSpec {
        name: "template",
        handler: Arc::new(LoadTemplate),
        completions: Some(Arc::new(TemplateCompletions)),
    }
}

/// A template registered as a first-class command.
struct TemplatedCommand {
    doc: String,
    template: CommandTemplate,
}

impl CommandHandler for TemplatedCommand {
    fn doc(&self) -> Option<&str> {
        Some(&self.doc)
    }

    fn validate(&self) -> Result<(), String> {
        if self.template.commands.is_empty() {
            return Err("template has no command lines".to_string());
        }
        Ok(())
    }

    fn run(&self, host: &mut dyn HostContext, _args: &str) -> CommandResult {
        run_template(host, &self.template)
    }
}

/// Register every template under `dir` as its own command, named after
/// the file stem. Broken templates are skipped with a warning so one bad
/// file never takes down the rest; the count of registered commands is
/// returned.
pub fn register_template_commands(registry: &CommandRegistry, dir: &Path) -> usize {
    let mut registered = 0;
    for name in available_templates(dir) {
        let path: PathBuf = dir.join(format!("{name}.json"));
        let template = match CommandTemplate::load(&path) {
            Ok(template) => template,
            Err(reason) => {
                tracing::warn!(template = %name, %reason, "skipping unreadable template");
                continue;
            }
        };
        let doc = template
            .description
            .clone()
            .unwrap_or_else(|| format!("Run the {name} command template"));
        let handler = Arc::new(TemplatedCommand { doc, template });
        match registry.register(&name, handler) {
            Ok(()) => registered += 1,
            Err(err @ RegistryError::InvalidHandler { .. }) => {
                tracing::warn!(template = %name, error = %err, "skipping invalid template");
            }
            Err(err) => {
                tracing::warn!(template = %name, error = %err, "failed to register template");
            }
        }
    }
    registered
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_registry::testing::RecordingHost;
    use wingman_registry::{CommandSet, FnCommand};

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_template(dir: &Path, name: &str, json: &str) {
        DataDir::ensure(dir.to_path_buf()).expect("ensure");
        std::fs::write(dir.join(format!("{name}.json")), json).expect("write template");
    }

    #[test]
    fn test_render_commands_substitutes_parameters() {
        let commands = vec![
            "/add api/{endpoint}.py".to_string(),
            "Create a {method} endpoint at /{endpoint}".to_string(),
        ];
        let rendered = render_commands(
            &commands,
            &values(&[("endpoint", "products"), ("method", "POST")]),
        )
        .expect("render");
        assert_eq!(
            rendered,
            vec![
                "/add api/products.py".to_string(),
                "Create a POST endpoint at /products".to_string(),
            ]
        );
    }

    #[test]
    fn test_render_commands_rejects_missing_parameter() {
        let commands = vec!["/add {endpoint}".to_string()];
        let err = render_commands(&commands, &values(&[])).expect_err("must fail");
        assert!(err.contains("{endpoint}"));
    }

    #[test]
    fn test_template_param_shapes_parse() {
        let template: CommandTemplate = serde_json::from_str(
            r#"{
                "parameters": ["plain", {"name": "with_default", "default": "yes"}],
                "commands": ["/files"]
            }"#,
        )
        .expect("parse");
        assert_eq!(template.parameters[0].name(), "plain");
        assert_eq!(template.parameters[1].name(), "with_default");
        assert_eq!(template.parameters[1].default(), "yes");
    }

    #[test]
    fn test_template_executes_commands_and_messages() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let templates_dir = DataDir::new(tmp.path()).templates();
        write_template(
            &templates_dir,
            "new_api",
            r#"{
                "parameters": [{"name": "endpoint", "default": "users"}],
                "commands": [
                    "/marker api/{endpoint}.py",
                    "Create the {endpoint} endpoint"
                ]
            }"#,
        );

        let mut set = CommandSet::new();
        set.bind(
            "marker",
            Arc::new(FnCommand::new(|host, args| {
                host.tool_output(&format!("marker: {args}"));
                Ok(())
            })),
        );
        let mut host = RecordingHost::new()
            .with_root(tmp.path())
            .with_command_set(Arc::new(set));
        host.prompt_answers.push_back(Some("products".to_string()));

        LoadTemplate.run(&mut host, "new_api").expect("run");
        assert_eq!(host.output_text(), "marker: api/products.py");
        assert_eq!(host.sent, vec!["Create the products endpoint"]);
    }

    #[test]
    fn test_template_listing_when_name_unknown() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let templates_dir = DataDir::new(tmp.path()).templates();
        write_template(&templates_dir, "alpha", r#"{"commands": ["/files"]}"#);

        let mut host = RecordingHost::new().with_root(tmp.path());
        LoadTemplate.run(&mut host, "missing").expect("run");
        assert!(host.error_text().contains("Template missing not found"));
        assert!(host.output_text().contains("alpha"));
    }

    #[test]
    fn test_template_abort_on_empty_required_parameter() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let templates_dir = DataDir::new(tmp.path()).templates();
        write_template(
            &templates_dir,
            "needs_param",
            r#"{"parameters": ["required"], "commands": ["/files {required}"]}"#,
        );

        let mut host = RecordingHost::new().with_root(tmp.path());
        host.prompt_answers.push_back(Some("".to_string()));
        LoadTemplate.run(&mut host, "needs_param").expect("run");
        assert!(host.ran.is_empty());
        assert!(host.output_text().contains("Template aborted"));
    }

    #[test]
    fn test_register_template_commands_skips_empty_templates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let templates_dir = DataDir::new(tmp.path()).templates();
        write_template(
            &templates_dir,
            "good",
            r#"{"description": "A good template", "commands": ["/files"]}"#,
        );
        write_template(&templates_dir, "empty", r#"{"commands": []}"#);
        write_template(&templates_dir, "broken", "not json at all");

        let registry = CommandRegistry::new();
        let registered = register_template_commands(&registry, &templates_dir);
        assert_eq!(registered, 1);
        assert_eq!(registry.list_commands(), vec!["good".to_string()]);
        assert_eq!(registry.get_description("good"), "A good template");
    }
}
