use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, write};
use std::path::Path;
use thiserror::Error;
use wingman_shared::models::filter::CommandFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    /// Name of the model reported in context exports and snapshots
    pub model_name: Option<String>,
    /// Edit format the session's edit engine expects
    pub edit_format: Option<String>,
    /// Commit applied edits automatically
    pub auto_commit: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: Settings,
    /// Which extension commands get registered at startup
    #[serde(default)]
    pub commands: CommandFilter,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub model_name: String,
    pub edit_format: String,
    pub auto_commit: bool,
    pub commands: CommandFilter,
    /// Path to the config file (used for saving)
    pub config_path: String,
}

fn get_config_path(custom_path: Option<&str>) -> String {
    custom_path.map(|p| p.to_string()).unwrap_or_else(|| {
        let home = dirs::home_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());
        format!("{home}/.wingman/config.toml")
    })
}

impl AppConfig {
    pub fn load(custom_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = get_config_path(custom_config_path);

        let config_file = if Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<ConfigFile>(&content)?
        } else {
            ConfigFile::default()
        };

        let model_name = std::env::var("WINGMAN_MODEL")
            .ok()
            .or(config_file.settings.model_name)
            .unwrap_or_else(|| "default".to_string());
        let edit_format = std::env::var("WINGMAN_EDIT_FORMAT")
            .ok()
            .or(config_file.settings.edit_format)
            .unwrap_or_else(|| "whole".to_string());
        let auto_commit = config_file.settings.auto_commit.unwrap_or(false);

        Ok(AppConfig {
            model_name,
            edit_format,
            auto_commit,
            commands: config_file.commands,
            config_path,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_file = ConfigFile {
            settings: Settings {
                model_name: Some(self.model_name.clone()),
                edit_format: Some(self.edit_format.clone()),
                auto_commit: Some(self.auto_commit),
            },
            commands: self.commands.clone(),
        };

        if let Some(parent) = Path::new(&self.config_path).parent() {
            create_dir_all(parent)?;
        }
        let config_str = toml::to_string_pretty(&config_file)?;
        write(&self.config_path, config_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_parsing() {
        let config_content = r#"
[settings]
model_name = "gpt-4o"
edit_format = "whole"
auto_commit = true

[commands]
include = ["glog", "context-*"]
exclude = ["*-experimental"]
"#;
        let config: ConfigFile = toml::from_str(config_content).expect("parse");
        assert_eq!(config.settings.model_name.as_deref(), Some("gpt-4o"));
        assert_eq!(config.settings.auto_commit, Some(true));
        assert!(config.commands.should_load("glog"));
        assert!(config.commands.should_load("context-backup"));
        assert!(!config.commands.should_load("stats"));
    }

    #[test]
    fn test_empty_config_gets_defaults() {
        let config: ConfigFile = toml::from_str("").expect("parse");
        assert!(config.settings.model_name.is_none());
        assert!(config.commands.should_load("anything"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        let config =
            AppConfig::load(Some(&path.to_string_lossy())).expect("load");
        assert_eq!(config.edit_format, "whole");
        assert!(!config.auto_commit);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("nested").join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        let mut config = AppConfig::load(Some(&path_str)).expect("load");
        config.model_name = "custom".to_string();
        config.auto_commit = true;
        config.save().expect("save");

        let reloaded = AppConfig::load(Some(&path_str)).expect("reload");
        assert_eq!(reloaded.model_name, "custom");
        assert!(reloaded.auto_commit);
    }
}
