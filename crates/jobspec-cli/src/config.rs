//! CLI configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Build spec used when a command is given no path.
    #[serde(default = "default_spec_path")]
    pub spec_path: String,
    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit logs as JSON.
    #[serde(default)]
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            spec_path: default_spec_path(),
            output_format: OutputFormat::default(),
            log_filter: default_log_filter(),
            log_json: false,
        }
    }
}

fn default_spec_path() -> String {
    ".jobspec.yml".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl CliConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("dev", "jobspec", "jobspec")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "spec_path" => self.spec_path = value.to_string(),
            "log_filter" => self.log_filter = value.to_string(),
            "log_json" => {
                self.log_json = value
                    .parse()
                    .map_err(|_| format!("Invalid boolean: {}", value))?;
            }
            "output_format" => {
                self.output_format = match value {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    "yaml" => OutputFormat::Yaml,
                    _ => return Err(format!("Invalid output format: {}", value)),
                };
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_known_keys() {
        let mut config = CliConfig::default();
        config.set("output_format", "json").unwrap();
        config.set("log_json", "true").unwrap();
        config.set("spec_path", "ci/jobs.yml").unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.log_json);
        assert_eq!(config.spec_path, "ci/jobs.yml");
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = CliConfig::default();
        assert!(config.set("output_format", "xml").is_err());
        assert!(config.set("log_json", "maybe").is_err());
        assert!(config.set("api_url", "http://x").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        assert_eq!(CliConfig::load_from(&path).unwrap(), CliConfig::default());

        let mut config = CliConfig::default();
        config.set("output_format", "yaml").unwrap();
        config.save_to(&path).unwrap();
        assert_eq!(CliConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: CliConfig = serde_yaml::from_str("log_json: true").unwrap();
        assert_eq!(config.spec_path, ".jobspec.yml");
        assert_eq!(config.log_filter, "warn");
    }
}
