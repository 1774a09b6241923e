use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE: &str = ".diagramdoctor.yml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    pub ignore: Option<IgnoreConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    pub rules: Option<Vec<String>>,
}

fn default_command() -> String {
    "claude".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-p".to_string()]
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads `.diagramdoctor.yml` from `dir`, falling back to defaults.
    pub fn load(dir: &Path) -> Self {
        Self::load_file(&dir.join(CONFIG_FILE))
    }

    pub fn load_file(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_yaml::from_str::<Config>(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "invalid config, using defaults"),
                },
                Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "unreadable config, using defaults"),
            }
        }
        Config::default()
    }

    pub fn ignored_rules(&self) -> Vec<String> {
        self.ignore
            .as_ref()
            .and_then(|i| i.rules.clone())
            .unwrap_or_default()
    }
}

pub fn default_config_yaml() -> String {
    format!(
        r#"# diagram-doctor configuration

# Model CLI used by `diagram-doctor repair`. The prompt is written to stdin.
model:
  command: {command}
  args: [{args}]
  timeout_secs: {timeout}

# Diagram rules to skip
ignore:
  rules: []
    # - MMD-005  # Example: allow brace/bracket adjacency
"#,
        command = default_command(),
        args = default_args()
            .iter()
            .map(|a| format!("\"{}\"", a))
            .collect::<Vec<_>>()
            .join(", "),
        timeout = default_timeout_secs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path());
        assert_eq!(config.model.command, "claude");
        assert_eq!(config.model.args, vec!["-p".to_string()]);
        assert_eq!(config.model.timeout(), Duration::from_secs(300));
        assert!(config.ignored_rules().is_empty());
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = TempDir::new().unwrap();
        let yaml = "model:\n  command: gemini\n  timeout_secs: 30\nignore:\n  rules:\n    - MMD-005\n";
        fs::write(tmp.path().join(CONFIG_FILE), yaml).unwrap();
        let config = Config::load(tmp.path());
        assert_eq!(config.model.command, "gemini");
        assert_eq!(config.model.args, vec!["-p".to_string()]);
        assert_eq!(config.model.timeout_secs, 30);
        assert_eq!(config.ignored_rules(), vec!["MMD-005".to_string()]);
    }

    #[test]
    fn test_invalid_yaml_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "model: [not, a, map").unwrap();
        let config = Config::load(tmp.path());
        assert_eq!(config.model.command, "claude");
    }

    #[test]
    fn test_generated_yaml_parses() {
        let config: Config = serde_yaml::from_str(&default_config_yaml()).unwrap();
        assert_eq!(config.model.command, "claude");
        assert_eq!(config.model.args, vec!["-p".to_string()]);
        assert!(config.ignored_rules().is_empty());
    }
}
