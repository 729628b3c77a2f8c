use std::fs;
use std::path::Path;

use anyhow::Context;
use oproxy_common::{ConfigError, ConfigSnapshot, ProviderProfile, ServerConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// On-disk layout of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub(crate) server: ServerConfig,
    #[serde(default)]
    pub(crate) models: Vec<ProviderProfile>,
}

impl AppConfig {
    pub(crate) fn snapshot(&self) -> Result<ConfigSnapshot, ConfigError> {
        ConfigSnapshot::new(self.models.clone())
    }

    fn example() -> Self {
        Self {
            server: ServerConfig::default(),
            models: vec![ProviderProfile {
                alias: "example-model".to_string(),
                provider: None,
                base_url: Some("https://api.openai.com/v1".to_string()),
                upstream_model: "gpt-4o-mini".to_string(),
                api_key: "your_api_key_here".to_string(),
                system_message: Some("You are a helpful assistant.".to_string()),
                modelfile: None,
                parameters: None,
                template: None,
            }],
        }
    }
}

pub(crate) fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    serde_yaml_ng::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
}

/// Loads `path`, writing and returning the example config first when it does not exist.
pub(crate) fn load_or_create(path: &Path) -> anyhow::Result<AppConfig> {
    if path.exists() {
        return load(path);
    }
    info!(path = %path.display(), "config file not found, creating default");
    Ok(create_default(path))
}

fn create_default(path: &Path) -> AppConfig {
    let config = AppConfig::example();
    let written = serde_yaml_ng::to_string(&config)
        .map_err(anyhow::Error::from)
        .and_then(|yaml| fs::write(path, yaml).map_err(anyhow::Error::from));
    match written {
        Ok(()) => {
            info!(path = %path.display(), "created default config file");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to create default config");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_file_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
server:
  port: 12000
  hostname: 0.0.0.0
  maxPortAttempts: 3
models:
  - name: fast
    provider: novita
    model: meta-llama/llama-3.1-8b-instruct
    apiKey: nk-1
  - name: smart
    baseUrl: https://api.example.test/v1
    model: big-model
    apiKey: sk-2
    systemMessage: Answer briefly.
    template: "{{ .Prompt }}"
"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server.port, 12000);
        assert_eq!(config.server.hostname, "0.0.0.0");
        assert_eq!(config.server.max_port_attempts, 3);
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].provider.as_deref(), Some("novita"));
        assert_eq!(config.models[1].alias, "smart");
        assert_eq!(config.models[1].system_message.as_deref(), Some("Answer briefly."));
        assert_eq!(config.models[1].template.as_deref(), Some("{{ .Prompt }}"));
        assert_eq!(config.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn missing_server_section_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "models:\n  - name: a\n    provider: xAI\n    model: grok\n    apiKey: k\n",
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.server.port, 11434);
    }

    #[test]
    fn missing_file_writes_example() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.models[0].alias, "example-model");
        assert!(path.exists());
        assert_eq!(load(&path).unwrap(), config);
    }

    #[test]
    fn unwritable_default_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("config.yaml");

        let config = load_or_create(&path).unwrap();
        assert!(config.models.is_empty());
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "models: [unterminated").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn duplicate_alias_is_rejected_at_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "models:\n  - {name: a, provider: xAI, model: grok, apiKey: k}\n  - {name: a, provider: xAI, model: grok, apiKey: k}\n",
        )
        .unwrap();
        assert!(load(&path).unwrap().snapshot().is_err());
    }
}
