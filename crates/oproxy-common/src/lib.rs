use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate model alias in config: {0}")]
    DuplicateAlias(String),
    #[error("model alias must not be empty")]
    EmptyAlias,
}

/// Listener and upstream-client settings (`server:` section of the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Extra ports tried after `port` when the address is already in use.
    #[serde(default = "default_max_port_attempts")]
    pub max_port_attempts: u16,
    /// Optional outbound proxy (for upstream egress).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            hostname: default_hostname(),
            max_port_attempts: default_max_port_attempts(),
            proxy: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    11434
}

fn default_hostname() -> String {
    "127.0.0.1".to_string()
}

fn default_max_port_attempts() -> u16 {
    20
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    600
}

/// One configured model alias and the upstream it is served by.
///
/// Field names on disk follow the gateway's config file: the alias is `name` and
/// the upstream model id is `model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    #[serde(rename = "name")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "model")]
    pub upstream_model: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modelfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Immutable set of profiles valid until the next reload.
///
/// Aliases are unique; a new snapshot is built for every reload and published as a
/// whole, so readers holding an `Arc<ConfigSnapshot>` never see a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    profiles: Vec<ProviderProfile>,
}

impl ConfigSnapshot {
    pub fn new(profiles: Vec<ProviderProfile>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if profile.alias.is_empty() {
                return Err(ConfigError::EmptyAlias);
            }
            if !seen.insert(profile.alias.as_str()) {
                return Err(ConfigError::DuplicateAlias(profile.alias.clone()));
            }
        }
        Ok(Self { profiles })
    }

    pub fn profiles(&self) -> &[ProviderProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(alias: &str) -> ProviderProfile {
        ProviderProfile {
            alias: alias.to_string(),
            provider: Some("novita".to_string()),
            base_url: None,
            upstream_model: "m".to_string(),
            api_key: "k".to_string(),
            system_message: None,
            modelfile: None,
            parameters: None,
            template: None,
        }
    }

    #[test]
    fn snapshot_rejects_duplicate_alias() {
        let err = ConfigSnapshot::new(vec![profile("a"), profile("b"), profile("a")]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAlias(alias) if alias == "a"));
    }

    #[test]
    fn snapshot_aliases_differing_in_case_are_distinct() {
        let snapshot = ConfigSnapshot::new(vec![profile("Model"), profile("model")]).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn snapshot_rejects_empty_alias() {
        assert!(matches!(
            ConfigSnapshot::new(vec![profile("")]),
            Err(ConfigError::EmptyAlias)
        ));
    }

    #[test]
    fn profile_uses_config_file_field_names() {
        let profile: ProviderProfile = serde_json::from_value(serde_json::json!({
            "name": "gpt-x",
            "baseUrl": "https://example.test/v1",
            "model": "gpt-4o-mini",
            "apiKey": "secret",
            "systemMessage": "be nice"
        }))
        .unwrap();
        assert_eq!(profile.alias, "gpt-x");
        assert_eq!(profile.base_url.as_deref(), Some("https://example.test/v1"));
        assert_eq!(profile.upstream_model, "gpt-4o-mini");
        assert_eq!(profile.api_key, "secret");
        assert_eq!(profile.system_message.as_deref(), Some("be nice"));
        assert_eq!(profile.provider, None);
    }

    #[test]
    fn server_config_fills_defaults() {
        let server: ServerConfig = serde_json::from_value(serde_json::json!({ "port": 9000 })).unwrap();
        assert_eq!(server.port, 9000);
        assert_eq!(server.hostname, "127.0.0.1");
        assert_eq!(server.max_port_attempts, 20);
        assert_eq!(server.proxy, None);
    }
}
