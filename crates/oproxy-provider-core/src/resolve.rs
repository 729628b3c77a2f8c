use oproxy_common::{ConfigSnapshot, ProviderProfile};

use crate::errors::ResolveError;

/// Exact, case-sensitive alias lookup.
pub fn resolve<'a>(
    snapshot: &'a ConfigSnapshot,
    alias: &str,
) -> Result<&'a ProviderProfile, ResolveError> {
    snapshot
        .profiles()
        .iter()
        .find(|profile| profile.alias == alias)
        .ok_or_else(|| ResolveError::NotFound {
            alias: alias.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(aliases: &[&str]) -> ConfigSnapshot {
        let profiles = aliases
            .iter()
            .map(|alias| ProviderProfile {
                alias: alias.to_string(),
                provider: Some("groq".to_string()),
                base_url: None,
                upstream_model: format!("upstream-{alias}"),
                api_key: "k".to_string(),
                system_message: None,
                modelfile: None,
                parameters: None,
                template: None,
            })
            .collect();
        ConfigSnapshot::new(profiles).unwrap()
    }

    #[test]
    fn finds_exact_alias() {
        let snap = snapshot(&["llama", "qwen"]);
        let profile = resolve(&snap, "qwen").unwrap();
        assert_eq!(profile.upstream_model, "upstream-qwen");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let snap = snapshot(&["Qwen"]);
        assert_eq!(
            resolve(&snap, "qwen").unwrap_err(),
            ResolveError::NotFound {
                alias: "qwen".to_string()
            }
        );
    }

    #[test]
    fn no_prefix_matching() {
        let snap = snapshot(&["qwen-72b"]);
        assert!(resolve(&snap, "qwen").is_err());
        assert!(resolve(&snap, "qwen-72b-instruct").is_err());
    }

    #[test]
    fn not_found_message_names_alias() {
        let snap = snapshot(&[]);
        let err = resolve(&snap, "x").unwrap_err();
        assert_eq!(err.to_string(), "model 'x' not found");
    }
}
