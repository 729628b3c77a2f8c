use oproxy_common::ProviderProfile;

use crate::errors::LocateError;

/// Built-in provider short names and their OpenAI-compatible base URLs.
///
/// `groq` resolves to the SiliconFlow endpoint.
pub const PROVIDER_BASE_URLS: &[(&str, &str)] = &[
    ("novita", "https://api.novita.ai/v3/openai"),
    ("siliconflow", "https://api.siliconflow.cn/v1"),
    ("groq", "https://api.siliconflow.cn/v1"),
    ("xAI", "https://api.x.ai/v1"),
    ("gemini", "https://generativelanguage.googleapis.com/v1beta/openai"),
];

pub fn provider_base_url(provider: &str) -> Option<&'static str> {
    PROVIDER_BASE_URLS
        .iter()
        .find(|(name, _)| *name == provider)
        .map(|(_, url)| *url)
}

/// Base URL for `profile`: an explicit `baseUrl` wins, then the provider table.
pub fn locate(profile: &ProviderProfile) -> Result<&str, LocateError> {
    if let Some(base_url) = profile.base_url.as_deref()
        && !base_url.is_empty()
    {
        return Ok(base_url);
    }

    profile
        .provider
        .as_deref()
        .and_then(provider_base_url)
        .ok_or_else(|| LocateError::UnknownProvider {
            alias: profile.alias.clone(),
            provider: profile.provider.clone(),
        })
}

pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}
