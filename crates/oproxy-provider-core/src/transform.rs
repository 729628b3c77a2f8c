use oproxy_common::ProviderProfile;
use serde_json::{Map, Value, json};

/// Rewrites a chat request for the upstream: the alias in `model` becomes the
/// provider's model id, and the profile's system message is prepended when the
/// conversation has none. Every other field is left as received.
pub fn transform(mut body: Value, profile: &ProviderProfile) -> Value {
    let Some(object) = body.as_object_mut() else {
        return body;
    };

    object.insert(
        "model".to_string(),
        Value::String(profile.upstream_model.clone()),
    );

    if let Some(system_message) = profile.system_message.as_deref() {
        inject_system_message(object, system_message);
    }

    body
}

fn inject_system_message(object: &mut Map<String, Value>, system_message: &str) {
    if system_message.is_empty() {
        return;
    }
    let Some(Value::Array(messages)) = object.get_mut("messages") else {
        return;
    };
    let has_system = messages
        .iter()
        .any(|message| message.get("role").and_then(Value::as_str) == Some("system"));
    if !has_system {
        messages.insert(0, json!({ "role": "system", "content": system_message }));
    }
}
