use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use bytes::Bytes;
use oproxy_common::{ConfigSnapshot, ProviderProfile};
use oproxy_core::{ProxyError, SnapshotLoader};
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

const OWNED_BY: &str = "ollama-proxy";
const CONTEXT_LENGTH: u64 = 120_000;
const DEFAULT_PARAMETERS: &str = "# No specific parameters defined in proxy config";
const DEFAULT_TEMPLATE: &str =
    "{{ if .System }}System: {{ .System }}{{ end }}\nUser: {{ .Prompt }}\nAssistant: {{ .Response }}";

pub fn ollama_router(snapshot: SnapshotLoader) -> Router {
    Router::new()
        .route("/", any(health))
        .route("/v1/models", any(list_models))
        .route("/api/tags", any(list_tags))
        .route("/api/show", post(show_model))
        .with_state(snapshot)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "running", "message": "Ollama Proxy is active" }))
}

async fn list_models(State(snapshot): State<SnapshotLoader>) -> Json<Value> {
    let snapshot = snapshot();
    let created = OffsetDateTime::now_utc().unix_timestamp();
    Json(models_payload(&snapshot, created))
}

fn models_payload(snapshot: &ConfigSnapshot, created: i64) -> Value {
    let data = snapshot
        .profiles()
        .iter()
        .map(|profile| {
            json!({
                "id": profile.alias,
                "object": "model",
                "created": created,
                "owned_by": OWNED_BY,
            })
        })
        .collect::<Vec<_>>();
    json!({ "object": "list", "data": data })
}

async fn list_tags(State(snapshot): State<SnapshotLoader>) -> Json<Value> {
    let snapshot = snapshot();
    let modified_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(tags_payload(&snapshot, &modified_at))
}

fn tags_payload(snapshot: &ConfigSnapshot, modified_at: &str) -> Value {
    let models = snapshot
        .profiles()
        .iter()
        .map(|profile| {
            json!({
                "name": profile.alias,
                "model": profile.alias,
                "modified_at": modified_at,
                "size": 0,
                "digest": "",
                "details": {
                    "format": "proxy",
                    "family": "proxy",
                    "families": [],
                    "parameter_size": "N/A",
                    "quantization_level": "N/A",
                },
            })
        })
        .collect::<Vec<_>>();
    json!({ "models": models })
}

#[derive(Debug, Deserialize)]
struct ShowRequest {
    #[serde(default, alias = "name")]
    model: String,
}

async fn show_model(State(snapshot): State<SnapshotLoader>, body: Bytes) -> Response {
    let request: ShowRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            debug!(event = "show_rejected", error = %err);
            return ProxyError::bad_request("Invalid request body").into_response();
        }
    };
    let snapshot = snapshot();
    match snapshot
        .profiles()
        .iter()
        .find(|profile| profile.alias == request.model)
    {
        Some(profile) => Json(show_payload(profile)).into_response(),
        None => ProxyError::not_found(format!("model '{}' not found", request.model))
            .into_response(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn show_payload(profile: &ProviderProfile) -> Value {
    let modelfile = non_empty(profile.modelfile.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("# Modelfile for {} (proxied)\nFROM scratch", profile.alias));
    let parameters = non_empty(profile.parameters.as_deref()).unwrap_or(DEFAULT_PARAMETERS);
    let template = non_empty(profile.template.as_deref()).unwrap_or(DEFAULT_TEMPLATE);

    json!({
        "license": "",
        "modelfile": modelfile,
        "parameters": parameters,
        "template": template,
        "details": {
            "parent_model": "",
            "format": "proxy",
            "family": "proxy",
            "families": [],
            "parameter_size": "N/A",
            "quantization_level": "N/A",
        },
        "model_info": {
            "general.architecture": "llama",
            "general.name": profile.alias,
            "general.file_type": 2,
            "general.parameter_count": 0,
            "llama.context_length": CONTEXT_LENGTH,
            "llama.block_count": 0,
            "llama.embedding_length": 0,
            "llama.attention.head_count": 0,
            "llama.attention.head_count_kv": 0,
            "llama.attention.layer_norm_rms_epsilon": 0.00001,
            "llama.feed_forward_length": 0,
            "llama.rope.dimension_count": 0,
            "llama.rope.freq_base": 500000,
            "llama.vocab_size": 0,
            "tokenizer.ggml.model": "gpt2",
            "tokenizer.ggml.bos_token_id": 0,
            "tokenizer.ggml.eos_token_id": 0,
        },
        "capabilities": [],
    })
}
