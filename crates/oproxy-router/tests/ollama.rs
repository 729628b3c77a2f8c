use std::sync::Arc;

use http::{Method, StatusCode};
use oproxy_common::{ConfigSnapshot, ProviderProfile};
use oproxy_core::{Core, SnapshotStore, UpstreamClientConfig, WreqUpstreamClient};
use oproxy_router::gateway_router;
use serde_json::{Value, json};
use wreq::Client;

fn profile(alias: &str) -> ProviderProfile {
    ProviderProfile {
        alias: alias.to_string(),
        provider: Some("novita".to_string()),
        base_url: None,
        upstream_model: "upstream-model".to_string(),
        api_key: "k".to_string(),
        system_message: None,
        modelfile: None,
        parameters: Some("temperature 0.1".to_string()),
        template: None,
    }
}

async fn spawn_gateway(aliases: &[&str]) -> (String, Arc<SnapshotStore>) {
    let profiles = aliases.iter().map(|alias| profile(alias)).collect();
    let store = Arc::new(SnapshotStore::new(ConfigSnapshot::new(profiles).unwrap()));
    let client = WreqUpstreamClient::new(UpstreamClientConfig::default()).unwrap();
    let core = Core::new(store.loader(), Arc::new(client));
    let app = gateway_router(&core);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), store)
}

async fn call(method: Method, url: String, body: Option<&str>) -> (StatusCode, String, Vec<u8>) {
    let client = Client::builder().build().unwrap();
    let mut builder = client.request(method, url);
    if let Some(body) = body {
        builder = builder.body(body.to_string());
    }
    let resp = builder.send().await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = resp.bytes().await.unwrap().to_vec();
    (status, content_type, body)
}

fn as_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn health_reports_running() {
    let (base, _store) = spawn_gateway(&[]).await;
    let (status, content_type, body) = call(Method::GET, format!("{base}/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(
        as_json(&body),
        json!({ "status": "running", "message": "Ollama Proxy is active" })
    );
}

#[tokio::test]
async fn listings_answer_any_method() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;

    let (status, _, body) = call(Method::POST, format!("{base}/"), Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["status"], "running");

    let (status, _, body) = call(Method::POST, format!("{base}/api/tags"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["models"][0]["name"], "gpt-x");

    let (status, _, body) = call(Method::DELETE, format!("{base}/v1/models"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["data"][0]["id"], "gpt-x");
}

#[tokio::test]
async fn models_list_aliases() {
    let (base, _store) = spawn_gateway(&["first", "second"]).await;
    let (status, _, body) = call(Method::GET, format!("{base}/v1/models"), None).await;
    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    let ids = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["first", "second"]);
}

#[tokio::test]
async fn tags_carry_rfc3339_timestamp() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;
    let (status, _, body) = call(Method::GET, format!("{base}/api/tags"), None).await;
    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    let tag = &body["models"][0];
    assert_eq!(tag["name"], "gpt-x");
    let modified_at = tag["modified_at"].as_str().unwrap();
    assert!(
        time::OffsetDateTime::parse(modified_at, &time::format_description::well_known::Rfc3339)
            .is_ok()
    );
}

#[tokio::test]
async fn show_returns_descriptor() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;
    let (status, _, body) = call(
        Method::POST,
        format!("{base}/api/show"),
        Some(r#"{"model":"gpt-x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    assert_eq!(body["parameters"], "temperature 0.1");
    assert_eq!(body["model_info"]["general.name"], "gpt-x");
    assert_eq!(body["capabilities"], json!([]));
}

#[tokio::test]
async fn show_unknown_model_is_not_found() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;
    let (status, content_type, body) = call(
        Method::POST,
        format!("{base}/api/show"),
        Some(r#"{"model":"nope"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type, "application/json");
    assert_eq!(as_json(&body), json!({ "error": "model 'nope' not found" }));
}

#[tokio::test]
async fn show_rejects_unparseable_body() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;
    let (status, _, body) =
        call(Method::POST, format!("{base}/api/show"), Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body), json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn listings_follow_reloads() {
    let (base, store) = spawn_gateway(&["old"]).await;
    store.replace(ConfigSnapshot::new(vec![profile("new")]).unwrap());
    let (_, _, body) = call(Method::GET, format!("{base}/v1/models"), None).await;
    let body = as_json(&body);
    assert_eq!(body["data"][0]["id"], "new");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_path_is_plain_not_found() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;
    let (status, _, body) = call(Method::GET, format!("{base}/api/pull"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Not Found");
}

#[tokio::test]
async fn wrong_method_is_not_found() {
    let (base, _store) = spawn_gateway(&["gpt-x"]).await;
    let (status, _, body) = call(Method::GET, format!("{base}/api/show"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Not Found");
}
