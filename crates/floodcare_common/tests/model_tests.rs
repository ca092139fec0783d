//! Model tier tests against an in-process OpenAI-compatible endpoint
//!
//! Covers the request the client sends and how each kind of answer reaches
//! the classifier and the advice chat.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use floodcare_common::advice::{advise, ADVICE_FALLBACK};
use floodcare_common::classifier::{
    AssessmentSource, ModelClassifier, RiskClassifier, TieredClassifier,
};
use floodcare_common::config::ClassifierConfig;
use floodcare_common::model_client::{ChatTurn, ModelClient};
use floodcare_common::{Category, FloodError, RiskLevel};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned answer plus every request seen as (authorization, body)
struct FakeModel {
    status: StatusCode,
    content: Value,
    seen: Mutex<Vec<(Option<String>, Value)>>,
}

async fn complete(
    State(fake): State<Arc<FakeModel>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.seen.lock().unwrap().push((auth, body));

    let answer = json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": fake.content}}]
    });
    (fake.status, Json(answer))
}

async fn spawn_model(status: StatusCode, content: Value) -> (ModelClient, Arc<FakeModel>) {
    let fake = Arc::new(FakeModel { status, content, seen: Mutex::new(Vec::new()) });
    let app = Router::new()
        .route("/v1/chat/completions", post(complete))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClassifierConfig {
        enabled: true,
        endpoint: format!("http://{}/", addr),
        model: "flood-triage".to_string(),
        api_key: Some("s3cret".to_string()),
        timeout_secs: 5,
    };
    (ModelClient::new(config).unwrap(), fake)
}

fn tiered(client: ModelClient) -> TieredClassifier {
    TieredClassifier::with_external(Arc::new(ModelClassifier::new(client)), Duration::from_secs(5))
}

#[tokio::test]
async fn test_model_answer_drives_assessment() {
    let answer = json!({"riskLevel": "DANGER", "summary": "water entering ground floor"});
    let (client, fake) = spawn_model(StatusCode::OK, Value::String(answer.to_string())).await;

    let assessment = tiered(client).assess("น้ำเข้าชั้นล่างแล้ว", Category::Other).await;
    assert_eq!(assessment.risk_level, RiskLevel::High);
    assert_eq!(assessment.source, AssessmentSource::Model);
    assert_eq!(assessment.summary.as_deref(), Some("water entering ground floor"));

    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer s3cret"));
    assert_eq!(body["model"], "flood-triage");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"].as_str().unwrap().contains("น้ำเข้าชั้นล่างแล้ว"));
}

#[tokio::test]
async fn test_fenced_model_answer_is_accepted() {
    let fenced = "```json\n{\"riskLevel\": \"CRITICAL\", \"summary\": \"student unconscious\"}\n```";
    let (client, _fake) = spawn_model(StatusCode::OK, Value::String(fenced.to_string())).await;

    let assessment = tiered(client).assess("เพื่อนหมดสติ", Category::Other).await;
    assert_eq!(assessment.risk_level, RiskLevel::Critical);
    assert_eq!(assessment.source, AssessmentSource::Model);
}

#[tokio::test]
async fn test_server_error_degrades_to_medium() {
    let (client, _fake) = spawn_model(StatusCode::INTERNAL_SERVER_ERROR, json!("{}")).await;

    let err = client.complete_text("sys", &[ChatTurn::user("hi")]).await.unwrap_err();
    match err {
        FloodError::Model(message) => assert!(message.contains("500")),
        other => panic!("unexpected error: {:?}", other),
    }

    let assessment = tiered(client).assess("ติดอยู่บนหลังคา", Category::Evacuation).await;
    assert_eq!(assessment.risk_level, RiskLevel::Medium);
    assert_eq!(assessment.source, AssessmentSource::Degraded);
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let (client, _fake) = spawn_model(StatusCode::OK, json!("   ")).await;

    let err = client.complete_json("sys", "hi").await.unwrap_err();
    assert!(matches!(err, FloodError::Model(_)));

    let reply = advise(&client, &[], "น้ำขึ้นแล้วทำอย่างไร").await;
    assert_eq!(reply, ADVICE_FALLBACK);
}

#[tokio::test]
async fn test_advice_reply_and_history() {
    let (client, fake) =
        spawn_model(StatusCode::OK, json!("  Move to the second floor and call 1669.\n")).await;

    let history = [ChatTurn::user("สวัสดี"), ChatTurn::model("สวัสดีครับ")];
    let reply = advise(&client, &history, "  น้ำขึ้นเร็วมาก  ").await;
    assert_eq!(reply, "Move to the second floor and call 1669.");

    let seen = fake.seen.lock().unwrap();
    let body = &seen[0].1;
    assert!(body.get("response_format").is_none());

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[3]["role"], "user");
    assert_eq!(messages[3]["content"], "น้ำขึ้นเร็วมาก");
}
