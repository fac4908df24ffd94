//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use api_lib::{
    adapters::MemoryStore,
    config::Config,
    web::{build_router, AppState},
};
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use qa_core::services::{AnswerManager, AnswerService, QuestionManager, QuestionService};
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        match serde_json::from_slice(&self.body) {
            Ok(value) => value,
            Err(err) => panic!(
                "response body is not JSON: {err}; body={}",
                String::from_utf8_lossy(&self.body)
            ),
        }
    }

    pub fn error_message(&self) -> String {
        match self.json().get("error").and_then(serde_json::Value::as_str) {
            Some(message) => message.to_string(),
            None => panic!("response has no error field: {}", self.json()),
        }
    }
}

/// The real services over a fresh in-memory store.
pub fn memory_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    app_with(
        Arc::new(QuestionManager::new(store.clone())),
        Arc::new(AnswerManager::new(store.clone(), store)),
        Config::default(),
    )
}

pub fn app_with(
    questions: Arc<dyn QuestionService>,
    answers: Arc<dyn AnswerService>,
    config: Config,
) -> Router {
    build_router(Arc::new(AppState {
        questions,
        answers,
        config: Arc::new(config),
    }))
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap_or_else(|err| panic!("failed to build request: {err}"));

    let response = match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(err) => panic!("router request failed: {err}"),
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match to_bytes(response.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };

    TestResponse {
        status,
        content_type,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, "GET", uri, None).await
}

pub async fn delete(router: &Router, uri: &str) -> TestResponse {
    send(router, "DELETE", uri, None).await
}

pub async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> TestResponse {
    send(router, "POST", uri, Some(&body.to_string())).await
}

/// Creates a question and returns its id.
pub async fn create_question(router: &Router, text: &str) -> i64 {
    let response = post_json(router, "/questions/", serde_json::json!({ "text": text })).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["id"].as_i64().unwrap_or_else(|| panic!("no id in {}", response.json()))
}

/// Posts an answer and returns its id.
pub async fn create_answer(router: &Router, question_id: i64, user_id: &str, text: &str) -> i64 {
    let response = post_json(
        router,
        &format!("/questions/{question_id}/answers/"),
        serde_json::json!({ "user_id": user_id, "text": text }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["id"].as_i64().unwrap_or_else(|| panic!("no id in {}", response.json()))
}
