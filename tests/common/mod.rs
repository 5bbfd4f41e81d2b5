//! Local stand-in for the classification service

#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behaviour of the mock service
#[derive(Debug, Clone)]
pub struct MockOptions {
    pub label: &'static str,
    pub confidence: f64,
    pub delay: Duration,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            label: "bug",
            confidence: 0.92,
            delay: Duration::ZERO,
        }
    }
}

/// Requests seen and predictions stored by the mock service
#[derive(Debug, Default)]
pub struct MockState {
    options: Mutex<Option<MockOptions>>,
    received: Mutex<Vec<Value>>,
    predictions: Mutex<HashMap<String, String>>,
    next_id: AtomicU64,
}

impl MockState {
    fn options(&self) -> MockOptions {
        self.options.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// Running mock service
pub struct MockService {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockService {
    pub async fn start(options: MockOptions) -> Self {
        let state = Arc::new(MockState::default());
        *state.options.lock().unwrap() = Some(options);

        let app = Router::new()
            .route("/api/predict", post(predict))
            .route("/api/correct", post(correct))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }
}

async fn predict(
    State(state): State<Arc<MockState>>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let options = state.options();
    state.received.lock().unwrap().push(payload.clone());

    if !options.delay.is_zero() {
        tokio::time::sleep(options.delay).await;
    }

    let Some(issue_body) = payload.get("issue_body").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "issue_body is required" })),
        );
    };

    if issue_body.contains("explode") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "model failure" })),
        );
    }

    let id = format!("pred-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    state
        .predictions
        .lock()
        .unwrap()
        .insert(id.clone(), options.label.to_string());

    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "predicted_label": options.label,
            "confidence_score": options.confidence,
        })),
    )
}

async fn correct(
    State(state): State<Arc<MockState>>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.received.lock().unwrap().push(payload.clone());

    let (Some(id), Some(corrected)) = (
        payload.get("id").and_then(Value::as_str),
        payload.get("corrected_label").and_then(Value::as_str),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Both id and corrected_label are required" })),
        );
    };

    let original = state.predictions.lock().unwrap().get(id).cloned();
    match original {
        Some(original) => (
            StatusCode::OK,
            Json(json!({
                "id": id,
                "original_label": original,
                "corrected_label": corrected,
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Prediction not found" })),
        ),
    }
}
