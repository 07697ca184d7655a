//! In-process fake of the monitoring backend for client tests

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::schemas::MarkDeliveredRequest;

pub const TOKEN: &str = "secret-token";

#[derive(Default)]
struct BackendState {
    rows: Vec<Value>,
    finished: Vec<MarkDeliveredRequest>,
    delivery_queries: Vec<Option<String>>,
    corrupt_actions: bool,
    missing_alerts: Vec<i64>,
    failing_alerts: Vec<i64>,
}

#[derive(Clone, Default)]
pub struct Backend(Arc<Mutex<BackendState>>);

impl Backend {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        let backend = Self::default();
        backend.0.lock().unwrap().rows = rows;
        backend
    }

    pub fn corrupt_actions(&self) {
        self.0.lock().unwrap().corrupt_actions = true;
    }

    pub fn lose_alert(&self, id: i64) {
        self.0.lock().unwrap().missing_alerts.push(id);
    }

    pub fn break_alert(&self, id: i64) {
        self.0.lock().unwrap().failing_alerts.push(id);
    }

    pub fn finished(&self) -> Vec<MarkDeliveredRequest> {
        self.0.lock().unwrap().finished.clone()
    }

    pub fn delivery_queries(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().delivery_queries.clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "invalid token"}))).into_response()
}

pub fn alert_json(id: i64) -> Value {
    json!({
        "id": id,
        "alias": format!("alert-{id}"),
        "title": format!("Alert {id}"),
        "description": "Connections above 90% of max_connections",
        "timestamp": "2024-03-01T12:30:00Z",
        "status": if id % 2 == 0 { "resolved" } else { "fired" },
        "severity": "critical",
        "suggested_actions": ["kill-idle"],
    })
}

async fn list_deliveries(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = backend.0.lock().unwrap();
    state.delivery_queries.push(query.get("age").cloned());
    Json(Value::Array(state.rows.clone())).into_response()
}

async fn get_alert(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = backend.0.lock().unwrap();
    if state.missing_alerts.contains(&id) {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"}))).into_response();
    }
    if state.failing_alerts.contains(&id) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"detail": "database unavailable"})))
            .into_response();
    }
    Json(alert_json(id)).into_response()
}

async fn finish(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(request): Json<MarkDeliveredRequest>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.0.lock().unwrap().finished.push(request);
    Json(json!({"ok": true})).into_response()
}

fn actions_json() -> Value {
    json!([
        {"alias": "vacuum", "title": "Vacuum analyze", "description": "Run VACUUM ANALYZE"},
        {"alias": "kill-idle", "title": "Kill idle sessions", "arguments": {"older_than": "interval"}},
    ])
}

async fn list_actions(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if backend.0.lock().unwrap().corrupt_actions {
        return Json(json!({"items": "not an array"})).into_response();
    }
    Json(actions_json()).into_response()
}

/// Serve the fake backend on an ephemeral port, returning its base URL
pub async fn serve(backend: Backend) -> String {
    let router = Router::new()
        .route("/alerts/delivery", get(list_deliveries))
        .route("/alerts/by-id/:id", get(get_alert))
        .route("/alerts/finish", post(finish))
        .route("/actions", get(list_actions))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

/// Base URL of a port nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
