use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A request as the server saw it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub type Journal = Arc<RwLock<Vec<RecordedRequest>>>;

/// Routes, every one of which answers any method:
///
/// - `/respond/{status}`: JSON object echoing the method and request body
/// - `/empty/{status}`: no body
/// - `/text/{status}`: a body that is not JSON
/// - `/array/{status}`: JSON that is not an object
/// - `/latin1/{status}`: a JSON object encoded as Latin-1, not UTF-8
/// - `/large/{bytes}`: 200 with a JSON object of exactly `bytes` bytes
/// - `/delay/{ms}`: waits, then 200 with `{"ok":true}`
/// - `/__requests`: GET lists recorded requests, DELETE clears them
pub fn app() -> Router {
    let journal: Journal = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/respond/{status}", any(respond))
        .route("/empty/{status}", any(empty))
        .route("/text/{status}", any(text))
        .route("/array/{status}", any(array))
        .route("/latin1/{status}", any(latin1))
        .route("/large/{bytes}", any(large))
        .route("/delay/{ms}", any(delay))
        .route("/__requests", get(list_requests).delete(clear_requests))
        .with_state(journal)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn record(journal: &Journal, method: &Method, path: String, headers: &HeaderMap, body: String) {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let entry = RecordedRequest {
        id: Uuid::new_v4(),
        method: method.to_string(),
        path,
        headers,
        body,
    };
    tracing::debug!(id = %entry.id, method = %entry.method, path = %entry.path, "recorded request");
    journal.write().await.push(entry);
}

fn status_code(code: u16) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn respond(
    State(journal): State<Journal>,
    Path(code): Path<u16>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    let status = status_code(code)?;
    record(&journal, &method, format!("/respond/{code}"), &headers, body.clone()).await;
    let echo: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let payload = json!({ "status": code, "method": method.as_str(), "echo": echo });
    Ok(json_response(status, payload.to_string()))
}

async fn empty(
    State(journal): State<Journal>,
    Path(code): Path<u16>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, StatusCode> {
    let status = status_code(code)?;
    record(&journal, &method, format!("/empty/{code}"), &headers, body).await;
    Ok(status)
}

async fn text(
    State(journal): State<Journal>,
    Path(code): Path<u16>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    let status = status_code(code)?;
    record(&journal, &method, format!("/text/{code}"), &headers, body).await;
    Ok((status, "not json").into_response())
}

async fn array(
    State(journal): State<Journal>,
    Path(code): Path<u16>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    let status = status_code(code)?;
    record(&journal, &method, format!("/array/{code}"), &headers, body).await;
    Ok(json_response(status, "[1,2,3]".to_string()))
}

async fn latin1(
    State(journal): State<Journal>,
    Path(code): Path<u16>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    let status = status_code(code)?;
    record(&journal, &method, format!("/latin1/{code}"), &headers, body).await;
    let bytes: &'static [u8] = b"{\"name\":\"caf\xe9\"}";
    Ok((status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

async fn large(
    State(journal): State<Journal>,
    Path(bytes): Path<usize>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&journal, &method, format!("/large/{bytes}"), &headers, body).await;
    json_response(StatusCode::OK, padded_object(bytes))
}

/// `{"blob":"aaa…"}` padded to `len` bytes, or the shortest such object.
fn padded_object(len: usize) -> String {
    const FRAME: usize = r#"{"blob":""}"#.len();
    format!(r#"{{"blob":"{}"}}"#, "a".repeat(len.saturating_sub(FRAME)))
}

async fn delay(
    State(journal): State<Journal>,
    Path(ms): Path<u64>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&journal, &method, format!("/delay/{ms}"), &headers, body).await;
    tokio::time::sleep(Duration::from_millis(ms)).await;
    json_response(StatusCode::OK, r#"{"ok":true}"#.to_string())
}

/// Wrapped in an object so clients that only accept JSON objects can read it.
async fn list_requests(State(journal): State<Journal>) -> Json<Value> {
    let requests = journal.read().await.clone();
    Json(json!({ "requests": requests }))
}

async fn clear_requests(State(journal): State<Journal>) -> StatusCode {
    journal.write().await.clear();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_request_serializes_to_json() {
        let entry = RecordedRequest {
            id: Uuid::nil(),
            method: "POST".to_string(),
            path: "/respond/200".to_string(),
            headers: BTreeMap::from([("x-api".to_string(), "1".to_string())]),
            body: r#"{"a":1}"#.to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["method"], "POST");
        assert_eq!(json["headers"]["x-api"], "1");
        assert_eq!(json["body"], r#"{"a":1}"#);
    }

    #[test]
    fn padded_object_has_the_requested_length() {
        assert_eq!(padded_object(4096).len(), 4096);
        assert_eq!(padded_object(0), r#"{"blob":""}"#);
        let parsed: Value = serde_json::from_str(&padded_object(64)).unwrap();
        assert!(parsed["blob"].is_string());
    }

    #[test]
    fn status_code_rejects_out_of_range_codes() {
        assert_eq!(status_code(404), Ok(StatusCode::NOT_FOUND));
        assert_eq!(status_code(42), Err(StatusCode::BAD_REQUEST));
    }
}
