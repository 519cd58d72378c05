use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, RecordedRequest};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- respond ---

#[tokio::test]
async fn respond_uses_the_requested_status() {
    let resp = app().oneshot(get("/respond/200")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/json"
    );
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": 200, "method": "GET", "echo": null}));
}

#[tokio::test]
async fn respond_echoes_the_json_body() {
    let resp = app()
        .oneshot(json_request("POST", "/respond/404", r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["echo"], json!({"a": 1}));
}

#[tokio::test]
async fn respond_rejects_codes_outside_the_http_range() {
    let resp = app().oneshot(get("/respond/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- canned bodies ---

#[tokio::test]
async fn empty_has_no_body() {
    let resp = app().oneshot(get("/empty/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn text_is_not_json() {
    let resp = app().oneshot(get("/text/200")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}

#[tokio::test]
async fn array_is_json_but_not_an_object() {
    let resp = app().oneshot(get("/array/201")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert!(body.is_array());
}

#[tokio::test]
async fn latin1_is_not_valid_utf8() {
    let resp = app().oneshot(get("/latin1/200")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(std::str::from_utf8(&bytes).is_err());
    assert_eq!(&bytes[..], b"{\"name\":\"caf\xe9\"}");
}

#[tokio::test]
async fn large_returns_an_object_of_the_requested_size() {
    let resp = app().oneshot(get("/large/4096")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert_eq!(bytes.len(), 4096);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["blob"].is_string());
}

#[tokio::test]
async fn delay_answers_after_waiting() {
    let resp = app().oneshot(get("/delay/50")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"ok": true}));
}

// --- journal ---

#[tokio::test]
async fn journal_records_method_headers_and_body() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("PUT")
                .uri("/empty/200")
                .header("x-api-key", "abc")
                .body(r#"{"k":"v"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/__requests"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let requests: Vec<RecordedRequest> = serde_json::from_value(body["requests"].clone()).unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/empty/200");
    assert_eq!(requests[0].headers["x-api-key"], "abc");
    assert_eq!(requests[0].body, r#"{"k":"v"}"#);

    // clear
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/__requests")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/__requests"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"requests": []}));
}
