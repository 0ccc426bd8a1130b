//! HTTP API tests: the axum router driven via `tower::ServiceExt::oneshot`,
//! with a mocked OpenSearch backend behind it.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use commons_search::config::{ApiConfig, Config, SearchBackendConfig, ServerConfig};
use commons_search::server::{build_router, AppState};
use commons_search::store::SearchClient;

const API_KEY: &str = "12345";
const ADMIN_KEY: &str = "67890";

fn test_config(endpoint: &str, api_key: &str) -> Config {
    Config {
        search: SearchBackendConfig {
            endpoint: endpoint.to_string(),
            index: "works".to_string(),
            username: String::new(),
            password: String::new(),
            client_mode: "noauth".to_string(),
        },
        api: ApiConfig {
            key: api_key.to_string(),
            admin_key: ADMIN_KEY.to_string(),
        },
        server: ServerConfig::default(),
    }
}

fn app(endpoint: &str) -> axum::Router {
    app_with_key(endpoint, API_KEY)
}

fn app_with_key(endpoint: &str, api_key: &str) -> axum::Router {
    let config = test_config(endpoint, api_key);
    let client = SearchClient::new(&config).unwrap();
    build_router(AppState {
        config: Arc::new(config),
        client: Arc::new(client),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_ping() {
    let server = mockito::Server::new_async().await;
    let response = app(&server.url()).oneshot(get("/v1/ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"pong");
}

#[tokio::test]
async fn test_create_rejects_bad_token() {
    let server = mockito::Server::new_async().await;
    let response = app(&server.url())
        .oneshot(post_json("/v1/documents", "wrong", json!({"title": "T"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn test_create_rejects_missing_token() {
    let server = mockito::Server::new_async().await;
    let request = Request::builder()
        .method("POST")
        .uri("/v1/documents")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"title": "T"}).to_string()))
        .unwrap();
    let response = app(&server.url()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_without_configured_key_is_server_error() {
    let server = mockito::Server::new_async().await;
    let response = app_with_key(&server.url(), "")
        .oneshot(post_json("/v1/documents", API_KEY, json!({"title": "T"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"error": "No token set"}));
}

#[tokio::test]
async fn test_create_rejects_preset_id() {
    let server = mockito::Server::new_async().await;
    let response = app(&server.url())
        .oneshot(post_json(
            "/v1/documents",
            API_KEY,
            json!({"_id": "nope", "title": "T"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "ID should not be provided for new documents"})
    );
}

#[tokio::test]
async fn test_create_returns_projected_document() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/works/_doc")
        .with_status(201)
        .with_body(r#"{"_id":"new-id","result":"created"}"#)
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(post_json(
            "/v1/documents",
            API_KEY,
            json!({
                "title": "Searching Openly",
                "primary_url": "https://example.com",
                "content": "full text that must not echo back"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "_id": "new-id",
            "title": "Searching Openly",
            "primary_url": "https://example.com"
        })
    );
}

#[tokio::test]
async fn test_bulk_create_strips_content() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/_bulk")
        .with_status(200)
        .with_body(r#"{"errors":false,"items":[{"create":{"_id":"b1"}}]}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/works/_mget")
        .with_status(200)
        .with_body(
            json!({"docs": [
                {"_id": "b1", "_source": {"title": "One", "content": "long text"}}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(post_json(
            "/v1/documents/bulk",
            API_KEY,
            json!([{"title": "One", "content": "long text"}]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!([{"_id": "b1", "title": "One"}]));
}

#[tokio::test]
async fn test_get_document_with_field_selection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/works/_doc/abc")
        .with_status(200)
        .with_body(
            json!({
                "_id": "abc",
                "_source": {
                    "title": "One",
                    "description": "About one",
                    "primary_url": "https://example.com",
                    "content": "long text"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(get("/v1/documents/abc?fields=title,description"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({"title": "One", "description": "About one"}));
}

#[tokio::test]
async fn test_get_document_unfiltered_returns_everything() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/works/_doc/abc")
        .with_status(200)
        .with_body(r#"{"_id":"abc","_source":{"title":"One","content":"text"}}"#)
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(get("/v1/documents/abc"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["_id"], "abc");
    assert_eq!(body["title"], "One");
    assert_eq!(body["content"], "text");
}

#[tokio::test]
async fn test_update_uses_path_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/works/_update/path-id")
        .match_body(mockito::Matcher::Json(json!({"doc": {"title": "New"}})))
        .with_status(200)
        .with_body(r#"{"result":"updated"}"#)
        .create_async()
        .await;

    let request = Request::builder()
        .method("PUT")
        .uri("/v1/documents/path-id")
        .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"_id": "body-id", "title": "New"}).to_string(),
        ))
        .unwrap();
    let response = app(&server.url()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Document updated"})
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_document() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/works/_doc/abc")
        .with_status(200)
        .with_body(r#"{"result":"deleted"}"#)
        .create_async()
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/v1/documents/abc")
        .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
        .body(Body::empty())
        .unwrap();
    let response = app(&server.url()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Document deleted"})
    );
}

#[tokio::test]
async fn test_search_envelope() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/works/_search")
        .with_status(200)
        .with_body(
            json!({
                "hits": {
                    "total": {"value": 2, "relation": "eq"},
                    "hits": [
                        {"_id": "h1", "_source": {"title": "Art One"}},
                        {"_id": "h2", "_source": {"title": "Art Two"}}
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(get("/v1/search?q=art&page=2&per_page=10&request_id=req-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["request_id"], "req-1");
    assert_eq!(body["hits"][0]["_id"], "h1");
    assert_eq!(body["hits"][1]["title"], "Art Two");
}

#[tokio::test]
async fn test_search_backend_failure_propagates_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/works/_search")
        .with_status(502)
        .with_body("upstream gone")
        .create_async()
        .await;

    let response = app(&server.url()).oneshot(get("/v1/search?q=art")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("upstream gone"));
}

#[tokio::test]
async fn test_typeahead_empty_query_short_circuits() {
    let server = mockito::Server::new_async().await;
    let response = app(&server.url()).oneshot(get("/v1/typeahead")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_reset_index_requires_admin_token() {
    let server = mockito::Server::new_async().await;
    let response = app(&server.url())
        .oneshot(post_json("/v1/index", API_KEY, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_index_with_admin_token() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/works")
        .with_status(200)
        .with_body(r#"{"acknowledged":true}"#)
        .create_async()
        .await;
    let recreate = server
        .mock("PUT", "/works")
        .with_status(200)
        .with_body(r#"{"acknowledged":true,"index":"works"}"#)
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(post_json("/v1/index", ADMIN_KEY, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "Index reset"}));
    recreate.assert_async().await;
}
