//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | `GET`    | `/` | — | Liveness probe (`OK`) |
//! | `GET`    | `/v1/ping` | — | Liveness probe (`pong`) |
//! | `GET`    | `/v1/index` | token | Live index settings |
//! | `POST`   | `/v1/index` | admin | Reset the index (destructive) |
//! | `GET`    | `/v1/documents/{id}` | — | Fetch a document, optionally field-filtered |
//! | `POST`   | `/v1/documents` | token | Create a document |
//! | `POST`   | `/v1/documents/bulk` | token | Bulk-create documents |
//! | `PUT`    | `/v1/documents/{id}` | token | Update a document |
//! | `DELETE` | `/v1/documents/{id}` | token | Delete a document |
//! | `GET`    | `/v1/search` | — | Structured search |
//! | `GET`    | `/v1/typeahead` | — | Prefix suggestion lookup |
//!
//! # Errors
//!
//! Error responses are `{ "error": "<message>" }`: 400 for malformed input,
//! 401 for failed token checks, 500 for backend failures (carrying the raw
//! backend message).
//!
//! # Search parameters
//!
//! `q`, `fields`, `search_fields`, `start_date`, `end_date`, `sort_by`,
//! `sort_dir`, `page`, `per_page` and `request_id` are recognized; `username`
//! filters on the contributor-username path; any other query key becomes an
//! exact-match term filter on that field name.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{check_bearer, AuthFailure};
use crate::config::Config;
use crate::fields::{project, ProjectionMode};
use crate::models::{Document, SearchParams, SearchResponse};
use crate::store::SearchClient;

/// Shared application state: the immutable config and the pooled backend
/// client, both established once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<SearchClient>,
}

/// Starts the HTTP server and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let client = SearchClient::new(config)?;
    client.ensure_index().await?;

    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        client: Arc::new(client),
    };
    let app = build_router(state);

    tracing::info!(addr = %bind_addr, "search API listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router; separated from [`run_server`] so tests can drive it
/// without binding a socket.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "OK" }))
        .route("/v1/ping", get(handle_ping))
        .route("/v1/index", get(handle_get_index).post(handle_reset_index))
        .route("/v1/documents", post(handle_new_document))
        .route("/v1/documents/bulk", post(handle_bulk_new_documents))
        .route(
            "/v1/documents/{id}",
            get(handle_get_document)
                .put(handle_update_document)
                .delete(handle_delete_document),
        )
        .route("/v1/search", get(handle_search))
        .route("/v1/typeahead", get(handle_typeahead))
        .layer(cors)
        .with_state(state)
}

// ============ Errors ============

/// An error that renders as `{ "error": "<message>" }` with a status code.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

/// Backend and decode failures surface as 500 with the raw error text; the
/// store does not distinguish not-found from other backend errors.
fn backend_error(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: err.to_string(),
    }
}

fn auth_error(failure: AuthFailure) -> AppError {
    match failure {
        AuthFailure::NoKeyConfigured => {
            tracing::warn!("failed token validation: no token set in config or env");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "No token set".to_string(),
            }
        }
        failure => {
            tracing::warn!(?failure, "failed token validation");
            AppError {
                status: StatusCode::UNAUTHORIZED,
                message: "Unauthorized".to_string(),
            }
        }
    }
}

fn require_token(headers: &HeaderMap, key: &str) -> Result<(), AppError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    check_bearer(header, key).map_err(auth_error)
}

// ============ Handlers ============

async fn handle_ping() -> &'static str {
    "pong"
}

async fn handle_get_index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    require_token(&headers, &state.config.api.key)?;
    let info = state.client.index_info().await.map_err(backend_error)?;
    Ok(Json(info))
}

async fn handle_reset_index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    require_token(&headers, &state.config.api.admin_key)?;
    state.client.reset_index().await.map_err(backend_error)?;
    Ok(Json(json!({ "message": "Index reset" })))
}

async fn handle_new_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(document): Json<Document>,
) -> Result<Json<Document>, AppError> {
    require_token(&headers, &state.config.api.key)?;
    if !document.id.is_empty() {
        return Err(bad_request("ID should not be provided for new documents"));
    }
    let created = state
        .client
        .create_document(&document)
        .await
        .map_err(backend_error)?;
    tracing::info!(id = %created.id, "created document");
    Ok(Json(project(
        &created,
        &["id", "title", "primary_url"],
        ProjectionMode::KeepInternal,
    )))
}

async fn handle_bulk_new_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(documents): Json<Vec<Document>>,
) -> Result<Json<Vec<Document>>, AppError> {
    require_token(&headers, &state.config.api.key)?;
    if documents.iter().any(|d| !d.id.is_empty()) {
        return Err(bad_request("ID should not be provided for new documents"));
    }
    let created = state
        .client
        .bulk_create(&documents)
        .await
        .map_err(backend_error)?;
    tracing::info!(count = created.len(), "bulk-created documents");
    let stripped = created
        .iter()
        .map(|doc| project(doc, &["content"], ProjectionMode::RemoveInternal))
        .collect();
    Ok(Json(stripped))
}

async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<Document>, AppError> {
    if id.is_empty() {
        return Err(bad_request("ID is required"));
    }
    let mut document = state
        .client
        .get_document(&id)
        .await
        .map_err(backend_error)?;

    let fields = split_field_list(query.get("fields").map(String::as_str).unwrap_or(""));
    if !fields.is_empty() {
        document = project(&document, &fields, ProjectionMode::KeepWire);
    }
    Ok(Json(document))
}

async fn handle_update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut document): Json<Document>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_token(&headers, &state.config.api.key)?;
    // The path parameter wins over any id in the body.
    document.id = id;
    state
        .client
        .update_document(&document)
        .await
        .map_err(backend_error)?;
    Ok(Json(json!({ "message": "Document updated" })))
}

async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    require_token(&headers, &state.config.api.key)?;
    state
        .client
        .delete_document(&id)
        .await
        .map_err(backend_error)?;
    Ok(Json(json!({ "message": "Document deleted" })))
}

async fn handle_search(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<SearchResponse>, AppError> {
    let params = params_from_query(&query);
    let response = state.client.search(&params).await.map_err(backend_error)?;
    Ok(Json(response))
}

async fn handle_typeahead(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Document>>, AppError> {
    let q = query.get("q").map(String::as_str).unwrap_or("");
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let documents = state.client.typeahead(q).await.map_err(backend_error)?;
    Ok(Json(documents))
}

// ============ Parameter parsing ============

/// Builds [`SearchParams`] from the raw query string map.
///
/// Unrecognized keys become exact-match term filters on that field name; the
/// filterable field set is deliberately schema-free, matching the upstream
/// API contract. A missing `request_id` gets a generated one so every
/// response can be correlated.
pub fn params_from_query(query: &BTreeMap<String, String>) -> SearchParams {
    let mut params = SearchParams::default();
    for (key, value) in query {
        match key.as_str() {
            "q" => params.query = value.clone(),
            "fields" => params.return_fields = split_field_list(value),
            "search_fields" => params.search_fields = split_field_list(value),
            "start_date" => params.start_date = value.clone(),
            "end_date" => params.end_date = value.clone(),
            "sort_by" => params.sort_field = value.clone(),
            "sort_dir" => params.sort_direction = value.clone(),
            "page" => params.page = value.parse().unwrap_or(0),
            "per_page" => params.per_page = value.parse().unwrap_or(0),
            "request_id" => params.request_id = value.clone(),
            "username" => {
                params
                    .exact_match
                    .insert("contributors.username".to_string(), value.clone());
            }
            _ => {
                params.exact_match.insert(key.clone(), value.clone());
            }
        }
    }
    if params.request_id.is_empty() {
        params.request_id = uuid::Uuid::new_v4().to_string();
    }
    params
}

fn split_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
