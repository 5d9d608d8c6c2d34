//! JSON HTTP API (Axum).
//!
//! Handlers validate request parameters, delegate to the
//! [`KnowledgeRepository`], and shape the JSON response. The repository and
//! its store are built once by [`run_server`] and shared through Axum state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/search?q=` | Keyword search over title and content |
//! | `POST` | `/api/knowledge` | Submit a knowledge record |
//! | `GET`  | `/api/knowledge/{id}` | Fetch one record (does not count a view) |
//! | `POST` | `/api/knowledge/view?id=` | Count one view |
//! | `POST` | `/api/rituals/closing` | Save a daily reflection |
//! | `GET`  | `/api/rituals/reflections?userId=` | A user's reflections, newest first |
//! | `POST` | `/api/chat/messages` | Append a chat message |
//! | `GET`  | `/api/chat/messages?limit=` | Recent chat history |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every error body is `{ "error": "<message>" }`. Missing or invalid
//! parameters are `400`, unknown ids and routes `404`, a wrong method on a
//! known route `405`, store failures `500` with an opaque message (the cause
//! is logged, not returned).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use knowledge_hub_core::models::{
    ChatMessage, ChatRole, DailyReflection, KnowledgeDraft, KnowledgeRecord, ReflectionEntry,
};
use knowledge_hub_core::repository::{KnowledgeRepository, RepositoryError};
use knowledge_hub_core::store::StoreError;

use crate::config::Config;
use crate::{db, migrate};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: KnowledgeRepository,
    /// Longest accepted search query, in characters.
    pub max_query_chars: usize,
}

/// Starts the HTTP server.
///
/// Opens the SQLite pool, applies migrations, injects a
/// [`SqliteStore`](crate::sqlite_store::SqliteStore) into the repository,
/// then serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let (repo, pool) = db::open_repository(config).await?;
    migrate::apply(&pool).await?;

    let state = AppState {
        repo,
        max_query_chars: config.search.max_query_chars,
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "knowledge hub listening");

    axum::serve(listener, build_router(state)).await?;
    pool.close().await;
    Ok(())
}

/// Build the router over an already-wired [`AppState`].
///
/// Exposed so callers can serve any [`KnowledgeStore`](knowledge_hub_core::store::KnowledgeStore)
/// backend, e.g. the in-memory store in tests.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handle_search))
        .route("/api/knowledge", post(handle_submit))
        .route("/api/knowledge/view", post(handle_view))
        .route("/api/knowledge/{id}", get(handle_get))
        .route("/api/rituals/closing", post(handle_closing))
        .route("/api/rituals/reflections", get(handle_list_reflections))
        .route(
            "/api/chat/messages",
            get(handle_list_messages).post(handle_append_message),
        )
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(msg) => ApiError::bad_request(msg),
            RepositoryError::Store(e @ StoreError::NotFound { .. }) => ApiError {
                status: StatusCode::NOT_FOUND,
                message: e.to_string(),
            },
            RepositoryError::Store(StoreError::Backend(cause)) => {
                tracing::error!(error = ?cause, "store failure");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal server error".to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(format!("invalid query string: {}", rejection.body_text()))
    }
}

type SharedState = State<Arc<AppState>>;

fn missing_param(name: &str) -> ApiError {
    ApiError::bad_request(format!("Query parameter '{}' is required", name))
}

/// Value of an optional query parameter that must not be blank.
fn required_param(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing_param(name)),
    }
}

async fn handle_not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "no such route".to_string(),
    }
}

/// A known path hit with the wrong method, e.g. `GET /api/knowledge/view`.
async fn handle_method_not_allowed() -> ApiError {
    ApiError {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "method not allowed".to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<KnowledgeRecord>,
}

/// Handler for `GET /api/search?q=`.
///
/// The query is passed to the search function exactly as given, whitespace
/// included; only a missing or empty `q` (or one over the configured length)
/// is rejected.
async fn handle_search(
    State(state): SharedState,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let query = match params.q {
        Some(q) if !q.is_empty() => q,
        _ => return Err(missing_param("q")),
    };

    if query.chars().count() > state.max_query_chars {
        return Err(ApiError::bad_request(format!(
            "Query must be at most {} characters",
            state.max_query_chars
        )));
    }

    let results = state.repo.search(&query).await?;
    tracing::debug!(query = %query, hits = results.len(), "search");
    Ok(Json(SearchResponse { query, results }))
}

// ============ /api/knowledge ============

async fn handle_submit(
    State(state): SharedState,
    body: Result<Json<KnowledgeDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<KnowledgeRecord>), ApiError> {
    let Json(draft) = body?;
    let record = state.repo.submit_knowledge(draft).await?;
    tracing::info!(id = %record.id, created_by = %record.created_by, "knowledge submitted");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn handle_get(
    State(state): SharedState,
    Path(id): Path<String>,
) -> Result<Json<KnowledgeRecord>, ApiError> {
    Ok(Json(state.repo.get_knowledge(&id).await?))
}

#[derive(Deserialize)]
struct ViewParams {
    id: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Handler for `POST /api/knowledge/view?id=`.
async fn handle_view(
    State(state): SharedState,
    params: Result<Query<ViewParams>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Query(params) = params?;
    let id = required_param(params.id, "id")?;
    let count = state.repo.increment_view_count(&id).await?;
    tracing::debug!(id = %id, view_count = count, "view counted");
    Ok(Json(SuccessResponse { success: true }))
}

// ============ /api/rituals ============

/// Handler for `POST /api/rituals/closing`.
async fn handle_closing(
    State(state): SharedState,
    body: Result<Json<ReflectionEntry>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(entry) = body?;
    let saved = state.repo.save_daily_reflection(entry).await?;
    tracing::info!(user_id = %saved.user_id, kind = %saved.reflection_type, "reflection saved");
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReflectionListParams {
    user_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReflectionListResponse {
    user_id: String,
    reflections: Vec<DailyReflection>,
}

async fn handle_list_reflections(
    State(state): SharedState,
    params: Result<Query<ReflectionListParams>, QueryRejection>,
) -> Result<Json<ReflectionListResponse>, ApiError> {
    let Query(params) = params?;
    let user_id = required_param(params.user_id, "userId")?;
    let reflections = state.repo.list_reflections(&user_id).await?;
    Ok(Json(ReflectionListResponse {
        user_id,
        reflections,
    }))
}

// ============ /api/chat/messages ============

#[derive(Deserialize)]
struct NewChatMessage {
    role: ChatRole,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatListParams {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ChatListResponse {
    messages: Vec<ChatMessage>,
}

async fn handle_append_message(
    State(state): SharedState,
    body: Result<Json<NewChatMessage>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let Json(msg) = body?;
    let saved = state.repo.append_chat_message(msg.role, msg.content).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn handle_list_messages(
    State(state): SharedState,
    params: Result<Query<ChatListParams>, QueryRejection>,
) -> Result<Json<ChatListResponse>, ApiError> {
    let Query(params) = params?;
    let messages = state.repo.recent_chat_messages(params.limit).await?;
    Ok(Json(ChatListResponse { messages }))
}
