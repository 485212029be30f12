//! REST API over the collection store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST`   | `/collections` | Import an indicator (`indicator_id` in query or JSON body) |
//! | `GET`    | `/collections` | List collections (`order_by=-indicator,+id`) |
//! | `GET`    | `/collections/{id}` | Collection with all entries |
//! | `DELETE` | `/collections/{id}` | Remove a collection and its entries |
//! | `GET`    | `/collections/{id}/{year}` | Top/bottom entries of a year (`q=+N`, `-N`) |
//! | `GET`    | `/collections/{id}/{year}/{country}` | One entry |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every failure, whatever its cause, is answered with HTTP 400:
//!
//! ```json
//! { "message": "collection doesn't exist with id: 7", "success": false }
//! ```
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use indicator_core::params::{parse_order_spec, TopQuery};
use indicator_core::query::{
    self, CollectionDetail, CollectionSummary, EntryResponse, RankedEntries,
};
use indicator_core::remote::IndicatorSource;
use indicator_core::store::Store;
use indicator_core::Error;

use crate::config::Config;
use crate::import::import_collection;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub source: Arc<dyn IndicatorSource>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, source: Arc<dyn IndicatorSource>) -> Self {
        Self { store, source }
    }
}

/// Build the router with all endpoints and CORS attached.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/collections",
            get(handle_list_collections).post(handle_create_collection),
        )
        .route(
            "/collections/{id}",
            get(handle_get_collection).delete(handle_delete_collection),
        )
        .route("/collections/{id}/{year}", get(handle_top_entries))
        .route("/collections/{id}/{year}/{country}", get(handle_get_entry))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind to `[server].bind` and serve until Ctrl-C.
pub async fn run_server(config: &Config, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("indicator API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    success: bool,
}

/// Client-facing failure; always rendered as 400 with `success: false`.
#[derive(Debug)]
pub struct AppError {
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match &err {
            Error::Storage(_) => error!(error = %err, "storage failure"),
            e if e.is_remote_fetch_failure() => warn!(error = %err, "remote fetch failed"),
            _ => {}
        }
        Self::bad_request(err.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            success: false,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::bad_request(format!("collection id must be an integer, got '{}'", raw)))
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

// ============ POST /collections ============

#[derive(Deserialize, Default)]
struct CreateParams {
    indicator_id: Option<String>,
}

#[derive(Serialize)]
struct CreateResponse {
    id: i64,
    uri: String,
    creation_time: DateTime<Utc>,
    indicator_id: String,
    success: bool,
    message: String,
}

/// `indicator_id` is taken from the query string, falling back to a JSON body.
async fn handle_create_collection(
    State(state): State<AppState>,
    params: Result<Query<CreateParams>, QueryRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateResponse>), AppError> {
    let Query(params) = params?;
    let indicator_id = match params.indicator_id {
        Some(id) => Some(id),
        None if !body.is_empty() => {
            let parsed: CreateParams = serde_json::from_slice(&body)
                .map_err(|e| AppError::bad_request(format!("invalid JSON body: {}", e)))?;
            parsed.indicator_id
        }
        None => None,
    }
    .ok_or_else(|| AppError::bad_request("indicator_id not present in the request args"))?;

    let collection =
        import_collection(state.store.as_ref(), state.source.as_ref(), &indicator_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            id: collection.id,
            uri: collection.uri(),
            creation_time: collection.creation_time,
            indicator_id: collection.indicator_id,
            success: true,
            message: "Collection added successfully!".to_string(),
        }),
    ))
}

// ============ GET /collections ============

#[derive(Deserialize)]
struct ListParams {
    order_by: Option<String>,
}

async fn handle_list_collections(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<CollectionSummary>>, AppError> {
    let Query(params) = params?;
    let order = parse_order_spec(params.order_by.as_deref())?;
    let summaries = query::get_ordered_collection_summaries(state.store.as_ref(), &order).await?;
    Ok(Json(summaries))
}

// ============ GET / DELETE /collections/{id} ============

async fn handle_get_collection(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<CollectionDetail>, AppError> {
    let Path(id) = path?;
    let id = parse_id(&id)?;
    Ok(Json(
        query::get_collection_detail(state.store.as_ref(), id).await?,
    ))
}

#[derive(Serialize)]
struct DeleteResponse {
    id: i64,
    message: String,
    success: bool,
}

async fn handle_delete_collection(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Path(id) = path?;
    let id = parse_id(&id)?;
    if !state.store.delete_collection(id).await? {
        return Err(Error::collection_not_found(id).into());
    }
    info!(id, "collection deleted");

    Ok(Json(DeleteResponse {
        id,
        message: format!("The collection {} was removed from the database!", id),
        success: true,
    }))
}

// ============ GET /collections/{id}/{year}[/{country}] ============

async fn handle_get_entry(
    State(state): State<AppState>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> Result<Json<EntryResponse>, AppError> {
    let Path((id, year, country)) = path?;
    let id = parse_id(&id)?;
    Ok(Json(
        query::get_entry(state.store.as_ref(), id, &year, &country).await?,
    ))
}

#[derive(Deserialize)]
struct TopParams {
    q: Option<String>,
}

async fn handle_top_entries(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    params: Result<Query<TopParams>, QueryRejection>,
) -> Result<Json<RankedEntries>, AppError> {
    let Path((id, year)) = path?;
    let Query(params) = params?;
    let id = parse_id(&id)?;
    let top = TopQuery::parse(params.q.as_deref())?;
    Ok(Json(
        query::get_top_or_bottom_entries(state.store.as_ref(), id, &year, top.count, top.direction)
            .await?,
    ))
}
