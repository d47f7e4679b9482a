use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use super::error::ApiError;
use super::models::{
    HealthResponse, ListQuery, ResolveManyRequest, ResolveManyResponse, ResolveRequest,
    ResolveResponse, ResolverListResponse, SearchQuery, SearchResponse,
};
use super::state::AppState;
use crate::resolver::{DescriptorInfo, ErrorCategory};

/// Liveness check (GET /health). Reads only the registry size.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        resolvers: state.registry.len(),
    })
}

/// Resolves one URL (POST /api/resolve).
///
/// 200 on success, 404 when nothing could resolve it, 400 for input that is
/// not a URL.
pub async fn resolve(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: ResolveRequest = serde_json::from_slice(&body)?;
    info!(url = %request.url, "API resolve request");

    let outcome = state.dispatcher.resolve(&request.url).await;
    let status = match outcome.category() {
        None => StatusCode::OK,
        Some(ErrorCategory::InvalidUrl) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::NOT_FOUND,
    };
    Ok((status, Json(ResolveResponse::from(outcome))))
}

/// Resolves a list of URLs concurrently (POST /api/resolve/multiple).
pub async fn resolve_multiple(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResolveManyResponse>, ApiError> {
    let request: ResolveManyRequest = serde_json::from_slice(&body)?;
    info!(count = request.urls.len(), "API batch resolve request");

    let outcomes = state.batch.resolve_many(request.urls).await;
    let total = outcomes.len();
    let successful = outcomes.iter().filter(|outcome| outcome.success).count();
    Ok(Json(ResolveManyResponse {
        results: outcomes.into_iter().map(ResolveResponse::from).collect(),
        total,
        successful,
    }))
}

/// Lists resolvers sorted by name (GET /api/resolvers).
pub async fn list_resolvers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ResolverListResponse> {
    let enabled_only = query.enabled_only();
    let all = state.registry.all();
    let total_available = all.len();

    let mut resolvers: Vec<DescriptorInfo> = all
        .into_iter()
        .filter(|descriptor| !enabled_only || descriptor.enabled)
        .map(|descriptor| descriptor.info())
        .collect();
    resolvers.sort_by_key(|info| info.name.to_lowercase());

    Json(ResolverListResponse {
        count: resolvers.len(),
        resolvers,
        total_available,
        enabled_only,
    })
}

/// Finds resolvers by claimed domain (GET /api/resolvers/search).
pub async fn search_resolvers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let domain = query
        .domain
        .map(|domain| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty())
        .ok_or(ApiError::MissingParameter("domain"))?;

    let resolvers: Vec<DescriptorInfo> = state
        .dispatcher
        .matcher()
        .search_domain(&domain)
        .iter()
        .map(|descriptor| descriptor.info())
        .collect();

    Ok(Json(SearchResponse {
        domain,
        count: resolvers.len(),
        resolvers,
    }))
}

/// Makes a resolver visible to matching (POST /api/resolvers/{name}/enable).
pub async fn enable_resolver(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DescriptorInfo>, ApiError> {
    state.registry.enable(&name)?;
    describe(&state, name)
}

/// Hides a resolver from matching (POST /api/resolvers/{name}/disable).
pub async fn disable_resolver(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DescriptorInfo>, ApiError> {
    state.registry.disable(&name)?;
    describe(&state, name)
}

fn describe(state: &AppState, name: String) -> Result<Json<DescriptorInfo>, ApiError> {
    state
        .registry
        .get(&name)
        .map(|descriptor| Json(descriptor.info()))
        .ok_or(ApiError::ResolverNotFound(name))
}
