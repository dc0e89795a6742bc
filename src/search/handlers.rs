use super::errors::ApiError;
use super::service::SearchService;
use super::types::{SearchRequest, SearchResponse};
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Search endpoint.
pub const ENDPOINT_SEARCH: &str = "/api/search";
/// Response header reporting whether the cache served the request.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

pub fn build_router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route(ENDPOINT_SEARCH, post(handle_search))
        .fallback(handle_not_found)
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http())
}

pub async fn handle_search(
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.inspect_err(|e| {
        tracing::debug!("Rejected search request: {}", e.body_text());
    })?;

    let outcome = service.handle(&request.query).await?;
    tracing::debug!(
        "Search '{}' -> {} results ({})",
        request.query,
        outcome.results.len(),
        outcome.cache.as_str()
    );

    Ok((
        [(CACHE_STATUS_HEADER, outcome.cache.as_str())],
        Json(SearchResponse {
            results: outcome.results,
        }),
    ))
}

pub async fn handle_not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}
