//! API endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{spawn_pass, AppState};
use crate::StrataError;

/// Error body shared by every endpoint: `{"detail": ...}`
pub struct ApiError(StrataError);

impl From<StrataError> for ApiError {
    fn from(err: StrataError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self.0 {
            StrataError::NotFound { what } => (StatusCode::NOT_FOUND, what),
            other => {
                tracing::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoviesParams {
    pub year_url: String,
    pub pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MovieParams {
    pub movie_url: String,
}

#[derive(Debug, Deserialize)]
pub struct QualityParams {
    pub quality_url: String,
}

#[derive(Debug, Deserialize)]
pub struct FileParams {
    pub file_url: String,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "Strata API is running" }))
}

/// Search the index by title.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<crate::IndexDocument>> {
    let query = params.q.unwrap_or_default();
    Ok(Json(state.query.search(&query)?))
}

pub async fn years(State(state): State<AppState>) -> ApiResult<Vec<crate::CategoryEntry>> {
    Ok(Json(state.query.categories().await?))
}

/// Listings of a category, aggregated over several pages.
pub async fn movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesParams>,
) -> ApiResult<Vec<crate::IndexDocument>> {
    Ok(Json(
        state.query.listings(&params.year_url, params.pages).await?,
    ))
}

/// Quality variants of a movie.
pub async fn details(
    State(state): State<AppState>,
    Query(params): Query<MovieParams>,
) -> ApiResult<Vec<crate::VariantEntry>> {
    Ok(Json(state.query.details(&params.movie_url).await?))
}

pub async fn files(
    State(state): State<AppState>,
    Query(params): Query<QualityParams>,
) -> ApiResult<Vec<crate::VariantEntry>> {
    Ok(Json(state.query.files(&params.quality_url).await?))
}

/// Final direct link behind a file page's first server.
pub async fn stream(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> ApiResult<serde_json::Value> {
    let stream_url = state.query.stream(&params.file_url).await?;
    Ok(Json(json!({ "stream_url": stream_url })))
}

pub async fn auto_stream(
    State(state): State<AppState>,
    Query(params): Query<MovieParams>,
) -> ApiResult<crate::StreamResolution> {
    Ok(Json(state.query.auto_stream(&params.movie_url).await?))
}

pub async fn index_status(State(state): State<AppState>) -> ApiResult<crate::crawler::IndexStatus> {
    Ok(Json(state.indexer.status()?))
}

/// Start a background crawl pass unless one is already running.
pub async fn index_start(State(state): State<AppState>) -> Response {
    if !state.indexer.is_enabled() {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "started": false, "detail": "Index is not configured" })),
        )
            .into_response();
    }

    // Claimed here so concurrent requests cannot both report a start
    let Some(guard) = state.indexer.try_begin_pass() else {
        return (
            StatusCode::OK,
            Json(json!({ "started": false, "detail": "Indexing already running" })),
        )
            .into_response();
    };

    spawn_pass(state.indexer.clone(), guard);
    (StatusCode::ACCEPTED, Json(json!({ "started": true }))).into_response()
}
