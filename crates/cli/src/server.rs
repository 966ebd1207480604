//! HTTP adapter over [`TaggingService`].

use crate::page;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info};
use video_tagger_core::models::{Stats, TagRequest, VideoResponse};
use video_tagger_core::tagging::{TaggingService, VIDEO_MOUNT};
use video_tagger_core::TaggingError;

#[derive(Clone)]
pub struct ServerState {
    service: Arc<TaggingService>,
}

/// Error body shaped as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError(TaggingError);

impl From<TaggingError> for ApiError {
    fn from(err: TaggingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            TaggingError::InvalidTag { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TaggingError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            TaggingError::Store(err) => {
                error!("store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn index_page(State(state): State<ServerState>) -> Html<String> {
    Html(page::render_index(state.service.tags()))
}

async fn next_video(
    State(state): State<ServerState>,
) -> Result<Json<Option<VideoResponse>>, ApiError> {
    Ok(Json(state.service.next_video().await?))
}

async fn tag_video(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(request): Json<TagRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    Ok(Json(state.service.tag_video(id, &request.tag).await?))
}

async fn stats(State(state): State<ServerState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.service.stats().await?))
}

/// Builds the router: JSON endpoints plus the two static mounts.
pub fn create_router(service: TaggingService, static_dir: PathBuf) -> Router {
    let video_root = service.video_root().to_path_buf();
    let state = ServerState {
        service: Arc::new(service),
    };

    Router::new()
        .route("/", get(index_page))
        .route("/next-video", get(next_video))
        .route("/tag-video/:id", post(tag_video))
        .route("/stats", get(stats))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service(VIDEO_MOUNT, ServeDir::new(video_root))
        .with_state(state)
}

/// Serves `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down HTTP server");
        })
        .await
}
