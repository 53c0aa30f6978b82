use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::errors::AppError;
use crate::extraction::thumbnail::decode_png_data_uri;
use crate::history::StoredResumeItem;
use crate::state::AppState;

/// GET /api/v1/history
pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<StoredResumeItem>> {
    Json(state.history.load_all().await)
}

/// GET /api/v1/history/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredResumeItem>, AppError> {
    state
        .history
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.history.remove_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/history
pub async fn handle_clear(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.history.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/history/:id/thumbnail
pub async fn handle_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .history
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;

    let png = decode_png_data_uri(&item.thumbnail)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} has no PNG thumbnail")))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
