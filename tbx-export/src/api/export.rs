//! Playlist export endpoint

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::models::ExportResponse;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/:playlist_id
///
/// **Response:** `{"success": true, "data": {"name", "type", "year", "image", "songs"}}`
///
/// **Errors:**
/// - 400 Bad Request: playlist id is not a base-62 identifier
/// - 404 Not Found: playlist unknown or has no searchable tracks
/// - 502 Bad Gateway: token refresh or playlist provider failure
///
/// Songs that cannot be matched in the catalog are left out; an export
/// where nothing matched still succeeds with an empty `songs` list.
pub async fn export_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Json<ExportResponse>> {
    if !is_valid_playlist_id(&playlist_id) {
        return Err(ApiError::BadRequest(format!(
            "Invalid playlist id: {:?}",
            playlist_id
        )));
    }

    let response = state.exporter.export(&playlist_id).await?;
    Ok(Json(response))
}

fn is_valid_playlist_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Build export routes
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/api/:playlist_id", get(export_playlist))
}
