//! Masking step API handlers
//!
//! GET /masking, POST /masking/detections/:id/option,
//! POST /masking/detections/:id/toggle, POST /masking/select-all,
//! POST /masking/apply

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::findings::MaskingSnapshot;
use crate::AppState;

/// Body of the option assignment endpoints
#[derive(Debug, Deserialize)]
pub struct MaskingOptionRequest {
    pub option_id: String,
}

/// GET /masking
pub async fn get_masking(State(state): State<AppState>) -> Json<MaskingSnapshot> {
    Json(state.masking.snapshot().await)
}

/// POST /masking/detections/:id/option
pub async fn assign_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MaskingOptionRequest>,
) -> ApiResult<Json<MaskingSnapshot>> {
    let snapshot = state.masking.assign(&id, &request.option_id).await?;
    Ok(Json(snapshot))
}

/// POST /masking/detections/:id/toggle
pub async fn toggle_detection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MaskingSnapshot>> {
    let snapshot = state.masking.toggle(&id).await?;
    Ok(Json(snapshot))
}

/// POST /masking/select-all
pub async fn select_all(State(state): State<AppState>) -> Json<MaskingSnapshot> {
    Json(state.masking.toggle_all().await)
}

/// POST /masking/apply
pub async fn apply_to_selected(
    State(state): State<AppState>,
    Json(request): Json<MaskingOptionRequest>,
) -> ApiResult<Json<MaskingSnapshot>> {
    let snapshot = state.masking.apply_to_selected(&request.option_id).await?;
    Ok(Json(snapshot))
}

/// Build masking routes
pub fn masking_routes() -> Router<AppState> {
    Router::new()
        .route("/masking", get(get_masking))
        .route("/masking/detections/:id/option", post(assign_option))
        .route("/masking/detections/:id/toggle", post(toggle_detection))
        .route("/masking/select-all", post(select_all))
        .route("/masking/apply", post(apply_to_selected))
}
