use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use vidora_core::resolver::parse_id;
use vidora_types::api::{ApiResponse, ChannelProfile, ChannelStats};

use crate::auth::AppState;
use crate::error::{ApiResult, ok, run_blocking};
use crate::middleware::Viewer;

pub async fn channel_profile(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<ChannelProfile> {
    let profile = run_blocking(&state, move |engine| {
        engine.channels().channel_profile(&handle, viewer)
    })
    .await?;
    ok(profile, "Channel profile fetched successfully")
}

pub async fn channel_stats(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ChannelStats> {
    let channel = parse_id(&channel_id)?;
    let stats = run_blocking(&state, move |engine| engine.channels().channel_stats(channel)).await?;
    ok(stats, "Channel stats fetched successfully")
}

pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(json!({ "status": "ok" }), "Service is healthy"))
}

pub async fn not_found() -> (StatusCode, Json<ApiResponse<Value>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(404, "Route not found")),
    )
}

pub async fn method_not_allowed() -> (StatusCode, Json<ApiResponse<Value>>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::failure(405, "Method not allowed")),
    )
}
