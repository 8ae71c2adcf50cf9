use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use trendscope_core::{
    dedup_first_seen, ChannelHistory, ChannelProfile, CreatedWindow, DirectoryQuery,
    GrowthReport, SortKey,
};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ChannelsQuery {
    pub sort: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChannelGrowth {
    channel_id: String,
    channel_title: String,
    /// `None` until two days have been recorded.
    growth: Option<GrowthReport>,
}

pub(super) async fn list_channels(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ChannelsQuery>,
) -> Result<Json<ApiResponse<Vec<ChannelProfile>>>, ApiError> {
    let directories = state
        .store
        .load_all_directories()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let merged = dedup_first_seen(directories.into_iter().map(|(_, profiles)| profiles));
    if merged.is_empty() {
        return Err(ApiError::not_found(req_id.0, "no channel data collected yet"));
    }

    let directory_query = DirectoryQuery {
        sort: SortKey::from_param(query.sort.as_deref()),
        created_within: CreatedWindow::from_param(query.date.as_deref()),
    };
    let data = directory_query.apply(merged, Utc::now());

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn channel_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(channel_id): Path<String>,
) -> Result<Json<ApiResponse<ChannelHistory>>, ApiError> {
    let history = load_history(&state, &req_id, &channel_id).await?;
    Ok(Json(ApiResponse::new(history, req_id.0)))
}

pub(super) async fn channel_growth(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(channel_id): Path<String>,
) -> Result<Json<ApiResponse<ChannelGrowth>>, ApiError> {
    let history = load_history(&state, &req_id, &channel_id).await?;
    let data = ChannelGrowth {
        growth: history.latest_growth(),
        channel_id: history.channel_id,
        channel_title: history.channel_title,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

async fn load_history(
    state: &AppState,
    req_id: &RequestId,
    channel_id: &str,
) -> Result<ChannelHistory, ApiError> {
    state
        .store
        .load_history(channel_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id.0.clone(), format!("channel {channel_id} not found")))
}
