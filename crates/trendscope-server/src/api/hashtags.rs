use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct HashtagsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct HashtagItem {
    tag: String,
    popularity: f64,
}

/// Hashtags by popularity, highest first. Without `limit` every tag is
/// returned.
pub(super) async fn list_hashtags(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<HashtagsQuery>,
) -> Result<Json<ApiResponse<Vec<HashtagItem>>>, ApiError> {
    let table = state
        .store
        .load_hashtags()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    if table.is_empty() {
        return Err(ApiError::not_found(req_id.0, "no hashtags collected yet"));
    }

    let limit = query.limit.map_or(usize::MAX, |l| l.max(1));
    let data = table
        .by_popularity()
        .into_iter()
        .take(limit)
        .map(|(tag, popularity)| HashtagItem { tag, popularity })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
