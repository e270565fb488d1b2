//! S3 loader endpoint handlers

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, DocumentsResponse, Json, RegionsResponse};
use crate::domain::{LoadRequest, AWS_REGIONS};

/// POST /v1/loaders/s3/load
pub async fn load_documents(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    debug!(
        bucket = %request.bucket_name,
        key = %request.key_name,
        "Loading S3 object"
    );

    let documents = state
        .loader_service
        .load(request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DocumentsResponse::new(documents)))
}

/// GET /v1/loaders/s3/regions
pub async fn list_regions() -> Json<RegionsResponse> {
    Json(RegionsResponse::new(AWS_REGIONS.to_vec()))
}
