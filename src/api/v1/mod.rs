//! v1 API endpoints

pub mod loaders;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/loaders/s3/load", post(loaders::load_documents))
        .route("/loaders/s3/regions", get(loaders::list_regions))
}
