//! Application state for shared services

use std::sync::Arc;

use crate::domain::{
    ExtractedDocument, LoadRequest, LoaderError, ObjectFetcher, PartitioningClient,
};
use crate::infrastructure::loader::LoaderService;

/// Application state shared by the handlers
#[derive(Clone)]
pub struct AppState {
    pub loader_service: Arc<dyn LoaderServiceTrait>,
}

impl AppState {
    pub fn new(loader_service: Arc<dyn LoaderServiceTrait>) -> Self {
        Self { loader_service }
    }
}

/// Loads documents for one raw request
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LoaderServiceTrait: Send + Sync {
    async fn load(&self, request: LoadRequest) -> Result<Vec<ExtractedDocument>, LoaderError>;
}

#[async_trait::async_trait]
impl<F, P> LoaderServiceTrait for LoaderService<F, P>
where
    F: ObjectFetcher + 'static,
    P: PartitioningClient + 'static,
{
    async fn load(&self, request: LoadRequest) -> Result<Vec<ExtractedDocument>, LoaderError> {
        LoaderService::load(self, request).await
    }
}
