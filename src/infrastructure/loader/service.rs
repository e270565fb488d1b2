//! Loader service - a pipeline bound to its deployment settings

use std::sync::Arc;
use std::time::Duration;

use crate::config::LoaderSettings;
use crate::domain::{
    ExtractedDocument, LoadRequest, LoaderDefaults, LoaderError, ObjectFetcher,
    PartitioningClient,
};
use crate::infrastructure::s3::S3ObjectFetcher;
use crate::infrastructure::unstructured::UnstructuredClient;

use super::S3DocumentLoader;

/// Production wiring: AWS SDK fetcher and reqwest partitioning client
pub type DefaultLoaderService = LoaderService<S3ObjectFetcher, UnstructuredClient>;

/// Loads raw requests with the configured defaults and deadline
#[derive(Debug)]
pub struct LoaderService<F, P>
where
    F: ObjectFetcher,
    P: PartitioningClient,
{
    loader: S3DocumentLoader<F, P>,
    defaults: LoaderDefaults,
    deadline: Option<Duration>,
}

impl<F: ObjectFetcher, P: PartitioningClient> LoaderService<F, P> {
    pub fn new(
        loader: S3DocumentLoader<F, P>,
        defaults: LoaderDefaults,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            loader,
            defaults,
            deadline,
        }
    }

    pub fn defaults(&self) -> &LoaderDefaults {
        &self.defaults
    }

    pub async fn load(&self, request: LoadRequest) -> Result<Vec<ExtractedDocument>, LoaderError> {
        self.loader
            .load_request(request, &self.defaults, self.deadline)
            .await
    }
}

impl DefaultLoaderService {
    pub fn from_settings(settings: &LoaderSettings) -> Self {
        let loader = S3DocumentLoader::new(
            Arc::new(S3ObjectFetcher::new(settings.fetcher_config())),
            Arc::new(UnstructuredClient::new()),
            settings.scratch_area(),
        );

        Self::new(loader, settings.defaults(), settings.request_timeout())
    }
}
