//! Fetch, stage, partition and normalize a single S3 object

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::domain::{
    ExtractedDocument, LoadRequest, LoaderConfig, LoaderDefaults, LoaderError, ObjectFetcher,
    PartitioningClient,
};
use crate::infrastructure::observability::record_document_load;
use crate::infrastructure::staging::ScratchArea;

/// Loads one S3 object into documents.
///
/// Each invocation owns its own staging directory, so a single loader can
/// serve concurrent calls.
#[derive(Debug)]
pub struct S3DocumentLoader<F, P>
where
    F: ObjectFetcher,
    P: PartitioningClient,
{
    fetcher: Arc<F>,
    partitioner: Arc<P>,
    scratch: ScratchArea,
}

impl<F: ObjectFetcher, P: PartitioningClient> S3DocumentLoader<F, P> {
    pub fn new(fetcher: Arc<F>, partitioner: Arc<P>, scratch: ScratchArea) -> Self {
        Self {
            fetcher,
            partitioner,
            scratch,
        }
    }

    /// Validate a raw request against `defaults`, then load it, optionally
    /// under a deadline.
    ///
    /// Nothing is fetched when validation fails.
    pub async fn load_request(
        &self,
        request: LoadRequest,
        defaults: &LoaderDefaults,
        deadline: Option<Duration>,
    ) -> Result<Vec<ExtractedDocument>, LoaderError> {
        let config = request.resolve(defaults).inspect_err(|e| {
            warn!(error = %e, "Rejected load request");
            record_document_load(e.kind(), Duration::ZERO, 0);
        })?;

        match deadline {
            Some(timeout) => self.load_with_deadline(&config, timeout).await,
            None => self.load(&config).await,
        }
    }

    /// Run the pipeline once for `config`
    #[instrument(skip_all, fields(bucket = %config.object.bucket, key = %config.object.key))]
    pub async fn load(&self, config: &LoaderConfig) -> Result<Vec<ExtractedDocument>, LoaderError> {
        let started = Instant::now();
        let result = self.run(config).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(documents) => {
                info!(
                    documents = documents.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Object loaded"
                );
                record_document_load("success", elapsed, documents.len());
            }
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    error = %e,
                    duration_ms = elapsed.as_millis() as u64,
                    "Object load failed"
                );
                record_document_load(e.kind(), elapsed, 0);
            }
        }

        result
    }

    /// Like [`load`](Self::load), but gives up after `timeout`.
    ///
    /// On expiry the in-flight future is dropped, which removes its staging
    /// directory before this returns.
    pub async fn load_with_deadline(
        &self,
        config: &LoaderConfig,
        timeout: Duration,
    ) -> Result<Vec<ExtractedDocument>, LoaderError> {
        match tokio::time::timeout(timeout, self.load(config)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    object = %config.object,
                    timeout_ms = timeout.as_millis() as u64,
                    "Object load exceeded its deadline"
                );
                record_document_load("deadline", timeout, 0);

                Err(LoaderError::DeadlineExceeded {
                    bucket: config.object.bucket.clone(),
                    key: config.object.key.clone(),
                    timeout_ms: timeout.as_millis(),
                })
            }
        }
    }

    async fn run(&self, config: &LoaderConfig) -> Result<Vec<ExtractedDocument>, LoaderError> {
        config.validate()?;

        let bytes = self.fetcher.fetch(&config.object, &config.fetch).await?;

        let staged = self.scratch.acquire(&bytes, &config.object.key).await?;
        drop(bytes);

        let partitioned = self
            .partitioner
            .partition(staged.path(), &config.partition)
            .await;

        // Release failures are logged by the guard and never replace the outcome
        let _ = staged.release();

        let mut documents = partitioned?;
        config.metadata.apply(&mut documents);

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;

    use crate::domain::object::MockObjectFetcher;
    use crate::domain::partition::MockPartitioningClient;
    use crate::domain::{FetchErrorKind, OmitInput, PartitionConfig};

    fn entries(root: &Path) -> usize {
        std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0)
    }

    fn fetcher_returning(content: &'static [u8]) -> MockObjectFetcher {
        let mut fetcher = MockObjectFetcher::new();
        fetcher
            .expect_fetch()
            .returning(move |_, _| Ok(Bytes::from_static(content)));
        fetcher
    }

    fn loader<P: PartitioningClient>(
        fetcher: MockObjectFetcher,
        partitioner: P,
        root: &Path,
    ) -> S3DocumentLoader<MockObjectFetcher, P> {
        S3DocumentLoader::new(
            Arc::new(fetcher),
            Arc::new(partitioner),
            ScratchArea::new(root),
        )
    }

    fn config(request: LoadRequest) -> LoaderConfig {
        request.resolve(&LoaderDefaults::default()).unwrap()
    }

    #[tokio::test]
    async fn test_load_returns_documents_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let seen: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
        let seen_in_mock = seen.clone();

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().times(1).returning(move |path, _| {
            assert_eq!(std::fs::read(path).unwrap(), b"pdf-bytes");
            *seen_in_mock.lock().unwrap() = Some(path.to_path_buf());
            Ok(vec![
                ExtractedDocument::new("Title").with_metadata("category", json!("Title")),
                ExtractedDocument::new("Body").with_metadata("source", json!("")),
            ])
        });

        let loader = loader(fetcher_returning(b"pdf-bytes"), partitioner, root.path());
        let docs = loader
            .load(&config(LoadRequest::new("docs", "AI-Paper.pdf")))
            .await
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "Title");
        assert_eq!(docs[0].metadata["source"], json!("source"));
        assert_eq!(docs[1].metadata["source"], json!("source"));

        let staged = seen.lock().unwrap().clone().unwrap();
        assert!(staged.ends_with("AI-Paper.pdf"));
        assert!(!staged.exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_creates_no_staging_dir() {
        let root = tempfile::tempdir().unwrap();

        let mut fetcher = MockObjectFetcher::new();
        fetcher.expect_fetch().returning(|object, _| {
            Err(LoaderError::fetch(
                FetchErrorKind::NotFound,
                &object.bucket,
                &object.key,
                "NoSuchKey",
            ))
        });

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().times(0);

        let err = loader(fetcher, partitioner, root.path())
            .load(&config(LoadRequest::new("docs", "missing.pdf")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LoaderError::Fetch {
                kind: FetchErrorKind::NotFound,
                ..
            }
        ));
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_stage_failure_skips_partitioning() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().times(0);

        let err = loader(fetcher_returning(b"x"), partitioner, &blocker)
            .load(&config(LoadRequest::new("docs", "a.pdf")))
            .await
            .unwrap_err();

        assert!(matches!(err, LoaderError::Stage { .. }));
    }

    #[tokio::test]
    async fn test_partition_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().returning(|path, _| {
            assert!(path.is_file());
            Err(LoaderError::partition(path, "HTTP 500: boom"))
        });

        let err = loader(fetcher_returning(b"x"), partitioner, root.path())
            .load(&config(LoadRequest::new("docs", "reports/a.pdf")))
            .await
            .unwrap_err();

        match err {
            LoaderError::Partition { path, message } => {
                assert!(path.ends_with("reports/a.pdf"));
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let root = tempfile::tempdir().unwrap();

        let mut fetcher = MockObjectFetcher::new();
        fetcher.expect_fetch().times(0);
        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().times(0);

        let request = LoadRequest {
            max_characters: Some(500),
            combine_under_n_chars: Some(600),
            ..LoadRequest::new("docs", "a.pdf")
        };

        let err = loader(fetcher, partitioner, root.path())
            .load_request(request, &LoaderDefaults::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, LoaderError::Config { .. }));
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_edited_config_makes_no_calls() {
        let root = tempfile::tempdir().unwrap();

        let mut fetcher = MockObjectFetcher::new();
        fetcher.expect_fetch().times(0);
        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().times(0);

        let mut config = config(LoadRequest::new("docs", "a.pdf"));
        config.partition.max_characters = 500;
        config.partition.combine_under_n_chars = Some(600);

        let err = loader(fetcher, partitioner, root.path())
            .load(&config)
            .await
            .unwrap_err();

        assert!(matches!(err, LoaderError::Config { .. }));
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let root = tempfile::tempdir().unwrap();

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().returning(|_, _| {
            Ok((0..20)
                .map(|i| ExtractedDocument::new(format!("element {}", i)))
                .collect())
        });

        let docs = loader(fetcher_returning(b"x"), partitioner, root.path())
            .load(&config(LoadRequest::new("docs", "a.pdf")))
            .await
            .unwrap();

        let contents: Vec<String> = docs.into_iter().map(|d| d.content).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("element {}", i)).collect();
        assert_eq!(contents, expected);
    }

    #[tokio::test]
    async fn test_omit_all_with_additional_metadata() {
        let root = tempfile::tempdir().unwrap();

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().returning(|_, _| {
            Ok(vec![ExtractedDocument::new("text")
                .with_metadata("category", json!("Title"))
                .with_metadata("page_number", json!(1))])
        });

        let request = LoadRequest {
            additional_metadata: Some(json!({"foo": "bar"})),
            omit_metadata_keys: Some(OmitInput::Text("*".to_string())),
            ..LoadRequest::new("docs", "a.pdf")
        };

        let docs = loader(fetcher_returning(b"x"), partitioner, root.path())
            .load_request(request, &LoaderDefaults::default(), None)
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(serde_json::Value::Object(docs[0].metadata.clone()), json!({"foo": "bar"}));
    }

    #[tokio::test]
    async fn test_concurrent_loads_use_distinct_dirs() {
        let root = tempfile::tempdir().unwrap();
        let dirs: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));
        let dirs_in_mock = dirs.clone();

        let mut partitioner = MockPartitioningClient::new();
        partitioner.expect_partition().times(2).returning(move |path, _| {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            dirs_in_mock.lock().unwrap().push(dir);
            Ok(vec![ExtractedDocument::new("x")])
        });

        let loader = loader(fetcher_returning(b"x"), partitioner, root.path());
        let config = config(LoadRequest::new("docs", "same.pdf"));

        let (first, second) = tokio::join!(loader.load(&config), loader.load(&config));
        assert!(first.is_ok());
        assert!(second.is_ok());

        let dirs = dirs.lock().unwrap();
        assert_eq!(dirs.len(), 2);
        assert_ne!(dirs[0], dirs[1]);
        assert_eq!(entries(root.path()), 0);
    }

    struct StalledPartitioner {
        seen: Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl PartitioningClient for StalledPartitioner {
        async fn partition(
            &self,
            path: &Path,
            _config: &PartitionConfig,
        ) -> Result<Vec<ExtractedDocument>, LoaderError> {
            *self.seen.lock().unwrap() = Some(path.to_path_buf());
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_deadline_cancels_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let partitioner = StalledPartitioner {
            seen: Mutex::new(None),
        };

        let loader = loader(fetcher_returning(b"x"), partitioner, root.path());
        let err = loader
            .load_with_deadline(
                &config(LoadRequest::new("docs", "slow.pdf")),
                Duration::from_millis(100),
            )
            .await
            .unwrap_err();

        match err {
            LoaderError::DeadlineExceeded {
                bucket,
                key,
                timeout_ms,
            } => {
                assert_eq!(bucket, "docs");
                assert_eq!(key, "slow.pdf");
                assert_eq!(timeout_ms, 100);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let staged = loader.partitioner.seen.lock().unwrap().clone().unwrap();
        assert!(!staged.exists());
        assert_eq!(entries(root.path()), 0);
    }
}
