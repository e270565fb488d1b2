//! S3 object fetcher

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{FetchErrorKind, FetchOptions, LoaderError, ObjectFetcher, ObjectReference};

const CREDENTIALS_PROVIDER_NAME: &str = "s3-document-loader";

/// Connection settings shared by every fetch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3FetcherConfig {
    /// Override for S3-compatible stores (MinIO, LocalStack, ...)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

/// Fetches objects with the AWS SDK.
///
/// A client is built per fetch because region and credentials are chosen
/// per invocation.
#[derive(Debug, Clone, Default)]
pub struct S3ObjectFetcher {
    config: S3FetcherConfig,
}

impl S3ObjectFetcher {
    pub fn new(config: S3FetcherConfig) -> Self {
        Self { config }
    }

    async fn client(&self, options: &FetchOptions) -> aws_sdk_s3::Client {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(options.region.clone()));

        if let Some(pair) = &options.credentials {
            loader = loader.credentials_provider(Credentials::new(
                pair.access_key_id(),
                pair.secret_access_key(),
                pair.session_token().map(str::to_string),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &self.config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        if self.config.force_path_style {
            builder = builder.force_path_style(true);
        }

        aws_sdk_s3::Client::from_conf(builder.build())
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    async fn fetch(
        &self,
        object: &ObjectReference,
        options: &FetchOptions,
    ) -> Result<Bytes, LoaderError> {
        info!(
            bucket = %object.bucket,
            key = %object.key,
            region = %options.region,
            static_credentials = options.credentials.is_some(),
            "Fetching object"
        );

        let client = self.client(options).await;

        let output = client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|e| {
                let kind = classify_sdk_error(&e);
                warn!(object = %object, kind = %kind, "GetObject failed");
                LoaderError::fetch(
                    kind,
                    &object.bucket,
                    &object.key,
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        // Drain the whole body; a partial file is useless downstream
        let body = output.body.collect().await.map_err(|e| {
            LoaderError::fetch(
                FetchErrorKind::Network,
                &object.bucket,
                &object.key,
                format!("failed to read object body: {}", e),
            )
        })?;

        let bytes = body.into_bytes();
        debug!(object = %object, size = bytes.len(), "Object fetched");

        Ok(bytes)
    }
}

fn classify_sdk_error<E>(error: &SdkError<E, HttpResponse>) -> FetchErrorKind
where
    E: ProvideErrorMetadata,
{
    match error {
        SdkError::ServiceError(service) => classify_service_error(
            service.err().code(),
            Some(service.raw().status().as_u16()),
        ),
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            FetchErrorKind::Network
        }
        _ => FetchErrorKind::Unknown,
    }
}

/// Map an S3 error code (and HTTP status when known) to a fetch error kind
pub(crate) fn classify_service_error(code: Option<&str>, status: Option<u16>) -> FetchErrorKind {
    match code {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => FetchErrorKind::NotFound,
        Some(
            "AccessDenied"
            | "AllAccessDisabled"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken"
            | "Forbidden",
        ) => FetchErrorKind::AccessDenied,
        _ => match status {
            Some(404) => FetchErrorKind::NotFound,
            Some(401 | 403) => FetchErrorKind::AccessDenied,
            _ => FetchErrorKind::Unknown,
        },
    }
}
