//! Remote object references and the fetcher seam

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::credentials::AccessKeyPair;
use super::error::LoaderError;

/// Default AWS region used when the caller does not pick one
pub const DEFAULT_REGION: &str = "us-east-1";

/// A selectable AWS region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AwsRegion {
    pub name: &'static str,
    pub label: &'static str,
}

const fn region(name: &'static str, label: &'static str) -> AwsRegion {
    AwsRegion { name, label }
}

/// Regions offered to callers; any other identifier is still accepted
pub const AWS_REGIONS: &[AwsRegion] = &[
    region("us-east-1", "US East (N. Virginia)"),
    region("us-east-2", "US East (Ohio)"),
    region("us-west-1", "US West (N. California)"),
    region("us-west-2", "US West (Oregon)"),
    region("af-south-1", "Africa (Cape Town)"),
    region("ap-east-1", "Asia Pacific (Hong Kong)"),
    region("ap-south-1", "Asia Pacific (Mumbai)"),
    region("ap-northeast-1", "Asia Pacific (Tokyo)"),
    region("ap-northeast-2", "Asia Pacific (Seoul)"),
    region("ap-northeast-3", "Asia Pacific (Osaka)"),
    region("ap-southeast-1", "Asia Pacific (Singapore)"),
    region("ap-southeast-2", "Asia Pacific (Sydney)"),
    region("ca-central-1", "Canada (Central)"),
    region("eu-central-1", "Europe (Frankfurt)"),
    region("eu-central-2", "Europe (Zurich)"),
    region("eu-west-1", "Europe (Ireland)"),
    region("eu-west-2", "Europe (London)"),
    region("eu-west-3", "Europe (Paris)"),
    region("eu-north-1", "Europe (Stockholm)"),
    region("eu-south-1", "Europe (Milan)"),
    region("me-south-1", "Middle East (Bahrain)"),
    region("me-central-1", "Middle East (UAE)"),
    region("sa-east-1", "South America (Sao Paulo)"),
];

/// Identifies the source object of one load invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    pub bucket: String,
    pub key: String,
}

impl ObjectReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Where and as whom to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub region: String,
    pub credentials: Option<AccessKeyPair>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            credentials: None,
        }
    }
}

/// Downloads a whole object from blob storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Fetch the full content of `object`.
    ///
    /// The body is drained completely before returning; a failure while
    /// draining fails the whole fetch.
    async fn fetch(
        &self,
        object: &ObjectReference,
        options: &FetchOptions,
    ) -> Result<Bytes, LoaderError>;
}
