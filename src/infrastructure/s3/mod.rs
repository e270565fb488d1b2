//! Amazon S3 (and S3-compatible) blob storage

mod fetcher;

pub use fetcher::{S3FetcherConfig, S3ObjectFetcher};
