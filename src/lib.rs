//! S3 document loader
//!
//! Fetches one object from S3 (or an S3-compatible store), stages it in a
//! per-invocation scratch directory, partitions it through an Unstructured
//! API and returns the elements as documents with normalized metadata.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{ExtractedDocument, LoadRequest, LoaderConfig, LoaderError};
pub use infrastructure::loader::{DefaultLoaderService, LoaderService, S3DocumentLoader};
