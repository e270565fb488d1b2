//! Document loading pipeline

mod pipeline;
mod service;

pub use pipeline::S3DocumentLoader;
pub use service::{DefaultLoaderService, LoaderService};
