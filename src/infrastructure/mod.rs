//! Infrastructure layer - External service implementations

pub mod loader;
pub mod observability;
pub mod s3;
pub mod staging;
pub mod unstructured;
