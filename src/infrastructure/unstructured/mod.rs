//! Unstructured partitioning service

mod client;

pub use client::{UnstructuredClient, API_KEY_HEADER};
