//! API request/response types

pub mod error;
pub mod json;
pub mod loader;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use loader::{DocumentsResponse, ListResponse, RegionsResponse};
