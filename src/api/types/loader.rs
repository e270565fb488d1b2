//! Response bodies of the loader endpoints

use serde::Serialize;

use crate::domain::{AwsRegion, ExtractedDocument};

/// `{"object": "list", "data": [...]}`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub object: &'static str,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            object: "list",
            data,
        }
    }
}

pub type DocumentsResponse = ListResponse<ExtractedDocument>;
pub type RegionsResponse = ListResponse<AwsRegion>;
