//! HTTP client for the Unstructured partitioning API

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::{
    ChunkingStrategy, ExtractedDocument, LoaderError, PartitionConfig, PartitioningClient,
};

pub const API_KEY_HEADER: &str = "unstructured-api-key";

/// Element as returned by the partitioning service
#[derive(Debug, Deserialize)]
struct UnstructuredElement {
    #[serde(rename = "type", default)]
    element_type: Option<String>,
    #[serde(default, alias = "content")]
    text: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Partitioning client backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct UnstructuredClient {
    client: reqwest::Client,
}

impl UnstructuredClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, ...)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PartitioningClient for UnstructuredClient {
    async fn partition(
        &self,
        path: &Path,
        config: &PartitionConfig,
    ) -> Result<Vec<ExtractedDocument>, LoaderError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            LoaderError::partition(path, format!("Failed to read staged file: {}", e))
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        info!(
            url = %config.api_url,
            file = %file_name,
            size = data.len(),
            strategy = config.strategy.as_str(),
            chunking = config.chunking_strategy.as_str(),
            "Partitioning file"
        );

        let mut request = self
            .client
            .post(&config.api_url)
            .multipart(build_form(file_name, data, config));

        if let Some(api_key) = &config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoaderError::partition(path, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Partitioning service rejected the file");
            return Err(LoaderError::partition(
                path,
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            LoaderError::partition(path, format!("Failed to parse response: {}", e))
        })?;

        let documents = elements_to_documents(body).map_err(|m| LoaderError::partition(path, m))?;
        debug!(documents = documents.len(), "Partitioning response received");

        Ok(documents)
    }
}

fn build_form(file_name: String, data: Vec<u8>, config: &PartitionConfig) -> Form {
    let mut form = Form::new()
        .part("files", Part::bytes(data).file_name(file_name))
        .text("strategy", config.strategy.as_str());

    for language in &config.ocr_languages {
        form = form.text("ocr_languages", language.clone());
    }

    form = form.text("encoding", config.encoding.clone());

    if config.coordinates {
        form = form.text("coordinates", "true");
    }

    if config.xml_keep_tags {
        form = form.text("xml_keep_tags", "true");
    }

    let skip_types: Vec<&str> = config
        .skip_infer_table_types
        .iter()
        .map(|t| t.as_str())
        .collect();
    form = form.text(
        "skip_infer_table_types",
        serde_json::to_string(&skip_types).unwrap_or_else(|_| "[]".to_string()),
    );

    form = form.text("hi_res_model_name", config.hi_res_model_name.as_str());

    if config.include_page_breaks {
        form = form.text("include_page_breaks", "true");
    }

    if config.chunking_strategy != ChunkingStrategy::None {
        form = form.text("chunking_strategy", config.chunking_strategy.as_str());
    }

    form = form.text(
        "multipage_sections",
        if config.multi_page_sections { "true" } else { "false" },
    );

    if let Some(n) = config.combine_under_n_chars {
        form = form.text("combine_under_n_chars", n.to_string());
    }

    if let Some(n) = config.new_after_n_chars {
        form = form.text("new_after_n_chars", n.to_string());
    }

    form.text("max_characters", config.max_characters.to_string())
}

/// Keep elements with non-empty text, in order, tagging each with its category
fn elements_to_documents(body: Value) -> Result<Vec<ExtractedDocument>, String> {
    let Value::Array(raw) = body else {
        return Err(format!(
            "Expected partitioning request to return an array, but got {}",
            describe(&body)
        ));
    };

    let mut documents = Vec::with_capacity(raw.len());

    for value in raw {
        let element: UnstructuredElement = match serde_json::from_value(value) {
            Ok(element) => element,
            Err(e) => {
                debug!(error = %e, "Skipping malformed element");
                continue;
            }
        };

        let text = match element.text {
            Some(Value::String(text)) if !text.is_empty() => text,
            _ => continue,
        };

        let mut metadata = match element.metadata {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if let Some(category) = element.element_type {
            metadata.insert("category".to_string(), Value::String(category));
        }

        documents.push(ExtractedDocument {
            content: text,
            metadata,
        });
    }

    Ok(documents)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
