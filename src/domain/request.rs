//! Caller-facing load request and its validated, defaults-resolved form

use serde::Deserialize;
use serde_json::{Map, Value};

use super::credentials::{resolve_credentials, AwsCredentialRecord};
use super::error::LoaderError;
use super::metadata::{MetadataPolicy, OmitMetadataKeys, DEFAULT_SOURCE_ID_KEY};
use super::object::{FetchOptions, ObjectReference, DEFAULT_REGION};
use super::partition::{
    default_skip_infer_table_types, ChunkingStrategy, FileType, HiResModelName, PartitionConfig,
    Strategy, DEFAULT_ENCODING, DEFAULT_MAX_CHARACTERS, DEFAULT_UNSTRUCTURED_API_URL,
};

/// A list given either natively or as a JSON-encoded string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    List(Vec<String>),
    Encoded(String),
}

impl ListInput {
    fn into_vec(self, field: &str) -> Result<Vec<String>, LoaderError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Encoded(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Self::Encoded(raw) => serde_json::from_str(&raw).map_err(|e| {
                LoaderError::config(format!("{} must be a JSON array of strings: {}", field, e))
            }),
        }
    }
}

impl From<Vec<String>> for ListInput {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Metadata keys to omit, given as a comma-separated string or as a list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OmitInput {
    Text(String),
    List(Vec<String>),
}

impl From<OmitInput> for OmitMetadataKeys {
    fn from(input: OmitInput) -> Self {
        match input {
            OmitInput::Text(text) => text.parse().unwrap_or_default(),
            OmitInput::List(keys) if keys.len() == 1 && keys[0].trim() == "*" => Self::All,
            OmitInput::List(keys) => Self::keys(keys),
        }
    }
}

/// Deployment-wide fallbacks for values a request may leave out
#[derive(Debug, Clone)]
pub struct LoaderDefaults {
    pub unstructured_api_url: String,
    pub unstructured_api_key: Option<String>,
    pub region: String,
}

impl Default for LoaderDefaults {
    fn default() -> Self {
        Self {
            unstructured_api_url: DEFAULT_UNSTRUCTURED_API_URL.to_string(),
            unstructured_api_key: None,
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Everything a caller may pass to one load invocation
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub bucket_name: String,
    pub key_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, alias = "credential")]
    pub credentials: Option<AwsCredentialRecord>,
    #[serde(default, alias = "unstructuredAPIUrl")]
    pub unstructured_api_url: Option<String>,
    #[serde(default, alias = "unstructuredAPIKey")]
    pub unstructured_api_key: Option<String>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub coordinates: Option<bool>,
    #[serde(default)]
    pub skip_infer_table_types: Option<ListInput>,
    #[serde(default)]
    pub hi_res_model_name: Option<HiResModelName>,
    #[serde(default)]
    pub chunking_strategy: Option<ChunkingStrategy>,
    #[serde(default)]
    pub ocr_languages: Option<ListInput>,
    #[serde(default)]
    pub xml_keep_tags: Option<bool>,
    #[serde(default)]
    pub include_page_breaks: Option<bool>,
    #[serde(default)]
    pub multi_page_sections: Option<bool>,
    #[serde(default)]
    pub combine_under_n_chars: Option<u32>,
    #[serde(default)]
    pub new_after_n_chars: Option<u32>,
    #[serde(default)]
    pub max_characters: Option<u32>,
    #[serde(default)]
    pub source_id_key: Option<String>,
    #[serde(default, alias = "metadata")]
    pub additional_metadata: Option<Value>,
    #[serde(default)]
    pub omit_metadata_keys: Option<OmitInput>,
}

impl std::fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadRequest")
            .field("bucket_name", &self.bucket_name)
            .field("key_name", &self.key_name)
            .field("region", &self.region)
            .field("credentials", &self.credentials)
            .field("unstructured_api_url", &self.unstructured_api_url)
            .field("unstructured_api_key", &self.unstructured_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("strategy", &self.strategy)
            .field("chunking_strategy", &self.chunking_strategy)
            .field("source_id_key", &self.source_id_key)
            .finish_non_exhaustive()
    }
}

impl LoadRequest {
    pub fn new(bucket_name: impl Into<String>, key_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            key_name: key_name.into(),
            ..Self::default()
        }
    }

    /// Apply defaults and validate. Runs before any network call.
    pub fn resolve(self, defaults: &LoaderDefaults) -> Result<LoaderConfig, LoaderError> {
        let bucket = self.bucket_name.trim().to_string();
        if bucket.is_empty() {
            return Err(LoaderError::config("bucketName is required"));
        }

        let key = self.key_name.clone();
        validate_key(&key)?;

        let region = non_empty(self.region).unwrap_or_else(|| defaults.region.clone());
        if region.trim().is_empty() {
            return Err(LoaderError::config("region is required"));
        }

        let skip_infer_table_types = match self.skip_infer_table_types {
            Some(input) => parse_file_types(input.into_vec("skipInferTableTypes")?)?,
            None => default_skip_infer_table_types(),
        };

        let ocr_languages = match self.ocr_languages {
            Some(input) => dedupe(
                input
                    .into_vec("ocrLanguages")?
                    .into_iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty()),
            ),
            None => Vec::new(),
        };

        let partition = PartitionConfig {
            api_url: non_empty(self.unstructured_api_url)
                .unwrap_or_else(|| defaults.unstructured_api_url.clone()),
            api_key: non_empty(self.unstructured_api_key)
                .or_else(|| defaults.unstructured_api_key.clone()),
            strategy: self.strategy.unwrap_or_default(),
            encoding: non_empty(self.encoding).unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
            coordinates: self.coordinates.unwrap_or(false),
            skip_infer_table_types,
            hi_res_model_name: self.hi_res_model_name.unwrap_or_default(),
            chunking_strategy: self.chunking_strategy.unwrap_or_default(),
            ocr_languages,
            xml_keep_tags: self.xml_keep_tags.unwrap_or(false),
            include_page_breaks: self.include_page_breaks.unwrap_or(false),
            multi_page_sections: self.multi_page_sections.unwrap_or(false),
            combine_under_n_chars: self.combine_under_n_chars,
            new_after_n_chars: self.new_after_n_chars,
            max_characters: self.max_characters.unwrap_or(DEFAULT_MAX_CHARACTERS),
        };
        partition.validate()?;

        let source_id_key = non_empty(self.source_id_key)
            .map(|k| k.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SOURCE_ID_KEY.to_string());

        let metadata = MetadataPolicy {
            additional: parse_additional_metadata(self.additional_metadata)?,
            source_id_key,
            omit: self.omit_metadata_keys.map(Into::into).unwrap_or_default(),
        };

        Ok(LoaderConfig {
            object: ObjectReference::new(bucket, key),
            fetch: FetchOptions {
                region,
                credentials: resolve_credentials(self.credentials.as_ref()),
            },
            partition,
            metadata,
        })
    }
}

/// Validated configuration of one load invocation; read-only once built
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub object: ObjectReference,
    pub fetch: FetchOptions,
    pub partition: PartitionConfig,
    pub metadata: MetadataPolicy,
}

impl LoaderConfig {
    /// Re-check a config built or edited outside [`LoadRequest::resolve`]
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.object.bucket.trim().is_empty() {
            return Err(LoaderError::config("bucketName is required"));
        }
        validate_key(&self.object.key)?;

        if self.fetch.region.trim().is_empty() {
            return Err(LoaderError::config("region is required"));
        }

        self.partition.validate()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_key(key: &str) -> Result<(), LoaderError> {
    if key.trim().is_empty() {
        return Err(LoaderError::config("keyName is required"));
    }

    if key.starts_with('/') || key.starts_with('\\') {
        return Err(LoaderError::config(format!(
            "keyName '{}' must be a relative object key",
            key
        )));
    }

    let escapes = key
        .split(['/', '\\'])
        .any(|segment| segment == "..");

    if escapes {
        return Err(LoaderError::config(format!(
            "keyName '{}' must not contain '..' segments",
            key
        )));
    }

    if key.ends_with('/') {
        return Err(LoaderError::config(format!(
            "keyName '{}' names a folder, not an object",
            key
        )));
    }

    Ok(())
}

fn parse_file_types(raw: Vec<String>) -> Result<Vec<FileType>, LoaderError> {
    let mut types: Vec<FileType> = Vec::with_capacity(raw.len());

    for item in raw {
        let file_type: FileType = item.parse()?;
        if !types.contains(&file_type) {
            types.push(file_type);
        }
    }

    Ok(types)
}

fn dedupe(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn parse_additional_metadata(
    value: Option<Value>,
) -> Result<Option<Map<String, Value>>, LoaderError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(LoaderError::config(
                "additionalMetadata must be a JSON object",
            )),
            Err(e) => Err(LoaderError::config(format!(
                "additionalMetadata is not valid JSON: {}",
                e
            ))),
        },
        Some(_) => Err(LoaderError::config(
            "additionalMetadata must be a JSON object",
        )),
    }
}
