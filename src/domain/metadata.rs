//! Metadata merge / override / omit rules applied to extracted documents

use std::convert::Infallible;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::partition::ExtractedDocument;

pub const DEFAULT_SOURCE_ID_KEY: &str = "source";

/// Which metadata keys to drop
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OmitMetadataKeys {
    /// Drop nothing
    #[default]
    None,
    /// Drop these keys; entries may be dotted paths into nested objects
    Keys(Vec<String>),
    /// Discard all original metadata
    All,
}

impl OmitMetadataKeys {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if keys.is_empty() {
            Self::None
        } else {
            Self::Keys(keys)
        }
    }
}

impl FromStr for OmitMetadataKeys {
    type Err = Infallible;

    /// Parse the comma-separated form; `*` alone means all keys
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "*" {
            return Ok(Self::All);
        }

        Ok(Self::keys(s.split(',')))
    }
}

/// How to rewrite each document's metadata before it is returned
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataPolicy {
    pub additional: Option<Map<String, Value>>,
    pub source_id_key: String,
    pub omit: OmitMetadataKeys,
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        Self {
            additional: None,
            source_id_key: DEFAULT_SOURCE_ID_KEY.to_string(),
            omit: OmitMetadataKeys::None,
        }
    }
}

impl MetadataPolicy {
    pub fn new(source_id_key: impl Into<String>) -> Self {
        Self {
            source_id_key: source_id_key.into(),
            ..Self::default()
        }
    }

    pub fn with_additional(mut self, additional: Map<String, Value>) -> Self {
        self.additional = Some(additional);
        self
    }

    pub fn with_omit(mut self, omit: OmitMetadataKeys) -> Self {
        self.omit = omit;
        self
    }

    /// Rewrite every document's metadata in place; order is untouched
    pub fn apply(&self, documents: &mut [ExtractedDocument]) {
        for document in documents.iter_mut() {
            let original = std::mem::take(&mut document.metadata);
            document.metadata = self.normalize(original);
        }
    }

    fn normalize(&self, original: Map<String, Value>) -> Map<String, Value> {
        match (&self.additional, &self.omit) {
            (Some(additional), OmitMetadataKeys::All) => additional.clone(),
            (None, OmitMetadataKeys::All) => {
                let mut metadata = Map::new();
                metadata.insert(self.source_id_key.clone(), self.source_id(&original));
                metadata
            }
            (additional, omit) => {
                let source = self.source_id(&original);
                let mut metadata = original;

                if let Some(additional) = additional {
                    for (key, value) in additional {
                        metadata.insert(key.clone(), value.clone());
                    }
                }

                metadata.insert(self.source_id_key.clone(), source);

                if let OmitMetadataKeys::Keys(keys) = omit {
                    for key in keys {
                        remove_path(&mut metadata, key);
                    }
                }

                metadata
            }
        }
    }

    // The element's own source id, read before any merge; a missing one
    // falls back to the key name itself.
    fn source_id(&self, original: &Map<String, Value>) -> Value {
        original
            .get(&self.source_id_key)
            .filter(|v| !is_blank(v))
            .cloned()
            .unwrap_or_else(|| Value::String(self.source_id_key.clone()))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Remove `path` from `metadata`. A literal top-level key wins over a
/// dotted path; otherwise each segment descends into a nested object.
fn remove_path(metadata: &mut Map<String, Value>, path: &str) {
    if metadata.remove(path).is_some() {
        return;
    }

    let mut segments = path.split('.').peekable();
    let mut current = metadata;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.remove(segment);
            return;
        }

        match current.get_mut(segment) {
            Some(Value::Object(child)) => current = child,
            _ => return,
        }
    }
}
