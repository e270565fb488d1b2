//! Partitioning configuration, extracted documents and the partitioning seam

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::error::LoaderError;

pub const DEFAULT_UNSTRUCTURED_API_URL: &str = "http://localhost:8000/general/v0/general";
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_MAX_CHARACTERS: u32 = 500;

/// Partitioning strategy for PDFs and images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Fast,
    HiRes,
    OcrOnly,
    #[default]
    Auto,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::HiRes => "hi_res",
            Self::OcrOnly => "ocr_only",
            Self::Auto => "auto",
        }
    }
}

impl FromStr for Strategy {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "hi_res" => Ok(Self::HiRes),
            "ocr_only" => Ok(Self::OcrOnly),
            "auto" => Ok(Self::Auto),
            other => Err(LoaderError::config(format!("Unknown strategy '{}'", other))),
        }
    }
}

/// Inference model used by the `hi_res` strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiResModelName {
    Chipper,
    #[default]
    #[serde(rename = "detectron2_onnx")]
    Detectron2Onnx,
    Yolox,
    YoloxQuantized,
}

impl HiResModelName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chipper => "chipper",
            Self::Detectron2Onnx => "detectron2_onnx",
            Self::Yolox => "yolox",
            Self::YoloxQuantized => "yolox_quantized",
        }
    }
}

impl FromStr for HiResModelName {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chipper" => Ok(Self::Chipper),
            "detectron2_onnx" => Ok(Self::Detectron2Onnx),
            "yolox" => Ok(Self::Yolox),
            "yolox_quantized" => Ok(Self::YoloxQuantized),
            other => Err(LoaderError::config(format!(
                "Unknown hi-res model name '{}'",
                other
            ))),
        }
    }
}

/// Chunking applied by the service to the returned elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    #[serde(alias = "None")]
    None,
    #[default]
    ByTitle,
}

impl ChunkingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ByTitle => "by_title",
        }
    }
}

impl FromStr for ChunkingStrategy {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "None" => Ok(Self::None),
            "by_title" => Ok(Self::ByTitle),
            other => Err(LoaderError::config(format!(
                "Unknown chunking strategy '{}'",
                other
            ))),
        }
    }
}

/// File types for which table-structure inference can be skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Doc,
    Docx,
    Eml,
    Epub,
    Heic,
    Htm,
    Html,
    Jpeg,
    Jpg,
    Md,
    Msg,
    Odt,
    Pdf,
    Png,
    Ppt,
    Pptx,
    Rtf,
    Text,
    Txt,
    Xls,
    Xlsx,
}

impl FileType {
    pub const ALL: [FileType; 21] = [
        Self::Doc,
        Self::Docx,
        Self::Eml,
        Self::Epub,
        Self::Heic,
        Self::Htm,
        Self::Html,
        Self::Jpeg,
        Self::Jpg,
        Self::Md,
        Self::Msg,
        Self::Odt,
        Self::Pdf,
        Self::Png,
        Self::Ppt,
        Self::Pptx,
        Self::Rtf,
        Self::Text,
        Self::Txt,
        Self::Xls,
        Self::Xlsx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Eml => "eml",
            Self::Epub => "epub",
            Self::Heic => "heic",
            Self::Htm => "htm",
            Self::Html => "html",
            Self::Jpeg => "jpeg",
            Self::Jpg => "jpg",
            Self::Md => "md",
            Self::Msg => "msg",
            Self::Odt => "odt",
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Ppt => "ppt",
            Self::Pptx => "pptx",
            Self::Rtf => "rtf",
            Self::Text => "text",
            Self::Txt => "txt",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
        }
    }
}

impl FromStr for FileType {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LoaderError::config(format!("Unknown file type '{}'", s)))
    }
}

pub fn default_skip_infer_table_types() -> Vec<FileType> {
    vec![FileType::Pdf, FileType::Jpg, FileType::Png]
}

/// Everything the partitioning service needs besides the file itself
#[derive(Clone, PartialEq)]
pub struct PartitionConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub strategy: Strategy,
    pub encoding: String,
    pub coordinates: bool,
    pub skip_infer_table_types: Vec<FileType>,
    pub hi_res_model_name: HiResModelName,
    pub chunking_strategy: ChunkingStrategy,
    pub ocr_languages: Vec<String>,
    pub xml_keep_tags: bool,
    pub include_page_breaks: bool,
    pub multi_page_sections: bool,
    pub combine_under_n_chars: Option<u32>,
    pub new_after_n_chars: Option<u32>,
    pub max_characters: u32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_UNSTRUCTURED_API_URL.to_string(),
            api_key: None,
            strategy: Strategy::default(),
            encoding: DEFAULT_ENCODING.to_string(),
            coordinates: false,
            skip_infer_table_types: default_skip_infer_table_types(),
            hi_res_model_name: HiResModelName::default(),
            chunking_strategy: ChunkingStrategy::default(),
            ocr_languages: Vec::new(),
            xml_keep_tags: false,
            include_page_breaks: false,
            multi_page_sections: false,
            combine_under_n_chars: None,
            new_after_n_chars: None,
            max_characters: DEFAULT_MAX_CHARACTERS,
        }
    }
}

impl std::fmt::Debug for PartitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("strategy", &self.strategy)
            .field("encoding", &self.encoding)
            .field("coordinates", &self.coordinates)
            .field("skip_infer_table_types", &self.skip_infer_table_types)
            .field("hi_res_model_name", &self.hi_res_model_name)
            .field("chunking_strategy", &self.chunking_strategy)
            .field("ocr_languages", &self.ocr_languages)
            .field("xml_keep_tags", &self.xml_keep_tags)
            .field("include_page_breaks", &self.include_page_breaks)
            .field("multi_page_sections", &self.multi_page_sections)
            .field("combine_under_n_chars", &self.combine_under_n_chars)
            .field("new_after_n_chars", &self.new_after_n_chars)
            .field("max_characters", &self.max_characters)
            .finish()
    }
}

impl PartitionConfig {
    /// Check the chunking thresholds and the endpoint URL
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.max_characters == 0 {
            return Err(LoaderError::config("maxCharacters must be greater than 0"));
        }

        if let Some(n) = self.combine_under_n_chars {
            if n > self.max_characters {
                return Err(LoaderError::config(format!(
                    "combineUnderNChars ({}) can't exceed maxCharacters ({})",
                    n, self.max_characters
                )));
            }
        }

        if let Some(n) = self.new_after_n_chars {
            if n > self.max_characters {
                return Err(LoaderError::config(format!(
                    "newAfterNChars ({}) can't exceed maxCharacters ({})",
                    n, self.max_characters
                )));
            }
        }

        if self.encoding.trim().is_empty() {
            return Err(LoaderError::config("encoding must not be empty"));
        }

        let url = reqwest::Url::parse(&self.api_url).map_err(|e| {
            LoaderError::config(format!("Invalid Unstructured API URL '{}': {}", self.api_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoaderError::config(format!(
                "Unstructured API URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }
}

/// One element returned by the partitioning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExtractedDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Client for the external partitioning service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PartitioningClient: Send + Sync {
    /// Partition the file at `path`, preserving the service's element order
    async fn partition(
        &self,
        path: &Path,
        config: &PartitionConfig,
    ) -> Result<Vec<ExtractedDocument>, LoaderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PartitionConfig::default();

        assert_eq!(config.strategy, Strategy::Auto);
        assert_eq!(config.encoding, "utf-8");
        assert!(!config.coordinates);
        assert_eq!(
            config.skip_infer_table_types,
            vec![FileType::Pdf, FileType::Jpg, FileType::Png]
        );
        assert_eq!(config.hi_res_model_name, HiResModelName::Detectron2Onnx);
        assert_eq!(config.chunking_strategy, ChunkingStrategy::ByTitle);
        assert!(config.ocr_languages.is_empty());
        assert_eq!(config.max_characters, 500);
        assert!(config.combine_under_n_chars.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_combine_under_exceeding_max_is_rejected() {
        let config = PartitionConfig {
            combine_under_n_chars: Some(600),
            ..PartitionConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, LoaderError::Config { .. }));
        assert!(err.to_string().contains("combineUnderNChars"));
    }

    #[test]
    fn test_new_after_exceeding_max_is_rejected() {
        let config = PartitionConfig {
            new_after_n_chars: Some(501),
            ..PartitionConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(LoaderError::Config { .. })
        ));
    }

    #[test]
    fn test_thresholds_equal_to_max_are_accepted() {
        let config = PartitionConfig {
            combine_under_n_chars: Some(500),
            new_after_n_chars: Some(500),
            ..PartitionConfig::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_characters_is_rejected() {
        let config = PartitionConfig {
            max_characters: 0,
            ..PartitionConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let config = PartitionConfig {
            api_url: "not a url".to_string(),
            ..PartitionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PartitionConfig {
            api_url: "ftp://example.com/general".to_string(),
            ..PartitionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("hi_res".parse::<Strategy>().unwrap(), Strategy::HiRes);
        assert_eq!(
            "yolox_quantized".parse::<HiResModelName>().unwrap(),
            HiResModelName::YoloxQuantized
        );
        assert_eq!(
            "None".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::None
        );
        assert_eq!("PDF".parse::<FileType>().unwrap(), FileType::Pdf);
        assert!("exe".parse::<FileType>().is_err());
        assert!("slow".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&HiResModelName::Detectron2Onnx).unwrap(),
            "\"detectron2_onnx\""
        );
        assert_eq!(
            serde_json::to_string(&Strategy::OcrOnly).unwrap(),
            "\"ocr_only\""
        );
        let chunking: ChunkingStrategy = serde_json::from_str("\"None\"").unwrap();
        assert_eq!(chunking, ChunkingStrategy::None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = PartitionConfig {
            api_key: Some("secret-key".to_string()),
            ..PartitionConfig::default()
        };

        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
