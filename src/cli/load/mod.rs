//! Load command - loads one object and prints its documents as JSON

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::domain::{
    AwsCredentialRecord, ChunkingStrategy, HiResModelName, ListInput, LoadRequest, OmitInput,
    Strategy,
};
use crate::infrastructure::loader::DefaultLoaderService;
use crate::infrastructure::observability::shutdown_tracing;

#[derive(Args, Clone, Debug, Default)]
pub struct LoadArgs {
    #[arg(long)]
    pub bucket: String,

    #[arg(long)]
    pub key: String,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub aws_access_key_id: Option<String>,

    #[arg(long)]
    pub aws_secret_access_key: Option<String>,

    #[arg(long)]
    pub aws_session_token: Option<String>,

    #[arg(long)]
    pub unstructured_api_url: Option<String>,

    #[arg(long)]
    pub unstructured_api_key: Option<String>,

    /// fast, hi_res, ocr_only or auto
    #[arg(long)]
    pub strategy: Option<Strategy>,

    #[arg(long)]
    pub encoding: Option<String>,

    #[arg(long)]
    pub coordinates: bool,

    /// Comma-separated file types, e.g. pdf,jpg,png
    #[arg(long, value_delimiter = ',')]
    pub skip_infer_table_types: Option<Vec<String>>,

    #[arg(long)]
    pub hi_res_model_name: Option<HiResModelName>,

    /// none or by_title
    #[arg(long)]
    pub chunking_strategy: Option<ChunkingStrategy>,

    /// Comma-separated OCR language codes
    #[arg(long, value_delimiter = ',')]
    pub ocr_languages: Option<Vec<String>>,

    #[arg(long)]
    pub xml_keep_tags: bool,

    #[arg(long)]
    pub include_page_breaks: bool,

    #[arg(long)]
    pub multi_page_sections: Option<bool>,

    #[arg(long)]
    pub combine_under_n_chars: Option<u32>,

    #[arg(long)]
    pub new_after_n_chars: Option<u32>,

    #[arg(long)]
    pub max_characters: Option<u32>,

    #[arg(long)]
    pub source_id_key: Option<String>,

    /// JSON object merged into every document's metadata
    #[arg(long)]
    pub metadata: Option<String>,

    /// Comma-separated metadata keys to drop, or "*" for all
    #[arg(long)]
    pub omit_metadata_keys: Option<String>,
}

impl LoadArgs {
    pub fn into_request(self) -> LoadRequest {
        let credentials = (self.aws_access_key_id.is_some()
            || self.aws_secret_access_key.is_some())
        .then(|| AwsCredentialRecord {
            access_key_id: self.aws_access_key_id,
            secret_access_key: self.aws_secret_access_key,
            session_token: self.aws_session_token,
        });

        LoadRequest {
            region: self.region,
            credentials,
            unstructured_api_url: self.unstructured_api_url,
            unstructured_api_key: self.unstructured_api_key,
            strategy: self.strategy,
            encoding: self.encoding,
            coordinates: self.coordinates.then_some(true),
            skip_infer_table_types: self.skip_infer_table_types.map(ListInput::List),
            hi_res_model_name: self.hi_res_model_name,
            chunking_strategy: self.chunking_strategy,
            ocr_languages: self.ocr_languages.map(ListInput::List),
            xml_keep_tags: self.xml_keep_tags.then_some(true),
            include_page_breaks: self.include_page_breaks.then_some(true),
            multi_page_sections: self.multi_page_sections,
            combine_under_n_chars: self.combine_under_n_chars,
            new_after_n_chars: self.new_after_n_chars,
            max_characters: self.max_characters,
            source_id_key: self.source_id_key,
            additional_metadata: self.metadata.map(Value::String),
            omit_metadata_keys: self.omit_metadata_keys.map(OmitInput::Text),
            ..LoadRequest::new(self.bucket, self.key)
        }
    }
}

pub async fn run(args: LoadArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_observability(&config);

    let service = DefaultLoaderService::from_settings(&config.loader);
    let result = service.load(args.into_request()).await;
    shutdown_tracing();

    let documents = result?;
    info!(documents = documents.len(), "Load finished");

    println!("{}", serde_json::to_string_pretty(&documents)?);

    Ok(())
}
