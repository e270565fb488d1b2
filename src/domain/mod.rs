//! Domain layer - loader types, validation rules and the I/O seams

pub mod credentials;
pub mod error;
pub mod metadata;
pub mod object;
pub mod partition;
pub mod request;

pub use credentials::{resolve_credentials, AccessKeyPair, AwsCredentialRecord};
pub use error::{FetchErrorKind, LoaderError};
pub use metadata::{MetadataPolicy, OmitMetadataKeys, DEFAULT_SOURCE_ID_KEY};
pub use object::{
    AwsRegion, FetchOptions, ObjectFetcher, ObjectReference, AWS_REGIONS, DEFAULT_REGION,
};
pub use partition::{
    default_skip_infer_table_types, ChunkingStrategy, ExtractedDocument, FileType,
    HiResModelName, PartitionConfig, PartitioningClient, Strategy, DEFAULT_ENCODING,
    DEFAULT_MAX_CHARACTERS, DEFAULT_UNSTRUCTURED_API_URL,
};
pub use request::{ListInput, LoadRequest, LoaderConfig, LoaderDefaults, OmitInput};
