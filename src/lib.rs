pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, ReqwestTransport};
pub use config::IngestConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "s3")]
pub use adapters::S3Storage;

pub use crate::core::{
    importer::{ImportSettings, Importer},
    parsers::{FileFormat, ParserRegistry},
    probe::{probe, ConnectorConfig},
    report::validate,
    template,
};
pub use domain::model::{
    FieldMap, FieldValue, ImportOutcome, ProbeResult, RecordKind, SourceDescriptor, UploadedFile,
    ValidationOutcome,
};
pub use utils::error::{IngestError, Result};
