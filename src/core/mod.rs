pub mod importer;
pub mod parsers;
pub mod probe;
pub mod report;
pub mod template;
pub mod validator;

pub use crate::domain::model::{
    FieldMap, FieldValue, ImportOutcome, ProbeResult, RecordKind, UploadedFile, ValidationOutcome,
};
pub use crate::domain::ports::{FormatParser, HttpTransport, Storage};
pub use crate::utils::error::Result;
