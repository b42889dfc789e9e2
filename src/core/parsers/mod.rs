//! Format parsers and the suffix-keyed registry that selects between them.

pub mod delimited;
pub mod json;
pub mod spreadsheet;

use crate::domain::model::{FieldMap, UploadedFile};
use crate::domain::ports::FormatParser;
use crate::utils::error::{IngestError, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

pub use delimited::{DelimitedParser, DEFAULT_DELIMITER};
pub use json::JsonParser;
pub use spreadsheet::SpreadsheetParser;

/// Built-in formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    Spreadsheet,
}

impl FileFormat {
    pub const SPREADSHEET_EXTENSIONS: [&'static str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Csv => &["csv"],
            FileFormat::Tsv => &["tsv"],
            FileFormat::Json => &["json"],
            FileFormat::Spreadsheet => &Self::SPREADSHEET_EXTENSIONS,
        }
    }

    pub fn parser(&self) -> Arc<dyn FormatParser> {
        match self {
            FileFormat::Csv => Arc::new(DelimitedParser::comma()),
            FileFormat::Tsv => Arc::new(DelimitedParser::tab()),
            FileFormat::Json => Arc::new(JsonParser),
            FileFormat::Spreadsheet => Arc::new(SpreadsheetParser),
        }
    }

    /// Resolve from a file name suffix.
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        ext.parse()
    }

    pub fn all() -> [FileFormat; 4] {
        [
            FileFormat::Csv,
            FileFormat::Tsv,
            FileFormat::Json,
            FileFormat::Spreadsheet,
        ]
    }
}

impl FromStr for FileFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_start_matches('.').to_lowercase();
        match name.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            "json" => Ok(FileFormat::Json),
            "excel" | "spreadsheet" => Ok(FileFormat::Spreadsheet),
            ext if FileFormat::SPREADSHEET_EXTENSIONS.contains(&ext) => Ok(FileFormat::Spreadsheet),
            _ => Err(unsupported(s)),
        }
    }
}

fn unsupported(format: &str) -> IngestError {
    if format.is_empty() {
        IngestError::format("Unsupported file format")
    } else {
        IngestError::format(format!("Unsupported file format: {}", format))
    }
}

/// Parse raw input under a declared format.
pub fn parse(raw: &[u8], format: FileFormat) -> Result<Vec<FieldMap>> {
    format.parser().parse(raw)
}

/// Suffix to parser table. New formats are added with [`ParserRegistry::register`].
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn FormatParser>>,
}

impl ParserRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    pub fn register(&mut self, suffix: &str, parser: Arc<dyn FormatParser>) {
        let key = suffix.trim_start_matches('.').to_lowercase();
        self.parsers.insert(key, parser);
    }

    pub fn with_parser(mut self, suffix: &str, parser: Arc<dyn FormatParser>) -> Self {
        self.register(suffix, parser);
        self
    }

    /// Registered suffixes, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    pub fn parser_for(&self, file_name: &str) -> Result<Arc<dyn FormatParser>> {
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        self.parsers
            .get(&ext)
            .cloned()
            .ok_or_else(|| unsupported(&ext))
    }

    pub fn parse_file(&self, file: &UploadedFile) -> Result<Vec<FieldMap>> {
        let parser = self.parser_for(&file.name)?;
        tracing::debug!("Parsing '{}' ({} bytes)", file.name, file.bytes.len());
        parser.parse(&file.bytes)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for format in FileFormat::all() {
            let parser = format.parser();
            for ext in format.extensions() {
                registry.register(ext, Arc::clone(&parser));
            }
        }
        registry
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}
