use crate::core::parsers::ParserRegistry;
use crate::domain::model::RecordKind;
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{validate_file_extension, validate_path, validate_url, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "retail-ingest")]
#[command(about = "Validate and import product and sales data files")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to an ingest TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse and validate a file without importing it
    Validate {
        file: PathBuf,
        #[arg(
            long,
            help = "product, sales, generic or inventory (default: inferred from file name)"
        )]
        kind: Option<RecordKind>,
    },
    /// Validate a file and commit it to storage
    Import {
        file: PathBuf,
        #[arg(long)]
        kind: Option<RecordKind>,
        #[arg(long, help = "Overrides storage.base_path for local storage")]
        storage_dir: Option<String>,
    },
    /// Write an example upload file
    Template {
        kind: RecordKind,
        #[arg(long, help = "Output path (default: stdout)")]
        output: Option<PathBuf>,
    },
    /// Check that an API endpoint is reachable
    Probe {
        url: String,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long = "header", value_parser = parse_header, help = "Extra header as NAME=VALUE")]
        headers: Vec<(String, String)>,
    },
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

impl Command {
    /// Record kind for file commands: explicit flag first, then the file name.
    pub fn resolved_kind(&self) -> Option<RecordKind> {
        match self {
            Command::Validate { file, kind } | Command::Import { file, kind, .. } => Some(
                kind.unwrap_or_else(|| RecordKind::infer_from_filename(&file.to_string_lossy())),
            ),
            Command::Template { kind, .. } => Some(*kind),
            Command::Probe { .. } => None,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config {
            validate_path("config", &config.to_string_lossy())?;
        }

        match &self.command {
            Command::Validate { file, .. } | Command::Import { file, .. } => {
                let name = file.to_string_lossy();
                validate_path("file", &name)?;
                let registry = ParserRegistry::default();
                validate_file_extension("file", &name, &registry.supported_extensions())?;
                if !file.is_file() {
                    return Err(IngestError::InvalidConfigValue {
                        field: "file".to_string(),
                        value: name.to_string(),
                        reason: "File does not exist".to_string(),
                    });
                }
            }
            Command::Template { output, .. } => {
                if let Some(output) = output {
                    validate_path("output", &output.to_string_lossy())?;
                }
            }
            Command::Probe { url, .. } => validate_url("url", url)?,
        }

        if let Command::Import {
            storage_dir: Some(dir),
            ..
        } = &self.command
        {
            validate_path("storage_dir", dir)?;
        }

        Ok(())
    }
}
