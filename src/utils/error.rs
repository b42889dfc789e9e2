use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{message}")]
    Format { message: String },

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("{message}")]
    Transport { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IngestError {
    pub fn format(message: impl Into<String>) -> Self {
        IngestError::Format {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        IngestError::Storage {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::Format { .. } | IngestError::FileTooLarge { .. } => ErrorCategory::Input,
            IngestError::Storage { .. } => ErrorCategory::Storage,
            IngestError::Transport { .. } | IngestError::Http(_) => ErrorCategory::Network,
            IngestError::Config { .. }
            | IngestError::MissingConfig { .. }
            | IngestError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            IngestError::Io(_) | IngestError::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            IngestError::Format { .. } => {
                "Check the file extension and content; supported formats are CSV, TSV, JSON and Excel"
            }
            IngestError::FileTooLarge { .. } => {
                "Split the file into smaller parts or raise limits.max_file_bytes"
            }
            IngestError::Storage { .. } => "Check storage permissions and retry the import",
            IngestError::Transport { .. } | IngestError::Http(_) => {
                "Check the endpoint URL, credentials and network connectivity"
            }
            IngestError::Config { .. }
            | IngestError::MissingConfig { .. }
            | IngestError::InvalidConfigValue { .. } => "Fix the configuration file or CLI flags",
            IngestError::Io(_) | IngestError::Serialization(_) => {
                "Check file permissions and available disk space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The file could not be read: {}", self),
            ErrorCategory::Storage => format!("The file could not be saved: {}", self),
            ErrorCategory::Network => format!("The data source could not be reached: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("Unexpected system error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
