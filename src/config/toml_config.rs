use crate::core::importer::{ImportSettings, DEFAULT_STORAGE_PREFIX};
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_required_field, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub base_path: String,
    pub prefix: String,
    pub overwrite: bool,
    pub bucket: Option<String>,
    pub region: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            base_path: "./storage".to_string(),
            prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            overwrite: true,
            bucket: None,
            region: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_file_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl IngestConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| IngestError::Config {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| IngestError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            prefix: self.storage.prefix.clone(),
            overwrite: self.storage.overwrite,
            max_file_bytes: self.limits.max_file_bytes,
        }
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for IngestConfig {
    fn validate(&self) -> Result<()> {
        match self.storage.backend {
            StorageBackend::Local => validate_path("storage.base_path", &self.storage.base_path)?,
            StorageBackend::S3 => {
                let bucket = validate_required_field("storage.bucket", &self.storage.bucket)?;
                validate_non_empty_string("storage.bucket", bucket)?;
                let region = validate_required_field("storage.region", &self.storage.region)?;
                validate_non_empty_string("storage.region", region)?;
            }
        }

        if let Some(max) = self.limits.max_file_bytes {
            validate_positive_number("limits.max_file_bytes", max, 1)?;
        }

        if let Some(timeout) = self.http.timeout_seconds {
            validate_range("http.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(user_agent) = &self.http.user_agent {
            validate_non_empty_string("http.user_agent", user_agent)?;
        }

        tracing::debug!("✅ Ingest configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = IngestConfig::from_toml_str("").unwrap();
        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.import_settings(), ImportSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let config = IngestConfig::from_toml_str(
            r#"
[storage]
backend = "local"
base_path = "/var/lib/ingest"
prefix = "uploads"
overwrite = false

[limits]
max_file_bytes = 10485760

[http]
timeout_seconds = 15
user_agent = "retail-ingest/0.1"
"#,
        )
        .unwrap();

        let settings = config.import_settings();
        assert_eq!(settings.prefix, "uploads");
        assert!(!settings.overwrite);
        assert_eq!(settings.max_file_bytes, Some(10 * 1024 * 1024));
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(15)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RETAIL_INGEST_TEST_BUCKET", "uploads-bucket");
        let config = IngestConfig::from_toml_str(
            r#"
[storage]
backend = "s3"
bucket = "${RETAIL_INGEST_TEST_BUCKET}"
region = "ap-southeast-2"
"#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket.as_deref(), Some("uploads-bucket"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = IngestConfig::from_toml_str("[storage]\nbackend = \"s3\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(IngestError::MissingConfig { .. })
        ));

        let config = IngestConfig::from_toml_str("[http]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        assert!(IngestConfig::from_toml_str("[limits]\nmax_file_bytes = \"big\"\n").is_err());
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(IngestConfig::load(None).unwrap(), IngestConfig::default());
        assert!(IngestConfig::load(Some(Path::new("/nonexistent/ingest.toml"))).is_err());
    }
}
