use crate::core::parsers::ParserRegistry;
use crate::core::report;
use crate::domain::model::{
    FieldMap, ImportOutcome, RecordKind, StoredObject, UploadOptions, UploadedFile,
    ValidationOutcome,
};
use crate::domain::ports::Storage;
use crate::utils::error::{IngestError, Result};
use uuid::Uuid;

pub const DEFAULT_STORAGE_PREFIX: &str = "data-sources";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Blob path prefix for committed files.
    pub prefix: String,
    pub overwrite: bool,
    /// Files above this size are rejected before parsing.
    pub max_file_bytes: Option<u64>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            overwrite: true,
            max_file_bytes: None,
        }
    }
}

/// Blob path for a committed file: `<prefix>/<token>-<file name>`.
pub fn storage_path(prefix: &str, token: &str, file_name: &str) -> String {
    // 只保留檔名，避免路徑穿越
    let base_name = std::path::Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let prefix = prefix.trim_end_matches('/');

    if prefix.is_empty() {
        format!("{}-{}", token, base_name)
    } else {
        format!("{}/{}-{}", prefix, token, base_name)
    }
}

fn storage_token() -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), &nonce[..8])
}

fn new_source_id() -> String {
    format!("ds_{}", Uuid::new_v4().simple())
}

/// Parses, validates and commits uploaded files.
///
/// The storage sink is only called for files whose validation has no
/// blocking error; every failure comes back as an unsuccessful [`ImportOutcome`].
pub struct Importer<S: Storage> {
    storage: S,
    registry: ParserRegistry,
    settings: ImportSettings,
}

impl<S: Storage> Importer<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            registry: ParserRegistry::default(),
            settings: ImportSettings::default(),
        }
    }

    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Size-check and parse `file` with the parser registered for its suffix.
    pub fn read_records(&self, file: &UploadedFile) -> Result<Vec<FieldMap>> {
        if let Some(limit) = self.settings.max_file_bytes {
            if file.size() > limit {
                return Err(IngestError::FileTooLarge {
                    size: file.size(),
                    limit,
                });
            }
        }
        self.registry.parse_file(file)
    }

    /// Report for `file` without committing anything.
    pub fn validate_file(
        &self,
        file: &UploadedFile,
        kind: RecordKind,
    ) -> Result<ValidationOutcome> {
        let records = self.read_records(file)?;
        Ok(report::validate(&records, kind))
    }

    pub async fn import(&self, file: &UploadedFile, kind: RecordKind) -> ImportOutcome {
        tracing::debug!("Importing '{}' as {}", file.name, kind);

        // 1. 解析
        let records = match self.read_records(file) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Rejected '{}': {}", file.name, e);
                return ImportOutcome::failed(0, vec![e.to_string()]);
            }
        };

        // 2. 驗證（整檔全有或全無）
        let validation = report::validate(&records, kind);
        if !validation.is_valid {
            tracing::warn!(
                "Rejected '{}': {} blocking errors in {} records",
                file.name,
                validation.errors.len(),
                validation.record_count
            );
            return ImportOutcome::failed(validation.record_count, validation.errors);
        }

        // 3. 寫入儲存
        let (source_id, stored) = match self.commit(file).await {
            Ok(committed) => committed,
            Err(e) => {
                tracing::warn!("Storage write for '{}' failed: {}", file.name, e);
                return ImportOutcome::failed(validation.record_count, vec![e.to_string()]);
            }
        };

        tracing::info!(
            "Imported '{}' as {} ({}/{} records valid) -> {}",
            file.name,
            source_id,
            validation.valid_records,
            validation.record_count,
            stored.public_url
        );

        ImportOutcome {
            success: true,
            records_processed: validation.valid_records,
            records_total: validation.record_count,
            errors: validation.warnings,
            source_id,
            storage_url: Some(stored.public_url),
        }
    }

    async fn commit(&self, file: &UploadedFile) -> Result<(String, StoredObject)> {
        let path = storage_path(&self.settings.prefix, &storage_token(), &file.name);
        tracing::debug!("Writing {} bytes to storage at {}", file.bytes.len(), path);

        let stored = self
            .storage
            .upload(
                &file.bytes,
                &path,
                UploadOptions {
                    overwrite: self.settings.overwrite,
                },
            )
            .await?;

        Ok((new_source_id(), stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        uploads: Arc<Mutex<Vec<UploadOptions>>>,
        fail: bool,
    }

    impl MockStorage {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        async fn upload_count(&self) -> usize {
            self.uploads.lock().await.len()
        }
    }

    impl Storage for MockStorage {
        async fn upload(
            &self,
            data: &[u8],
            path: &str,
            options: UploadOptions,
        ) -> Result<StoredObject> {
            self.uploads.lock().await.push(options);
            if self.fail {
                return Err(IngestError::storage("bucket unavailable"));
            }
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(StoredObject {
                public_url: format!("mock://{}", path),
            })
        }
    }

    #[tokio::test]
    async fn test_valid_file_is_committed_with_warnings_carried() {
        let storage = MockStorage::default();
        let importer = Importer::new(storage.clone());
        let file = UploadedFile::new("products.csv", "sku,name,price\nA1,Widget,9.99\nA2,Gadget,5");

        let outcome = importer.import(&file, RecordKind::Product).await;

        assert!(outcome.success);
        assert_eq!(outcome.records_processed, 2);
        assert_eq!(outcome.records_total, 2);
        assert_eq!(outcome.errors.len(), 4); // category + cost per row
        assert!(outcome.source_id.starts_with("ds_"));

        let files = storage.files.lock().await;
        assert_eq!(files.len(), 1);
        let (path, data) = files.iter().next().unwrap();
        assert!(path.starts_with("data-sources/"));
        assert!(path.ends_with("-products.csv"));
        assert_eq!(data, &file.bytes);
        assert_eq!(outcome.storage_url, Some(format!("mock://{}", path)));
    }

    #[tokio::test]
    async fn test_invalid_file_never_reaches_storage() {
        let storage = MockStorage::default();
        let importer = Importer::new(storage.clone());
        let file = UploadedFile::new("products.csv", "sku,name,price\nA1,Widget,9.99\nA2,,5.00");

        let outcome = importer.import(&file, RecordKind::Product).await;

        assert!(!outcome.success);
        assert_eq!(outcome.records_processed, 0);
        assert_eq!(outcome.records_total, 2);
        assert_eq!(outcome.errors, vec!["Row 2: Missing required field 'name'"]);
        assert!(outcome.source_id.is_empty());
        assert_eq!(storage.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_unsupported_suffix_fails_with_zero_counts() {
        let storage = MockStorage::default();
        let importer = Importer::new(storage.clone());

        let outcome = importer
            .import(&UploadedFile::new("notes.txt", "hello"), RecordKind::Generic)
            .await;

        assert_eq!(
            outcome,
            ImportOutcome::failed(0, vec!["Unsupported file format: txt".to_string()])
        );
        assert_eq!(storage.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_json_fails_before_storage() {
        let storage = MockStorage::default();
        let importer = Importer::new(storage.clone());

        let outcome = importer
            .import(&UploadedFile::new("sales.json", "[{"), RecordKind::Sales)
            .await;

        assert!(!outcome.success);
        assert!(outcome.errors[0].starts_with("Invalid JSON format"));
        assert_eq!(storage.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_uses_failure_shape() {
        let storage = MockStorage::failing();
        let importer = Importer::new(storage.clone());
        let file = UploadedFile::new("inventory.csv", "sku,quantity\nA1,4");

        let outcome = importer.import(&file, RecordKind::Generic).await;

        assert!(!outcome.success);
        assert_eq!(outcome.records_processed, 0);
        assert_eq!(outcome.records_total, 1);
        assert_eq!(outcome.errors, vec!["Storage error: bucket unavailable"]);
        assert!(outcome.source_id.is_empty());
        assert_eq!(storage.upload_count().await, 1);
    }

    #[tokio::test]
    async fn test_size_limit_and_settings() {
        let storage = MockStorage::default();
        let importer = Importer::new(storage.clone()).with_settings(ImportSettings {
            prefix: "uploads/".to_string(),
            overwrite: false,
            max_file_bytes: Some(10),
        });

        let big = UploadedFile::new("products.csv", "sku,name\nA1,Widget");
        let outcome = importer.import(&big, RecordKind::Product).await;
        assert!(!outcome.success);
        assert!(outcome.errors[0].starts_with("File is too large"));
        assert!(importer.validate_file(&big, RecordKind::Product).is_err());

        let small = UploadedFile::new("p.csv", "sku,name");
        let outcome = importer.import(&small, RecordKind::Product).await;
        assert!(outcome.success);
        assert_eq!(outcome.records_total, 0);

        let uploads = storage.uploads.lock().await;
        assert_eq!(uploads.as_slice(), &[UploadOptions { overwrite: false }]);
        let files = storage.files.lock().await;
        assert!(files.keys().all(|path| path.starts_with("uploads/")));
    }

    #[tokio::test]
    async fn test_repeated_imports_get_distinct_paths_and_ids() {
        let storage = MockStorage::default();
        let importer = Importer::new(storage.clone());
        let file = UploadedFile::new("stock.json", r#"[{"sku":"A1","quantity":3}]"#);

        let first = importer.import(&file, RecordKind::Generic).await;
        let second = importer.import(&file, RecordKind::Generic).await;

        assert!(first.success && second.success);
        assert_ne!(first.source_id, second.source_id);
        assert_eq!(storage.files.lock().await.len(), 2);
    }

    #[test]
    fn test_storage_path_keeps_only_file_name() {
        assert_eq!(
            storage_path("data-sources", "123-abc", "products.csv"),
            "data-sources/123-abc-products.csv"
        );
        assert_eq!(
            storage_path("data-sources/", "1", "../../etc/passwd.csv"),
            "data-sources/1-passwd.csv"
        );
        assert_eq!(storage_path("", "1", "a.csv"), "1-a.csv");
    }

    #[test]
    fn test_validate_file_reports_without_commit() {
        let importer = Importer::new(MockStorage::default());
        let file = UploadedFile::new(
            "sales.csv",
            "sku,date,unitsSold,revenue\nA1,2024-01-15,abc,1",
        );
        let outcome = importer.validate_file(&file, RecordKind::Sales).unwrap();

        assert!(!outcome.is_valid);
        assert_eq!(outcome.valid_records, 0);
        assert_eq!(outcome.errors, vec!["Row 1: Field 'unitsSold' must be a number"]);
    }
}
