use anyhow::Result;
use retail_ingest::{
    template, ImportSettings, Importer, LocalStorage, RecordKind, SourceDescriptor, UploadedFile,
};
use tempfile::TempDir;

fn stored_files(root: &std::path::Path) -> Vec<std::path::PathBuf> {
    let dir = root.join("data-sources");
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_end_to_end_import_to_local_storage() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let importer = Importer::new(storage);

    let file = UploadedFile::new(
        "q1_sales.csv",
        "sku,date,unitsSold,revenue\nA1,2024-01-15,5,49.95\nA2,2024-01-16,2,19.98\n",
    );
    let kind = RecordKind::infer_from_filename(&file.name);
    assert_eq!(kind, RecordKind::Sales);

    let outcome = importer.import(&file, kind).await;

    assert!(outcome.success, "import failed: {:?}", outcome.errors);
    assert_eq!(outcome.records_processed, 2);
    assert_eq!(outcome.records_total, 2);
    assert!(outcome.errors.is_empty());
    assert!(outcome.source_id.starts_with("ds_"));

    let files = stored_files(temp_dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].to_string_lossy().ends_with("-q1_sales.csv"));
    assert_eq!(std::fs::read(&files[0])?, file.bytes);

    let descriptor = SourceDescriptor::from_import(&file, &outcome).unwrap();
    assert_eq!(descriptor.id, outcome.source_id);
    assert_eq!(descriptor.source_type, "csv");
    assert_eq!(descriptor.record_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_rejected_file_leaves_storage_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let importer = Importer::new(storage);

    let file = UploadedFile::new("sales.csv", "sku,date,unitsSold,revenue\nA1,yesterday,abc,1");
    let outcome = importer.import(&file, RecordKind::Sales).await;

    assert!(!outcome.success);
    assert_eq!(outcome.records_processed, 0);
    assert_eq!(outcome.records_total, 1);
    assert_eq!(
        outcome.errors,
        vec![
            "Row 1: Field 'unitsSold' must be a number",
            "Row 1: Invalid date format in field 'date'",
        ]
    );
    assert!(outcome.source_id.is_empty());
    assert!(stored_files(temp_dir.path()).is_empty());
    assert!(SourceDescriptor::from_import(&file, &outcome).is_none());
    Ok(())
}

#[tokio::test]
async fn test_templates_import_cleanly() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let importer = Importer::new(storage).with_settings(ImportSettings {
        overwrite: false,
        ..ImportSettings::default()
    });

    for kind in [RecordKind::Product, RecordKind::Sales] {
        let file = UploadedFile::new(template::file_name(kind), template::generate(kind));
        let report = importer.validate_file(&file, kind)?;
        assert!(report.is_valid);
        assert_eq!(report.valid_records, report.record_count);

        let outcome = importer.import(&file, kind).await;
        assert!(outcome.success);
        assert_eq!(outcome.records_processed, 3);
    }

    assert_eq!(stored_files(temp_dir.path()).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_json_and_generic_imports() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let importer = Importer::new(storage);

    let products = UploadedFile::new(
        "catalog.json",
        r#"[{"sku":"A1","name":"Widget","category":"Tools","price":"9.99","cost":4}]"#,
    );
    let outcome = importer.import(&products, RecordKind::Product).await;
    assert!(outcome.success);
    assert!(outcome.errors.is_empty());

    let empty = UploadedFile::new("stock.json", "[]");
    let outcome = importer.import(&empty, RecordKind::Generic).await;
    assert!(!outcome.success);
    assert_eq!(outcome.errors, vec!["No data found in file"]);

    assert_eq!(stored_files(temp_dir.path()).len(), 1);
    Ok(())
}
