use clap::Parser;
use retail_ingest::config::{CliConfig, Command, IngestConfig, StorageBackend};
use retail_ingest::core::Storage;
use retail_ingest::utils::error::{ErrorSeverity, Result};
use retail_ingest::utils::{logger, validation::Validate};
use retail_ingest::{
    probe, template, ConnectorConfig, ImportOutcome, ImportSettings, Importer, LocalStorage,
    RecordKind, ReqwestTransport, SourceDescriptor, UploadedFile,
};
use serde::Serialize;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting retail-ingest CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    match run(&cli, &config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

fn load_config(cli: &CliConfig) -> Result<IngestConfig> {
    cli.validate()?;
    let config = IngestConfig::load(cli.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    Ok(UploadedFile::new(name, bytes))
}

async fn import_with<S: Storage>(
    storage: S,
    settings: ImportSettings,
    file: &UploadedFile,
    kind: RecordKind,
) -> ImportOutcome {
    Importer::new(storage)
        .with_settings(settings)
        .import(file, kind)
        .await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    outcome: ImportOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_source: Option<SourceDescriptor>,
}

/// Returns `Ok(false)` when the command ran but the file or endpoint was rejected.
async fn run(cli: &CliConfig, config: &IngestConfig) -> Result<bool> {
    let kind = cli.command.resolved_kind();

    match &cli.command {
        Command::Validate { file, .. } => {
            let kind = kind.unwrap_or(RecordKind::Product);
            let upload = read_upload(file)?;
            tracing::info!("🔍 Validating '{}' as {}", upload.name, kind);

            let importer = Importer::new(LocalStorage::new(config.storage.base_path.clone()))
                .with_settings(config.import_settings());
            let outcome = importer.validate_file(&upload, kind)?;
            print_json(&outcome)?;
            Ok(outcome.is_valid)
        }
        Command::Import {
            file, storage_dir, ..
        } => {
            let kind = kind.unwrap_or(RecordKind::Product);
            let upload = read_upload(file)?;
            tracing::info!("📥 Importing '{}' as {}", upload.name, kind);

            let settings = config.import_settings();
            let outcome = match config.storage.backend {
                StorageBackend::Local => {
                    let base_path = storage_dir
                        .clone()
                        .unwrap_or_else(|| config.storage.base_path.clone());
                    import_with(LocalStorage::new(base_path), settings, &upload, kind).await
                }
                #[cfg(feature = "s3")]
                StorageBackend::S3 => {
                    let storage = retail_ingest::S3Storage::from_env(
                        config.storage.bucket.clone().unwrap_or_default(),
                        config.storage.region.clone().unwrap_or_default(),
                    )
                    .await;
                    import_with(storage, settings, &upload, kind).await
                }
                #[cfg(not(feature = "s3"))]
                StorageBackend::S3 => {
                    return Err(retail_ingest::IngestError::Config {
                        message: "S3 storage requires building with the 's3' feature".to_string(),
                    });
                }
            };

            if outcome.success {
                tracing::info!("✅ Import completed: {}", outcome.source_id);
            } else {
                tracing::warn!("❌ Import rejected with {} errors", outcome.errors.len());
            }

            let report = ImportReport {
                data_source: SourceDescriptor::from_import(&upload, &outcome),
                outcome,
            };
            print_json(&report)?;
            Ok(report.outcome.success)
        }
        Command::Template { kind, output } => {
            let content = template::generate(*kind);
            match output {
                Some(path) => {
                    std::fs::write(path, format!("{}\n", content))?;
                    tracing::info!("📁 {} template saved to: {}", kind, path.display());
                }
                None => println!("{}", content),
            }
            Ok(true)
        }
        Command::Probe {
            url,
            api_key,
            headers,
        } => {
            let transport = ReqwestTransport::with_options(
                config.http_timeout(),
                config.http.user_agent.as_deref(),
            )?;
            let connector = ConnectorConfig {
                url: url.clone(),
                api_key: api_key.clone(),
                headers: headers.clone(),
            };

            let result = probe(&transport, &connector).await;
            print_json(&result)?;
            Ok(result.reachable)
        }
    }
}
