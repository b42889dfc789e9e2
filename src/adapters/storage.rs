use crate::domain::model::{StoredObject, UploadOptions};
use crate::domain::ports::Storage;
use crate::utils::error::{IngestError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Blob sink writing under a base directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(IngestError::storage(format!(
                "Refusing to write outside the storage root: {}",
                path
            )));
        }
        Ok(Path::new(&self.base_path).join(relative))
    }
}

impl Storage for LocalStorage {
    async fn upload(
        &self,
        data: &[u8],
        path: &str,
        options: UploadOptions,
    ) -> Result<StoredObject> {
        let full_path = self.resolve(path)?;

        if !options.overwrite && full_path.exists() {
            return Err(IngestError::storage(format!("Object already exists: {}", path)));
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                IngestError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        fs::write(&full_path, data).map_err(|e| {
            IngestError::storage(format!("Failed to write {}: {}", full_path.display(), e))
        })?;

        let absolute = fs::canonicalize(&full_path).unwrap_or(full_path);
        let public_url = Url::from_file_path(&absolute)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| absolute.display().to_string());

        Ok(StoredObject { public_url })
    }
}

#[cfg(feature = "s3")]
pub use s3::S3Storage;

#[cfg(feature = "s3")]
mod s3 {
    use super::*;
    use aws_sdk_s3::error::DisplayErrorContext;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::Client as S3Client;

    /// Blob sink writing objects to an S3 bucket.
    #[derive(Debug, Clone)]
    pub struct S3Storage {
        client: S3Client,
        bucket: String,
        region: String,
    }

    impl S3Storage {
        pub fn new(client: S3Client, bucket: String, region: String) -> Self {
            Self {
                client,
                bucket,
                region,
            }
        }

        /// Client from the default AWS credential chain, pinned to `region`.
        pub async fn from_env(bucket: String, region: String) -> Self {
            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let config = aws_sdk_s3::config::Builder::from(&config)
                .region(aws_sdk_s3::config::Region::new(region.clone()))
                .build();
            Self::new(S3Client::from_conf(config), bucket, region)
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key)
        }
    }

    impl Storage for S3Storage {
        async fn upload(
            &self,
            data: &[u8],
            path: &str,
            options: UploadOptions,
        ) -> Result<StoredObject> {
            let mut request = self
                .client
                .put_object()
                .bucket(&self.bucket)
                .key(path)
                .body(ByteStream::from(data.to_vec()));

            // 不允許覆寫時，物件已存在會回 412
            if !options.overwrite {
                request = request.if_none_match("*");
            }

            request.send().await.map_err(|e| {
                IngestError::storage(format!(
                    "Failed to write s3://{}/{}: {}",
                    self.bucket,
                    path,
                    DisplayErrorContext(&e)
                ))
            })?;

            Ok(StoredObject {
                public_url: self.public_url(path),
            })
        }
    }
}
