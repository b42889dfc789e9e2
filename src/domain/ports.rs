use crate::domain::model::{
    FieldMap, StoredObject, TransportRequest, TransportResponse, UploadOptions,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Blob sink the Import Orchestrator commits accepted files to.
pub trait Storage: Send + Sync {
    fn upload(
        &self,
        data: &[u8],
        path: &str,
        options: UploadOptions,
    ) -> impl std::future::Future<Output = Result<StoredObject>> + Send;
}

/// Network transport used by the connector probe.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Decodes the raw bytes of one file format into records.
pub trait FormatParser: Send + Sync {
    fn parse(&self, raw: &[u8]) -> Result<Vec<FieldMap>>;
}
