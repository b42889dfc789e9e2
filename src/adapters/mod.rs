// Adapters layer: concrete implementations of the domain ports (storage, http).

pub mod http;
pub mod storage;

pub use http::ReqwestTransport;
pub use storage::LocalStorage;

#[cfg(feature = "s3")]
pub use storage::S3Storage;
