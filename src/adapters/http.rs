use crate::domain::model::{TransportRequest, TransportResponse};
use crate::domain::ports::HttpTransport;
use crate::utils::error::{IngestError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

/// [`HttpTransport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Client with a request timeout and optional user agent.
    pub fn with_options(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent.to_string());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(&self, request: TransportRequest) -> Result<TransportResponse> {
        let method = Method::from_bytes(request.method.to_uppercase().as_bytes()).map_err(|_| {
            IngestError::Transport {
                message: format!("Unsupported HTTP method: {}", request.method),
            }
        })?;

        let mut builder = self.client.request(method, &request.url);

        // 添加自定義標頭
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        tracing::debug!("{} {} -> {}", request.method, request.url, status);

        // 非 JSON 回應保留為字串
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        Ok(TransportResponse { status, body })
    }
}
