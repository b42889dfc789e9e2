use crate::domain::model::{ProbeResult, TransportRequest};
use crate::domain::ports::HttpTransport;
use serde::{Deserialize, Serialize};

/// Connection details of an API-type source before it is registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub url: String,
    pub api_key: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl ConnectorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

/// Request headers: JSON content type, then caller headers, then the bearer credential.
pub fn request_headers(config: &ConnectorConfig) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];

    for (name, value) in &config.headers {
        set_header(&mut headers, name, value);
    }

    if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        set_header(&mut headers, "Authorization", &format!("Bearer {}", api_key));
    }

    headers
}

/// One GET through `transport`. Never fails; problems are reported in the result.
pub async fn probe<T: HttpTransport + ?Sized>(
    transport: &T,
    config: &ConnectorConfig,
) -> ProbeResult {
    let request = TransportRequest {
        url: config.url.clone(),
        method: "GET".to_string(),
        headers: request_headers(config),
    };

    tracing::debug!("Probing connector endpoint: {}", config.url);

    match transport.fetch(request).await {
        Ok(response) if (200..300).contains(&response.status) => {
            tracing::debug!("Connector responded with status {}", response.status);
            ProbeResult {
                reachable: true,
                message: "Connection successful".to_string(),
                sample: Some(response.body),
            }
        }
        Ok(response) => {
            tracing::warn!("Connector {} returned status {}", config.url, response.status);
            ProbeResult {
                reachable: false,
                message: format!("API returned status {}", response.status),
                sample: None,
            }
        }
        Err(e) => {
            tracing::warn!("Connector {} unreachable: {}", config.url, e);
            let message = e.to_string();
            ProbeResult {
                reachable: false,
                message: if message.is_empty() {
                    "Connection failed".to_string()
                } else {
                    message
                },
                sample: None,
            }
        }
    }
}
