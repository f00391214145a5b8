//! Vision-language service: the model interface the scorer talks to, an HTTP
//! client for Moondream-compatible endpoints, and the manager that decides
//! which endpoint to use.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::VisionConfig,
    error::{MoonripError, Result},
};

/// A model that can describe an image and answer questions about it.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn caption(&self, image: &[u8]) -> Result<String>;

    async fn query(&self, image: &[u8], question: &str) -> Result<String>;
}

/// HTTP client for the Moondream `/caption` and `/query` endpoints.
#[derive(Debug, Clone)]
pub struct MoondreamClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl MoondreamClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, route: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/{route}", self.endpoint);
        debug!(%url, "vision request");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-Moondream-Auth", api_key);
        }

        let response = request
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;
        Ok(response)
    }
}

fn image_data_url(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(image))
}

/// Pull a string field out of a JSON response.
pub fn extract_text(response: &serde_json::Value, field: &str) -> Result<String> {
    response[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| MoonripError::VisionResponse {
            reason: format!("missing '{field}' in {response}"),
        })
}

#[async_trait]
impl VisionModel for MoondreamClient {
    async fn caption(&self, image: &[u8]) -> Result<String> {
        let response = self
            .post(
                "caption",
                serde_json::json!({
                    "image_url": image_data_url(image),
                    "length": "normal",
                    "stream": false,
                }),
            )
            .await?;
        extract_text(&response, "caption")
    }

    async fn query(&self, image: &[u8], question: &str) -> Result<String> {
        let response = self
            .post(
                "query",
                serde_json::json!({
                    "image_url": image_data_url(image),
                    "question": question,
                    "stream": false,
                }),
            )
            .await?;
        extract_text(&response, "answer")
    }
}

/// Where vision requests are being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionSource {
    /// `MOONDREAM_ENDPOINT` was set.
    Configured(String),
    /// A local server answered the probe.
    Local(String),
    Cloud { endpoint: String, has_api_key: bool },
}

impl VisionSource {
    pub fn endpoint(&self) -> &str {
        match self {
            VisionSource::Configured(endpoint) | VisionSource::Local(endpoint) => endpoint,
            VisionSource::Cloud { endpoint, .. } => endpoint,
        }
    }
}

/// A resolved connection to the vision service for the duration of a run.
#[derive(Debug)]
pub struct VisionService {
    source: VisionSource,
    client: MoondreamClient,
}

/// Whether anything answers HTTP at `url` within `timeout`. A 404 still means
/// a server is there. Proxies are bypassed; the probe target is local.
pub async fn probe_endpoint(url: &str, timeout: std::time::Duration) -> bool {
    let Ok(client) = Client::builder().timeout(timeout).no_proxy().build() else {
        return false;
    };
    match client.get(url).send().await {
        Ok(response) => {
            response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND
        }
        Err(e) => {
            debug!(%url, error = %e, "vision probe failed");
            false
        }
    }
}

impl VisionService {
    /// Pick an endpoint: an explicit override, else a reachable local server,
    /// else the cloud API.
    pub async fn start(config: &VisionConfig) -> Self {
        let source = if let Some(endpoint) = &config.endpoint {
            VisionSource::Configured(endpoint.clone())
        } else if probe_endpoint(&config.local_endpoint, config.probe_timeout).await {
            VisionSource::Local(config.local_endpoint.clone())
        } else {
            VisionSource::Cloud {
                endpoint: config.cloud_endpoint.clone(),
                has_api_key: config.api_key.is_some(),
            }
        };
        info!(?source, "vision service selected");

        let api_key = match source {
            VisionSource::Local(_) => None,
            _ => config.api_key.clone(),
        };
        let client = MoondreamClient::new(source.endpoint(), api_key);
        Self { source, client }
    }

    pub fn source(&self) -> &VisionSource {
        &self.source
    }

    pub fn model(&self) -> &dyn VisionModel {
        &self.client
    }

    /// Release the service. moonrip never spawns one, so nothing is killed.
    pub fn stop(self) {
        debug!(endpoint = %self.source.endpoint(), "released vision service");
    }
}
