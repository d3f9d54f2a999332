//! HTTP-backed vector engine and engine source.
//!
//! The engine is reached over a tracing service: one POST per trace carrying
//! the image as a data URL plus the numeric option set, answered with the
//! SVG document text. A source is considered usable once its health endpoint
//! answers.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::{EngineSource, VectorEngine};
use crate::config::EngineSourceConfig;
use crate::error::EngineError;
use crate::ingest::ImageHandle;
use crate::params::TraceOptions;

/// Wire request for one trace call.
#[derive(Serialize)]
struct TraceRequest<'a> {
    image: String,
    options: &'a TraceOptions,
}

/// A vector engine reached over HTTP.
pub struct RemoteEngine {
    name: String,
    endpoint: String,
    client: reqwest::Client,
    trace_timeout_ms: u64,
}

impl RemoteEngine {
    pub fn new(name: &str, endpoint: &str, client: reqwest::Client, trace_timeout_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            trace_timeout_ms,
        }
    }
}

#[async_trait]
impl VectorEngine for RemoteEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn trace(
        &self,
        image: &ImageHandle,
        options: &TraceOptions,
    ) -> Result<String, EngineError> {
        let request = TraceRequest {
            image: image.data_url(),
            options,
        };
        let url = format!("{}/trace", self.endpoint);

        let call = async {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| EngineError::Trace {
                    message: e.to_string(),
                })?;
            let response = response.error_for_status().map_err(|e| EngineError::Trace {
                message: e.to_string(),
            })?;
            response.text().await.map_err(|e| EngineError::Trace {
                message: format!("Failed to read engine response: {e}"),
            })
        };

        timeout(Duration::from_millis(self.trace_timeout_ms), call)
            .await
            .map_err(|_| EngineError::Timeout {
                timeout_ms: self.trace_timeout_ms,
            })?
    }
}

/// Engine source backed by a remote tracing service endpoint.
pub struct HttpEngineSource {
    name: String,
    endpoint: String,
    client: reqwest::Client,
    probe_timeout_ms: u64,
    trace_timeout_ms: u64,
}

impl HttpEngineSource {
    pub fn new(
        config: &EngineSourceConfig,
        client: reqwest::Client,
        probe_timeout_ms: u64,
        trace_timeout_ms: u64,
    ) -> Self {
        Self {
            name: config.name.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
            probe_timeout_ms,
            trace_timeout_ms,
        }
    }
}

#[async_trait]
impl EngineSource for HttpEngineSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire(&self) -> Result<Arc<dyn VectorEngine>, EngineError> {
        let url = format!("{}/healthz", self.endpoint);
        let probe = self.client.get(&url).send();

        let response = timeout(Duration::from_millis(self.probe_timeout_ms), probe)
            .await
            .map_err(|_| EngineError::Probe {
                source_name: self.name.clone(),
                message: format!("probe timed out after {}ms", self.probe_timeout_ms),
            })?
            .map_err(|e| EngineError::Probe {
                source_name: self.name.clone(),
                message: e.to_string(),
            })?;

        response.error_for_status().map_err(|e| EngineError::Probe {
            source_name: self.name.clone(),
            message: e.to_string(),
        })?;

        Ok(Arc::new(RemoteEngine::new(
            &self.name,
            &self.endpoint,
            self.client.clone(),
            self.trace_timeout_ms,
        )))
    }
}
