//! HTTP transport against the FastAPI backend

use super::{normalize_response, ApiRequest, Transport};
use crate::config::ApiConfig;
use crate::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use triage_types::Envelope;

pub struct HttpTransport {
    base_url: String,
    http_client: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build()?;

        log::info!("HttpTransport configured for {}", config.base_url);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, request: &ApiRequest) -> Result<(u16, Vec<u8>)> {
        let url = self.url(&request.path);

        let mut builder = self.http_client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TriageError::Network(format!("{} {}: {}", request.method, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TriageError::Network(format!("Failed to read response from {}: {}", url, e)))?;

        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Envelope<Value> {
        log::debug!(
            "{}: {} {}",
            request.operation.name(),
            request.method,
            request.path
        );

        match self.execute(&request).await {
            Ok((status, body)) => {
                let envelope = normalize_response(request.operation, status, &body);
                if let Some(failure) = envelope.failure() {
                    log::warn!("{} failed with status {}: {}", request.operation.name(), status, failure);
                }
                envelope
            }
            Err(e) => {
                log::error!("{} could not reach the server: {}", request.operation.name(), e);
                Envelope::Error(e.into())
            }
        }
    }
}
